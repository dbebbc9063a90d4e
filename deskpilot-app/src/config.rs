use anyhow::{bail, Context, Result};
use deskpilot_core::{DriveShortcut, EditorId, Intent, PathResolver, PathStyle};
use deskpilot_providers::{LLMProvider, OpenAICompatibleProvider};
use deskpilot_tools::{HandlerSettings, Platform};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const DEFAULT_CONFIG_PATH: &str = "deskpilot.yaml";
pub const CONFIG_ENV: &str = "DESKPILOT_CONFIG";
pub const ENDPOINT_ENV: &str = "DESKPILOT_LLM_ENDPOINT";
pub const MODEL_ENV: &str = "DESKPILOT_LLM_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            api_key_env: "DESKPILOT_API_KEY".to_string(),
            temperature: 0.1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyleSetting {
    #[default]
    Auto,
    Windows,
    Posix,
}

impl PathStyleSetting {
    pub fn resolve(self) -> PathStyle {
        match self {
            PathStyleSetting::Auto => PathStyle::host(),
            PathStyleSetting::Windows => PathStyle::Windows,
            PathStyleSetting::Posix => PathStyle::Posix,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    pub percent_step: u8,
    pub volume_step: f32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            percent_step: 20,
            volume_step: 0.2,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub open_app: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub default_intent: Intent,
    pub max_iterations: usize,
    /// Earlier chat messages sent along with code and writing requests.
    pub history_window: usize,
    pub path_style: PathStyleSetting,
    /// Platform defaults apply when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_map: Option<Vec<DriveShortcut>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_roots: Option<Vec<String>>,
    pub output_dir: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_editor: Option<String>,
    pub system: SystemConfig,
    pub calculator: CalculatorConfig,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig::default(),
            default_intent: Intent::LaunchApp,
            max_iterations: 3,
            history_window: 6,
            path_style: PathStyleSetting::Auto,
            drive_map: None,
            allowed_roots: None,
            output_dir: PathBuf::from("deskpilot-output"),
            default_editor: None,
            system: SystemConfig::default(),
            calculator: CalculatorConfig::default(),
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// `$DESKPILOT_CONFIG`, or `deskpilot.yaml` in the working directory.
    pub fn path() -> PathBuf {
        std::env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Reads the config file when present, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_yaml()?)
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(endpoint) = lookup(ENDPOINT_ENV).filter(|v| !v.trim().is_empty()) {
            self.provider.base_url = endpoint;
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.provider.model = model;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.provider.model.trim().is_empty() {
            bail!("Model name cannot be empty");
        }
        if self.provider.base_url.trim().is_empty() {
            bail!("Provider base_url cannot be empty");
        }
        if self.max_iterations == 0 {
            bail!("max_iterations must be at least 1");
        }
        if !(1..=100).contains(&self.system.percent_step) {
            bail!("system.percent_step must be between 1 and 100");
        }
        if !(self.system.volume_step > 0.0 && self.system.volume_step <= 1.0) {
            bail!("system.volume_step must be in (0, 1]");
        }
        Ok(())
    }

    pub fn path_style(&self) -> PathStyle {
        self.path_style.resolve()
    }

    pub fn drive_shortcuts(&self, home: Option<&str>) -> Vec<DriveShortcut> {
        if let Some(map) = &self.drive_map {
            return map
                .iter()
                .map(|s| DriveShortcut::new(s.phrase.clone(), s.root.clone()))
                .collect();
        }
        match (self.path_style(), home) {
            (PathStyle::Windows, _) => DriveShortcut::windows_defaults(),
            (PathStyle::Posix, Some(home)) => DriveShortcut::posix_defaults(home),
            (PathStyle::Posix, None) => Vec::new(),
        }
    }

    pub fn roots(&self, home: Option<&str>) -> Vec<String> {
        if let Some(roots) = &self.allowed_roots {
            return roots.clone();
        }
        match (self.path_style(), home) {
            (PathStyle::Windows, _) => vec!["D:\\".to_string(), "E:\\".to_string()],
            (PathStyle::Posix, Some(home)) => vec![home.to_string()],
            (PathStyle::Posix, None) => Vec::new(),
        }
    }

    pub fn resolver(&self) -> PathResolver {
        let home = home_dir();
        let home = home.as_deref();
        PathResolver::new(self.path_style(), self.drive_shortcuts(home))
            .with_allowed_roots(self.roots(home))
    }

    pub fn handler_settings(&self, platform: Platform) -> HandlerSettings {
        let mut settings = HandlerSettings::for_platform(platform);
        if let Some(editor) = self.default_editor.as_deref().filter(|e| !e.trim().is_empty()) {
            settings.default_editor = EditorId::new(editor.trim());
        }
        settings.output_dir = self.output_dir.clone();
        settings.max_iterations = self.max_iterations;
        settings.history_window = self.history_window;
        settings.percent_step = self.system.percent_step;
        settings.volume_step = self.system.volume_step;
        settings.open_calculator = self.calculator.open_app;
        settings
    }

    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.provider.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }

    pub fn build_provider(&self) -> Arc<dyn LLMProvider> {
        let api_key = self.api_key();
        if api_key.is_none() {
            tracing::warn!(var = %self.provider.api_key_env, "No API key set, requests go out unauthenticated");
        }
        Arc::new(
            OpenAICompatibleProvider::new(
                self.provider.base_url.clone(),
                api_key,
                self.provider.model.clone(),
            )
            .with_temperature(self.provider.temperature),
        )
    }
}

fn home_dir() -> Option<String> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .filter(|h| !h.is_empty())
}
