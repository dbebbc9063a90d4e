use crate::os::control::{platform_surface, ControlSurface};
use crate::os::process::{ProcessProbe, Spawner, SysinfoProbe, TokioSpawner};
use crate::os::Platform;
use deskpilot_core::{EditorId, ParseDefaults, PathResolver};
use deskpilot_executor::CommandExecutor;
use deskpilot_providers::LLMProvider;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub platform: Platform,
    pub default_editor: EditorId,
    /// Where generated code and writing are saved.
    pub output_dir: PathBuf,
    /// Generation attempts per request.
    pub max_iterations: usize,
    /// Earlier chat messages sent along with a generation prompt.
    pub history_window: usize,
    pub percent_step: u8,
    pub volume_step: f32,
    /// Also open the desktop calculator after evaluating.
    pub open_calculator: bool,
}

impl HandlerSettings {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            platform,
            default_editor: default_editor(platform),
            output_dir: PathBuf::from("deskpilot-output"),
            max_iterations: 3,
            history_window: 6,
            percent_step: 20,
            volume_step: 0.2,
            open_calculator: false,
        }
    }
}

impl Default for HandlerSettings {
    fn default() -> Self {
        Self::for_platform(Platform::host())
    }
}

pub fn default_editor(platform: Platform) -> EditorId {
    match platform {
        Platform::Windows => EditorId::new("notepad.exe"),
        Platform::MacOs => EditorId::new("TextEdit"),
        Platform::Linux => EditorId::new("gedit"),
    }
}

/// Everything one session's handlers act through. Built once at session
/// start and passed by reference into every handler call.
pub struct HandlerContext {
    pub resolver: PathResolver,
    pub processes: Arc<dyn ProcessProbe>,
    pub spawner: Arc<dyn Spawner>,
    pub surface: Arc<dyn ControlSurface>,
    pub provider: Arc<dyn LLMProvider>,
    pub settings: HandlerSettings,
}

impl HandlerContext {
    /// Context backed by the real process table, spawner and hardware.
    pub fn new(resolver: PathResolver, provider: Arc<dyn LLMProvider>, settings: HandlerSettings) -> Self {
        let runner = Arc::new(CommandExecutor::default());
        Self {
            resolver,
            processes: Arc::new(SysinfoProbe),
            spawner: Arc::new(TokioSpawner),
            surface: platform_surface(settings.platform, runner),
            provider,
            settings,
        }
    }

    pub fn with_processes(mut self, processes: Arc<dyn ProcessProbe>) -> Self {
        self.processes = processes;
        self
    }

    pub fn with_spawner(mut self, spawner: Arc<dyn Spawner>) -> Self {
        self.spawner = spawner;
        self
    }

    pub fn with_surface(mut self, surface: Arc<dyn ControlSurface>) -> Self {
        self.surface = surface;
        self
    }

    pub fn parse_defaults(&self) -> ParseDefaults {
        ParseDefaults {
            editor: self.settings.default_editor.clone(),
        }
    }
}
