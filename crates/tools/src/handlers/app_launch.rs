use super::{wrong_command, Handler};
use crate::context::HandlerContext;
use crate::error::HandlerError;
use crate::os::process::matches_running;
use crate::os::Platform;
use async_trait::async_trait;
use deskpilot_core::{Intent, ParseOutcome, ParsedCommand};
use deskpilot_memory::ChatHistory;
use std::path::{Path, PathBuf};

const WINDOWS_APPS: &[(&str, &str)] = &[
    ("notepad", "notepad.exe"),
    ("chrome", "chrome.exe"),
    ("calculator", "calc.exe"),
    ("word", "winword.exe"),
    ("excel", "excel.exe"),
    ("powerpoint", "powerpnt.exe"),
    ("paint", "mspaint.exe"),
    ("cmd", "cmd.exe"),
    ("explorer", "explorer.exe"),
];

const MAC_APPS: &[(&str, &str)] = &[
    ("notepad", "TextEdit"),
    ("chrome", "Google Chrome"),
    ("calculator", "Calculator"),
    ("word", "Microsoft Word"),
    ("excel", "Microsoft Excel"),
    ("powerpoint", "Microsoft PowerPoint"),
    ("terminal", "Terminal"),
    ("explorer", "Finder"),
];

const LINUX_APPS: &[(&str, &str)] = &[
    ("notepad", "gedit"),
    ("chrome", "google-chrome"),
    ("calculator", "gnome-calculator"),
    ("word", "libreoffice"),
    ("excel", "libreoffice"),
    ("terminal", "gnome-terminal"),
    ("explorer", "nautilus"),
];

/// Program and arguments that start an application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub program: String,
    pub args: Vec<String>,
    /// Name to look for in the process table.
    pub process_name: String,
}

fn alias(table: &[(&str, &'static str)], app: &str) -> Option<&'static str> {
    let key = app.to_lowercase();
    table.iter().find(|(name, _)| *name == key).map(|(_, exe)| *exe)
}

/// How `app` is started on `platform`. `system_dir` is `%WINDIR%\System32`
/// when known; aliased Windows programs found there are run by full path.
pub fn plan_launch(platform: Platform, app: &str, system_dir: Option<&Path>) -> LaunchPlan {
    match platform {
        Platform::Windows => {
            let executable = alias(WINDOWS_APPS, app);
            let process_name = executable.unwrap_or(app).to_string();
            if let Some(full) = executable
                .zip(system_dir)
                .map(|(exe, dir)| dir.join(exe))
                .filter(|p| p.exists())
            {
                return LaunchPlan {
                    program: full.display().to_string(),
                    args: Vec::new(),
                    process_name,
                };
            }
            LaunchPlan {
                program: "cmd".to_string(),
                args: vec![
                    "/C".to_string(),
                    "start".to_string(),
                    String::new(),
                    executable.unwrap_or(app).to_string(),
                ],
                process_name,
            }
        }
        Platform::MacOs => {
            let bundle = alias(MAC_APPS, app).unwrap_or(app).to_string();
            LaunchPlan {
                program: "open".to_string(),
                args: vec!["-a".to_string(), bundle.clone()],
                process_name: bundle,
            }
        }
        Platform::Linux => {
            let program = alias(LINUX_APPS, app).unwrap_or(app).to_string();
            LaunchPlan {
                program: program.clone(),
                args: Vec::new(),
                process_name: program,
            }
        }
    }
}

fn system_dir() -> Option<PathBuf> {
    std::env::var_os("WINDIR").map(|dir| PathBuf::from(dir).join("System32"))
}

/// Characters cmd.exe treats as command syntax, so an app name never
/// chains a second command through `cmd /C start`.
const SHELL_METACHARACTERS: &[char] = &['&', '|', '<', '>', '^', '%', '"', '!', ';', '(', ')', '`'];

fn validate_app_name(app: &str) -> Result<(), HandlerError> {
    if app.trim().is_empty() {
        return Err(HandlerError::InvalidInput("No application named".to_string()));
    }
    if app.chars().any(|c| c.is_control()) {
        return Err(HandlerError::InvalidInput(
            "Application name contains control characters".to_string(),
        ));
    }
    if let Some(c) = app.chars().find(|c| SHELL_METACHARACTERS.contains(c)) {
        return Err(HandlerError::InvalidInput(format!(
            "Application name cannot contain '{}'",
            c
        )));
    }
    Ok(())
}

pub struct AppLaunchHandler;

#[async_trait]
impl Handler for AppLaunchHandler {
    fn intent(&self) -> Intent {
        Intent::LaunchApp
    }

    fn description(&self) -> &str {
        "Launch an application, e.g. 'open notepad'"
    }

    async fn execute(
        &self,
        ctx: &HandlerContext,
        _history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError> {
        let app = match command.into_value() {
            ParsedCommand::LaunchApp(cmd) => cmd.app_name,
            other => return Err(wrong_command(Intent::LaunchApp, &other)),
        };
        validate_app_name(&app)?;

        let plan = plan_launch(ctx.settings.platform, &app, system_dir().as_deref());

        match ctx.processes.running_names().await {
            Ok(names) if matches_running(&names, &[&app, &plan.process_name]) => {
                tracing::info!(%app, "Already running, not spawning");
                return Ok(format!("{} is already running.", app));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Process table unavailable, launching anyway"),
        }

        ctx.spawner
            .spawn(&plan.program, &plan.args)
            .await
            .map_err(|e| HandlerError::Execution(format!("Failed to launch {}: {}", app, e)))?;

        tracing::info!(%app, program = %plan.program, "Launched");
        Ok(format!("Successfully launched {}", app))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_alias_falls_back_to_start() {
        let plan = plan_launch(Platform::Windows, "Notepad", None);
        assert_eq!(plan.program, "cmd");
        assert_eq!(plan.args, vec!["/C", "start", "", "notepad.exe"]);
        assert_eq!(plan.process_name, "notepad.exe");
    }

    #[test]
    fn test_windows_uses_system_dir_when_present() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("calc.exe"), "").unwrap();

        let plan = plan_launch(Platform::Windows, "calculator", Some(dir.path()));
        assert_eq!(plan.program, dir.path().join("calc.exe").display().to_string());
        assert!(plan.args.is_empty());
    }

    #[test]
    fn test_rejects_chained_commands() {
        assert!(validate_app_name("notepad").is_ok());
        assert!(validate_app_name("Google Chrome").is_ok());
        for name in ["notepad&calc", "notepad | more", "calc^&whoami", "a%PATH%", "x > out.txt"] {
            assert!(
                matches!(validate_app_name(name), Err(HandlerError::InvalidInput(_))),
                "{} should be refused",
                name
            );
        }
    }

    #[test]
    fn test_mac_and_linux_plans() {
        let plan = plan_launch(Platform::MacOs, "chrome", None);
        assert_eq!(plan.program, "open");
        assert_eq!(plan.args, vec!["-a", "Google Chrome"]);

        let plan = plan_launch(Platform::Linux, "firefox", None);
        assert_eq!(plan.program, "firefox");
        assert_eq!(plan.process_name, "firefox");
    }
}
