use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Command not whitelisted: {0}")]
    NotWhitelisted(String),
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Command not installed: {0}")]
    Unavailable(String),
}

/// Runs an external program to completion and returns its stdout.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, args: &[String]) -> Result<String, ExecutorError>;
}

pub struct CommandExecutor {
    whitelist: Vec<String>,
}

impl CommandExecutor {
    pub fn new(whitelist: Vec<String>) -> Self {
        Self { whitelist }
    }

    /// Hardware control utilities used by the system-control handler.
    pub fn default_whitelist() -> Vec<String> {
        [
            "brightnessctl",
            "wpctl",
            "bluetoothctl",
            "osascript",
            "blueutil",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn is_whitelisted(&self, command: &str) -> bool {
        self.whitelist.iter().any(|w| w == command)
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new(Self::default_whitelist())
    }
}

#[async_trait]
impl CommandRunner for CommandExecutor {
    async fn run(&self, command: &str, args: &[String]) -> Result<String, ExecutorError> {
        if !self.is_whitelisted(command) {
            return Err(ExecutorError::NotWhitelisted(command.to_string()));
        }

        tracing::info!("Executing command: {} {:?}", command, args);

        let output = tokio::process::Command::new(command)
            .args(args)
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => ExecutorError::Unavailable(command.to_string()),
                _ => ExecutorError::ExecutionFailed(e.to_string()),
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(ExecutorError::ExecutionFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_whitelisted_command() {
        let executor = CommandExecutor::new(vec!["echo".to_string()]);
        let result = executor.run("echo", &["hello".to_string()]).await;
        assert_eq!(result.unwrap().trim(), "hello");
    }

    #[tokio::test]
    async fn test_non_whitelisted_command() {
        let executor = CommandExecutor::default();
        let result = executor.run("rm", &["-rf".to_string()]).await;
        assert!(matches!(result, Err(ExecutorError::NotWhitelisted(_))));
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let executor = CommandExecutor::new(vec!["deskpilot-no-such-tool".to_string()]);
        let result = executor.run("deskpilot-no-such-tool", &[]).await;
        assert!(matches!(result, Err(ExecutorError::Unavailable(_))));
    }

    #[tokio::test]
    async fn test_default_whitelist_is_hardware_tools_only() {
        let executor = CommandExecutor::default();
        for command in ["sh", "pactl", "nmcli"] {
            let result = executor.run(command, &[]).await;
            assert!(matches!(result, Err(ExecutorError::NotWhitelisted(_))), "{}", command);
        }
    }
}
