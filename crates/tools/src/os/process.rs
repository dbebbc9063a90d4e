//! Process management - probe the process table, spawn detached programs

use super::{OsError, OsResult};
use async_trait::async_trait;
use sysinfo::System;
use tokio::process::Command;
use tokio::task;

/// Read-only view of the running process table.
#[async_trait]
pub trait ProcessProbe: Send + Sync {
    async fn running_names(&self) -> OsResult<Vec<String>>;
}

/// Starts a program without waiting for it to exit.
#[async_trait]
pub trait Spawner: Send + Sync {
    async fn spawn(&self, program: &str, args: &[String]) -> OsResult<u32>;
}

pub struct SysinfoProbe;

#[async_trait]
impl ProcessProbe for SysinfoProbe {
    async fn running_names(&self) -> OsResult<Vec<String>> {
        task::spawn_blocking(|| {
            let mut system = System::new();
            system.refresh_processes();

            system
                .processes()
                .values()
                .map(|process| process.name().to_string())
                .collect()
        })
        .await
        .map_err(|e| OsError::OperationFailed(e.to_string()))
    }
}

pub struct TokioSpawner;

#[async_trait]
impl Spawner for TokioSpawner {
    async fn spawn(&self, program: &str, args: &[String]) -> OsResult<u32> {
        let program = program.trim();
        if program.is_empty() {
            return Err(OsError::InvalidArgument(
                "command cannot be empty".to_string(),
            ));
        }
        if args.iter().any(|arg| arg.contains('\0')) {
            return Err(OsError::InvalidArgument(
                "argument contains invalid control characters".to_string(),
            ));
        }

        tracing::info!("Spawning: {} {:?}", program, args);
        let child = Command::new(program).args(args).spawn().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OsError::NotFound(program.to_string()),
            std::io::ErrorKind::PermissionDenied => OsError::PermissionDenied(program.to_string()),
            _ => OsError::Io(e),
        })?;

        Ok(child.id().unwrap_or_default())
    }
}

/// True when any running process name contains one of `needles`
/// (case-insensitive). Blank needles never match.
pub fn matches_running(names: &[String], needles: &[&str]) -> bool {
    let needles: Vec<String> = needles
        .iter()
        .map(|n| n.trim().to_lowercase())
        .filter(|n| !n.is_empty())
        .collect();

    names.iter().any(|name| {
        let name = name.to_lowercase();
        needles.iter().any(|needle| name.contains(needle.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_running() {
        let names = vec!["Notepad.exe".to_string(), "gnome-calculator".to_string()];
        assert!(matches_running(&names, &["notepad"]));
        assert!(matches_running(&names, &["chrome", "calculator"]));
        assert!(!matches_running(&names, &["chrome"]));
        assert!(!matches_running(&names, &["  "]));
    }

    #[tokio::test]
    async fn test_spawn_rejects_empty_program() {
        assert!(matches!(
            TokioSpawner.spawn("  ", &[]).await,
            Err(OsError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_spawn_missing_program() {
        assert!(matches!(
            TokioSpawner.spawn("deskpilot-no-such-program", &[]).await,
            Err(OsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_probe_sees_something() {
        let names = SysinfoProbe.running_names().await.unwrap();
        assert!(!names.is_empty());
    }
}
