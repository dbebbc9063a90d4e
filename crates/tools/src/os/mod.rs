//! OS capability layer used by the domain handlers.
//!
//! - Filesystem operations
//! - Process table probing and spawning
//! - Hardware control surfaces (brightness, volume, bluetooth)

pub mod control;
pub mod filesystem;
pub mod process;

use deskpilot_executor::ExecutorError;

/// OS capability error types
#[derive(Debug, thiserror::Error)]
pub enum OsError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type OsResult<T> = Result<T, OsError>;

impl From<ExecutorError> for OsError {
    fn from(e: ExecutorError) -> Self {
        match e {
            ExecutorError::NotWhitelisted(cmd) => OsError::PermissionDenied(cmd),
            ExecutorError::Unavailable(cmd) => OsError::Unsupported(format!("{} is not installed", cmd)),
            ExecutorError::ExecutionFailed(msg) => OsError::OperationFailed(msg),
        }
    }
}

/// Desktop platform the session drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
}

impl Platform {
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }
}
