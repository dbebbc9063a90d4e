use crate::os::OsError;
use deskpilot_providers::ProviderError;
use thiserror::Error;

/// Everything a handler can report. The dispatcher renders these as reply
/// text; none of them reach the session.
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("Could not resolve {0}")]
    Resolution(String),

    #[error("{0}")]
    Execution(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("{0} is outside the allowed locations")]
    OutsideAllowList(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl From<OsError> for HandlerError {
    fn from(e: OsError) -> Self {
        match e {
            OsError::Unsupported(what) => HandlerError::Unsupported(format!("Unsupported: {}", what)),
            other => HandlerError::Execution(other.to_string()),
        }
    }
}

impl From<ProviderError> for HandlerError {
    fn from(e: ProviderError) -> Self {
        HandlerError::Generation(e.to_string())
    }
}
