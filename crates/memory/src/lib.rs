pub mod history;
pub mod types;

pub use history::{ChatHistory, MemoryError};
pub use types::*;
