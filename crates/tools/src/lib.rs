pub mod context;
pub mod dispatcher;
pub mod error;
pub mod handlers;
pub mod os;

pub use context::{HandlerContext, HandlerSettings};
pub use dispatcher::{Dispatcher, ERROR_MARKER};
pub use error::HandlerError;
pub use handlers::{Handler, HandlerRegistry};
pub use os::{OsError, OsResult, Platform};
