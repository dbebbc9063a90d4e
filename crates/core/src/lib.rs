pub mod keywords;
pub mod parser;
pub mod resolver;
pub mod router;
pub mod types;

pub use parser::{parse_route, ParseDefaults};
pub use resolver::{DriveShortcut, PathResolver, PathStyle, ResolveError};
pub use router::{Route, Router, CODE_REQUEST_MARKER};
pub use types::*;
