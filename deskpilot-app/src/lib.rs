pub mod config;
pub mod repl;
pub mod session;

pub use config::Config;
pub use session::Session;

use deskpilot_core::Router;
use deskpilot_tools::{Dispatcher, HandlerContext, Platform};

/// Session wired to the real OS collaborators described by `config`.
pub fn build_session(config: &Config) -> Session {
    let platform = Platform::host();
    let ctx = HandlerContext::new(
        config.resolver(),
        config.build_provider(),
        config.handler_settings(platform),
    );
    Session::new(
        Router::new(config.default_intent),
        Dispatcher::default(),
        ctx,
    )
}
