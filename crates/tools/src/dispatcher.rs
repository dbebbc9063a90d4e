use crate::context::HandlerContext;
use crate::handlers::HandlerRegistry;
use deskpilot_core::{parse_route, Route};
use deskpilot_memory::ChatHistory;

/// Prefix on every reply produced from a handler error.
pub const ERROR_MARKER: &str = "Error: ";

/// Runs the parser and handler for a routed utterance. Always produces
/// exactly one reply string.
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// `history` holds the turns before this one.
    pub async fn dispatch(&self, ctx: &HandlerContext, history: &ChatHistory, route: &Route) -> String {
        let outcome = parse_route(route, &ctx.resolver, &ctx.parse_defaults());
        if let Some(reason) = outcome.reason() {
            tracing::warn!(intent = %route.intent, reason = %reason.as_str(), "Parser fell back to defaults");
        }

        let Some(handler) = self.registry.get(route.intent) else {
            tracing::error!(intent = %route.intent, "No handler registered");
            return format!("{}No handler for {}", ERROR_MARKER, route.intent);
        };

        match handler.execute(ctx, history, outcome).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!(intent = %route.intent, error = %e, "Handler failed");
                format!("{}{}", ERROR_MARKER, e)
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(HandlerRegistry::with_defaults())
    }
}
