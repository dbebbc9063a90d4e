use deskpilot_core::{parse_route, ParseOutcome, ParsedCommand, Route, Router};
use deskpilot_memory::{ChatHistory, MemoryError};
use deskpilot_tools::{Dispatcher, HandlerContext};
use std::path::Path;

/// One chat session: routes each utterance, runs its handler and keeps
/// the conversation. Turns are strictly sequential.
pub struct Session {
    router: Router,
    dispatcher: Dispatcher,
    ctx: HandlerContext,
    history: ChatHistory,
}

impl Session {
    pub fn new(router: Router, dispatcher: Dispatcher, ctx: HandlerContext) -> Self {
        Self {
            router,
            dispatcher,
            ctx,
            history: ChatHistory::new(),
        }
    }

    pub fn with_context(ctx: HandlerContext) -> Self {
        Self::new(Router::default(), Dispatcher::default(), ctx)
    }

    /// Route, dispatch, record both sides of the exchange, return the reply.
    pub async fn turn(&mut self, utterance: &str) -> String {
        let route = self.router.route(utterance);
        tracing::debug!(intent = %route.intent, forced = route.forced, "Turn routed");

        let reply = self.dispatcher.dispatch(&self.ctx, &self.history, &route).await;
        self.history.push_user(utterance);
        self.history.push_assistant(reply.clone());
        reply
    }

    /// Routing and parsing without executing anything.
    pub fn preview(&self, utterance: &str) -> (Route, ParseOutcome<ParsedCommand>) {
        let route = self.router.route(utterance);
        let outcome = parse_route(&route, &self.ctx.resolver, &self.ctx.parse_defaults());
        (route, outcome)
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub async fn export(&self, path: &Path) -> Result<(), MemoryError> {
        self.history.export(path).await
    }
}
