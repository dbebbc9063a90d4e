pub mod app_launch;
pub mod calculator;
pub mod code_gen;
pub mod file;
pub mod generation;
pub mod system;
pub mod writer;

pub use app_launch::AppLaunchHandler;
pub use calculator::CalculatorHandler;
pub use code_gen::CodeGenHandler;
pub use file::FileHandler;
pub use system::SystemHandler;
pub use writer::WriterHandler;

use crate::context::HandlerContext;
use crate::error::HandlerError;
use crate::os::Platform;
use async_trait::async_trait;
use deskpilot_core::{EditorId, Intent, ParseOutcome, ParsedCommand};
use deskpilot_memory::ChatHistory;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// One capability domain: takes its parsed command and performs a single
/// OS-effecting action.
#[async_trait]
pub trait Handler: Send + Sync {
    fn intent(&self) -> Intent;
    fn description(&self) -> &str;

    /// `command` keeps its parse tag so a handler can refuse a guess.
    /// `history` is the conversation before this turn; handlers only read it.
    async fn execute(
        &self,
        ctx: &HandlerContext,
        history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError>;
}

pub struct HandlerRegistry {
    handlers: HashMap<Intent, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// All six domain handlers.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(AppLaunchHandler));
        registry.register(Arc::new(WriterHandler));
        registry.register(Arc::new(FileHandler));
        registry.register(Arc::new(CodeGenHandler));
        registry.register(Arc::new(CalculatorHandler));
        registry.register(Arc::new(SystemHandler));
        registry
    }

    pub fn register(&mut self, handler: Arc<dyn Handler>) {
        self.handlers.insert(handler.intent(), handler);
    }

    pub fn get(&self, intent: Intent) -> Option<Arc<dyn Handler>> {
        self.handlers.get(&intent).cloned()
    }

    /// Registered intents in a stable order.
    pub fn list(&self) -> Vec<Intent> {
        Intent::ALL
            .iter()
            .copied()
            .filter(|intent| self.handlers.contains_key(intent))
            .collect()
    }

    pub fn descriptions(&self) -> Vec<(Intent, String)> {
        self.list()
            .into_iter()
            .filter_map(|intent| {
                self.handlers
                    .get(&intent)
                    .map(|h| (intent, h.description().to_string()))
            })
            .collect()
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

pub(crate) fn wrong_command(expected: Intent, got: &ParsedCommand) -> HandlerError {
    HandlerError::InvalidInput(format!(
        "{} handler cannot run a {} command",
        expected,
        got.intent()
    ))
}

/// Opens `path` in `editor` without waiting for it.
pub(crate) async fn open_in_editor(
    ctx: &HandlerContext,
    editor: &EditorId,
    path: &Path,
) -> Result<(), HandlerError> {
    let target = path.display().to_string();
    let (program, args) = match ctx.settings.platform {
        Platform::MacOs => (
            "open".to_string(),
            vec!["-a".to_string(), editor.program().to_string(), target],
        ),
        _ => (editor.program().to_string(), vec![target]),
    };

    ctx.spawner.spawn(&program, &args).await?;
    tracing::info!(editor = %editor, path = %path.display(), "Opened in editor");
    Ok(())
}
