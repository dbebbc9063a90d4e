use super::generation::{generate_capped, save_output};
use super::{open_in_editor, wrong_command, Handler};
use crate::context::HandlerContext;
use crate::error::HandlerError;
use async_trait::async_trait;
use deskpilot_core::{Intent, ParseOutcome, ParsedCommand};
use deskpilot_memory::ChatHistory;

const SYSTEM_PROMPT: &str = "You are a writing assistant. Produce well-structured plain text \
    with a title line and short paragraphs. No markdown.";

pub struct WriterHandler;

#[async_trait]
impl Handler for WriterHandler {
    fn intent(&self) -> Intent {
        Intent::WriteContent
    }

    fn description(&self) -> &str {
        "Write text about a topic and open it in an editor, e.g. 'write an essay about rivers'"
    }

    async fn execute(
        &self,
        ctx: &HandlerContext,
        history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError> {
        let command = match command.into_value() {
            ParsedCommand::WriteContent(cmd) => cmd,
            other => return Err(wrong_command(Intent::WriteContent, &other)),
        };
        if command.topic.is_empty() {
            return Err(HandlerError::InvalidInput("What should I write about?".to_string()));
        }

        let prompt = format!("Write about: {}", command.topic);
        let text = generate_capped(ctx, history, SYSTEM_PROMPT, &prompt).await?;
        let path = save_output(ctx, &command.topic, "txt", &text).await?;

        match open_in_editor(ctx, &command.editor, &path).await {
            Ok(()) => Ok(format!(
                "Wrote about '{}' in {} (saved to {})",
                command.topic,
                command.editor,
                path.display()
            )),
            Err(e) => {
                tracing::warn!(editor = %command.editor, error = %e, "Editor did not start");
                Ok(format!(
                    "Wrote about '{}' and saved it to {} (could not open {}: {})",
                    command.topic,
                    path.display(),
                    command.editor,
                    e
                ))
            }
        }
    }
}
