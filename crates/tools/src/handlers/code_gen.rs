use super::generation::{generate_capped, save_output};
use super::{open_in_editor, wrong_command, Handler};
use crate::context::HandlerContext;
use crate::error::HandlerError;
use async_trait::async_trait;
use deskpilot_core::{CodeGenCommand, Intent, ParseOutcome, ParsedCommand};
use deskpilot_memory::ChatHistory;

pub struct CodeGenHandler;

pub fn system_prompt(command: &CodeGenCommand) -> String {
    format!(
        "You are a programming assistant. Reply with complete, runnable {} source code only. \
         Do not add explanations outside code comments.",
        command.language.name()
    )
}

pub fn user_prompt(command: &CodeGenCommand) -> String {
    format!("Write {} code for: {}", command.language.name(), command.problem)
}

#[async_trait]
impl Handler for CodeGenHandler {
    fn intent(&self) -> Intent {
        Intent::GenerateCode
    }

    fn description(&self) -> &str {
        "Generate source code and open it in an editor, e.g. 'write python code for fibonacci'"
    }

    async fn execute(
        &self,
        ctx: &HandlerContext,
        history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError> {
        let command = match command.into_value() {
            ParsedCommand::GenerateCode(cmd) => cmd,
            other => return Err(wrong_command(Intent::GenerateCode, &other)),
        };
        if command.problem.is_empty() {
            return Err(HandlerError::InvalidInput(
                "Tell me what the code should do".to_string(),
            ));
        }

        let code = generate_capped(ctx, history, &system_prompt(&command), &user_prompt(&command)).await?;
        let path = save_output(ctx, &command.problem, command.language.extension(), &code).await?;

        let mut reply = format!(
            "Generated {} code for '{}' and saved it to {}",
            command.language.name(),
            command.problem,
            path.display()
        );
        match open_in_editor(ctx, &command.editor, &path).await {
            Ok(()) => reply.push_str(&format!(" (opened in {})", command.editor)),
            Err(e) => {
                tracing::warn!(editor = %command.editor, error = %e, "Editor did not start");
                reply.push_str(&format!(" (could not open {}: {})", command.editor, e));
            }
        }
        Ok(reply)
    }
}
