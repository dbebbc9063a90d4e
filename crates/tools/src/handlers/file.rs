use super::{open_in_editor, wrong_command, Handler};
use crate::context::HandlerContext;
use crate::error::HandlerError;
use crate::os::filesystem::{self, DirEntryInfo};
use crate::os::OsError;
use async_trait::async_trait;
use deskpilot_core::{CanonicalPath, FileCommand, FileOperation, Intent, ParseOutcome, ParsedCommand};
use deskpilot_memory::ChatHistory;
use std::path::Path;

pub struct FileHandler;

/// Markdown listing with a folder/file marker per entry.
pub fn render_listing(path: &CanonicalPath, entries: &[DirEntryInfo]) -> String {
    let mut out = format!("**Contents of {}:**\n\n", path);
    if entries.is_empty() {
        out.push_str("(empty)");
        return out;
    }

    let lines: Vec<String> = entries
        .iter()
        .map(|entry| {
            let marker = if entry.is_dir { "📁" } else { "📄" };
            format!("- {} {}", marker, entry.name)
        })
        .collect();
    out.push_str(&lines.join("\n"));
    out
}

fn ensure_allowed(ctx: &HandlerContext, path: &CanonicalPath) -> Result<(), HandlerError> {
    if ctx.resolver.is_allowed(path) {
        Ok(())
    } else {
        tracing::warn!(path = %path, "Refused path outside allowed roots");
        Err(HandlerError::OutsideAllowList(path.to_string()))
    }
}

fn ensure_not_root(ctx: &HandlerContext, path: &CanonicalPath, verb: &str) -> Result<(), HandlerError> {
    if ctx.resolver.is_allowed_root(path) {
        return Err(HandlerError::InvalidInput(format!(
            "Refusing to {} the root {}",
            verb, path
        )));
    }
    Ok(())
}

fn destination(command: &FileCommand) -> Result<&CanonicalPath, HandlerError> {
    command
        .destination
        .as_ref()
        .ok_or_else(|| HandlerError::InvalidInput("No destination given".to_string()))
}

impl FileHandler {
    async fn run(&self, ctx: &HandlerContext, command: &FileCommand) -> Result<String, HandlerError> {
        let path = &command.path;

        match command.operation {
            FileOperation::List => match filesystem::list(path).await {
                Ok(entries) => Ok(render_listing(path, &entries)),
                Err(OsError::NotFound(_)) => Err(HandlerError::Execution(format!(
                    "Path does not exist: {}",
                    path
                ))),
                Err(e) => Err(e.into()),
            },
            FileOperation::CreateFolder => {
                ensure_allowed(ctx, path)?;
                filesystem::create_dir(path).await?;
                Ok(format!("Successfully created folder: {}", path))
            }
            FileOperation::CreateFile => {
                ensure_allowed(ctx, path)?;
                filesystem::create_file(path, command.content.as_deref().unwrap_or_default()).await?;
                Ok(format!("Successfully created file: {}", path))
            }
            FileOperation::Delete => {
                ensure_allowed(ctx, path)?;
                ensure_not_root(ctx, path, "delete")?;
                filesystem::delete(path).await?;
                Ok(format!("Successfully deleted: {}", path))
            }
            FileOperation::Copy => {
                let dest = destination(command)?;
                ensure_allowed(ctx, dest)?;
                let target = filesystem::copy_file(Path::new(path.as_str()), Path::new(dest.as_str())).await?;
                Ok(format!("Successfully copied {} to {}", path, target.display()))
            }
            FileOperation::Move => {
                let dest = destination(command)?;
                ensure_allowed(ctx, path)?;
                ensure_not_root(ctx, path, "move")?;
                ensure_allowed(ctx, dest)?;
                let target = filesystem::move_path(Path::new(path.as_str()), Path::new(dest.as_str())).await?;
                Ok(format!("Successfully moved {} to {}", path, target.display()))
            }
            FileOperation::OpenFile => {
                let target = Path::new(path.as_str());
                if !target.exists() {
                    return Err(HandlerError::Execution(format!("Path does not exist: {}", path)));
                }
                if target.is_dir() {
                    let entries = filesystem::list(target).await?;
                    return Ok(render_listing(path, &entries));
                }
                let editor = &ctx.settings.default_editor;
                open_in_editor(ctx, editor, target).await?;
                Ok(format!("Opened {} in {}", path, editor))
            }
            FileOperation::SaveContent => {
                let content = command
                    .content
                    .as_deref()
                    .ok_or_else(|| HandlerError::InvalidInput("No content to save".to_string()))?;
                ensure_allowed(ctx, path)?;
                filesystem::write(path, content).await?;
                Ok(format!("Successfully saved content to {}", path))
            }
        }
    }
}

#[async_trait]
impl Handler for FileHandler {
    fn intent(&self) -> Intent {
        Intent::FileOp
    }

    fn description(&self) -> &str {
        "List, create, delete, copy, move, open and save files and folders"
    }

    async fn execute(
        &self,
        ctx: &HandlerContext,
        _history: &ChatHistory,
        command: ParseOutcome<ParsedCommand>,
    ) -> Result<String, HandlerError> {
        let reason = command.reason().map(|r| r.as_str().to_string());
        let command = match command.into_value() {
            ParsedCommand::FileOp(cmd) => cmd,
            other => return Err(wrong_command(Intent::FileOp, &other)),
        };

        // A guessed path is fine for listing, never for removing or relocating.
        if let Some(reason) = reason {
            if matches!(
                command.operation,
                FileOperation::Delete | FileOperation::Move | FileOperation::Copy
            ) {
                return Err(HandlerError::InvalidInput(format!(
                    "Not sure what to {}: {}",
                    command.operation.verb(),
                    reason
                )));
            }
            tracing::warn!(%reason, operation = ?command.operation, "Running a defaulted file command");
        }

        tracing::info!(operation = ?command.operation, path = %command.path, "File operation");
        self.run(ctx, &command).await
    }
}
