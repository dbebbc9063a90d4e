//! LLM-backed content shared by the code generation and writing handlers.

use crate::context::HandlerContext;
use crate::error::HandlerError;
use crate::os::filesystem;
use deskpilot_memory::{ChatHistory, Role};
use deskpilot_providers::{Message, ProviderError};
use std::path::{Path, PathBuf};

const MAX_SLUG_LEN: usize = 48;

/// The last `window` chat messages as provider messages, oldest first.
pub fn context_messages(history: &ChatHistory, window: usize) -> Vec<Message> {
    history
        .recent(window)
        .iter()
        .map(|m| match m.role {
            Role::User => Message::user(m.content.clone()),
            Role::Assistant => Message::assistant(m.content.clone()),
        })
        .collect()
}

/// Asks the provider for text, retrying up to `max_iterations` rounds.
/// The last provider error is reported once the cap is reached.
pub async fn generate_capped(
    ctx: &HandlerContext,
    history: &ChatHistory,
    system: &str,
    prompt: &str,
) -> Result<String, HandlerError> {
    let max_iterations = ctx.settings.max_iterations.max(1);
    let context = context_messages(history, ctx.settings.history_window);
    let mut last_error = ProviderError::Empty;

    for iteration in 1..=max_iterations {
        tracing::debug!(iteration, provider = ctx.provider.name(), context = context.len(), "Generation round");
        match ctx.provider.complete(system, &context, prompt).await {
            Ok(text) => return Ok(text),
            Err(e) => {
                tracing::warn!(iteration, error = %e, "Generation round failed");
                last_error = e;
            }
        }
    }

    Err(HandlerError::Generation(format!(
        "{} (gave up after {} attempts)",
        last_error, max_iterations
    )))
}

/// Lower-case words joined by `-`, at most a few dozen characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for word in text
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let extra = if slug.is_empty() { word.len() } else { word.len() + 1 };
        if slug.len() + extra > MAX_SLUG_LEN {
            break;
        }
        if !slug.is_empty() {
            slug.push('-');
        }
        slug.push_str(&word.to_ascii_lowercase());
    }

    if slug.is_empty() {
        "output".to_string()
    } else {
        slug
    }
}

/// First `<stem>.<ext>`, `<stem>-2.<ext>`, ... that does not exist yet.
pub fn unused_path(dir: &Path, stem: &str, extension: &str) -> PathBuf {
    let mut candidate = dir.join(format!("{}.{}", stem, extension));
    let mut n = 2;
    while candidate.exists() {
        candidate = dir.join(format!("{}-{}.{}", stem, n, extension));
        n += 1;
    }
    candidate
}

/// Writes generated text verbatim under the output directory.
pub async fn save_output(
    ctx: &HandlerContext,
    title: &str,
    extension: &str,
    content: &str,
) -> Result<PathBuf, HandlerError> {
    let dir = &ctx.settings.output_dir;
    filesystem::create_dir(dir).await?;
    let path = unused_path(dir, &slugify(title), extension);
    filesystem::write(&path, content).await?;
    tracing::info!(path = %path.display(), bytes = content.len(), "Saved generated output");
    Ok(path)
}
