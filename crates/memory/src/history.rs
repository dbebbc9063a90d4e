use crate::types::*;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Append-only conversation log owned by one session.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::assistant(content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Ends the current conversation. Only the shell's `clear` command
    /// calls this; nothing else removes messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.messages.iter().map(TranscriptEntry::from).collect()
    }

    /// Writes the transcript as a JSON array of `{role, content}`.
    pub async fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), MemoryError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(&self.transcript())?;
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, path).await?;

        tracing::info!(messages = self.messages.len(), "Exported transcript to {:?}", path);
        Ok(())
    }
}
