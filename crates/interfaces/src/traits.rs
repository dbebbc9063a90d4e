use async_trait::async_trait;

/// Where the chat shell reads utterances and renders replies.
#[async_trait]
pub trait Interface: Send + Sync {
    /// Next line from the user, trimmed. `None` once input is closed.
    async fn receive_input(&self) -> Option<String>;
    async fn send_output(&self, message: &str);
    async fn show_status(&self, status: &str);
    async fn show_error(&self, error: &str);
}
