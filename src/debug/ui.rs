use async_trait::async_trait;

/// User interaction the controller needs from the front end.
#[async_trait]
pub trait DebuggerUi: Send + Sync {
    /// Ask a yes/no question.
    async fn confirm(&self, message: &str) -> bool;

    /// Show a one-line error.
    fn show_error(&self, message: &str);
}
