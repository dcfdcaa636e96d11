use async_trait::async_trait;
use crate::application::errors::NotifyError;
use crate::domain::entities::User;

/// Notifier trait - best-effort delivery of a text to a user's channel
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_notification(&self, user: &User, text: &str) -> Result<(), NotifyError>;

    /// Channel name, for logs
    fn name(&self) -> &str;
}
