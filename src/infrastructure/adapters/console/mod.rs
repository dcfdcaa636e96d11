//! Console notifier for users without a delivery channel

use async_trait::async_trait;

use crate::application::errors::NotifyError;
use crate::domain::entities::User;
use crate::domain::traits::Notifier;

/// Writes notifications to the log instead of delivering them
#[derive(Debug, Default, Clone)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn send_notification(&self, user: &User, text: &str) -> Result<(), NotifyError> {
        tracing::info!("[notify {}] {}", user.email, text);
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
