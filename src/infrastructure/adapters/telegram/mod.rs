//! Telegram notifier

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::application::errors::NotifyError;
use crate::domain::entities::User;
use crate::domain::traits::Notifier;
use crate::infrastructure::adapters::console::ConsoleNotifier;

/// Telegram API base URL
const API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Sends notifications to each user's Telegram chat.
///
/// Users without a chat id are handed to the console notifier.
pub struct TelegramNotifier {
    token: String,
    client: Client,
    fallback: ConsoleNotifier,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            client: Client::new(),
            fallback: ConsoleNotifier::new(),
        }
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", API_BASE, self.token, method)
    }

    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<(), NotifyError> {
        let request = SendMessageRequest {
            chat_id,
            text,
            disable_web_page_preview: true,
        };

        let response = self.client
            .post(self.api_url("sendMessage"))
            .json(&request)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;

        let status = response.status();
        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Network(e.without_url().to_string()))?;

        if !status.is_success() || !body.ok {
            return Err(NotifyError::Rejected {
                channel: self.name().to_string(),
                message: body.description.unwrap_or_else(|| status.to_string()),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_notification(&self, user: &User, text: &str) -> Result<(), NotifyError> {
        match user.telegram_chat_id.as_deref().filter(|id| !id.is_empty()) {
            Some(chat_id) => {
                tracing::debug!("Sending to {} (chat {})", user.email, chat_id);
                self.send_message(chat_id, text).await
            }
            None => self.fallback.send_notification(user, text).await,
        }
    }

    fn name(&self) -> &str {
        "telegram"
    }
}
