//! Telegram Bot API dispatcher

use super::{AlertDispatcher, DispatchError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Telegram Bot API base URL
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Configuration for the Telegram dispatcher
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Base URL for the Bot API
    pub api_url: String,
    /// Bot token issued by BotFather
    pub bot_token: String,
    /// Destination chat identifier
    pub chat_id: String,
    /// Message parse mode
    pub parse_mode: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_url: TELEGRAM_API_URL.to_string(),
            bot_token: String::new(),
            chat_id: String::new(),
            parse_mode: "Markdown".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl TelegramConfig {
    /// Whether both credentials are present
    pub fn is_configured(&self) -> bool {
        !self.bot_token.is_empty() && !self.chat_id.is_empty()
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Sends alerts with `sendMessage`
pub struct TelegramDispatcher {
    config: TelegramConfig,
    client: Client,
}

impl TelegramDispatcher {
    /// Create a dispatcher with the given configuration
    pub fn new(config: TelegramConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl AlertDispatcher for TelegramDispatcher {
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        if self.config.bot_token.is_empty() {
            return Err(DispatchError::NotConfigured("bot_token"));
        }
        if self.config.chat_id.is_empty() {
            return Err(DispatchError::NotConfigured("chat_id"));
        }

        let body = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text: message,
            parse_mode: &self.config.parse_mode,
        };

        let response = self
            .client
            .post(self.send_message_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(chat_id = %self.config.chat_id, "Telegram message delivered");
        Ok(())
    }
}
