//! Alert delivery
//!
//! The monitor only needs `AlertDispatcher::send`; Telegram is the
//! production channel.

mod format;
mod telegram;

pub use format::{format_alert, format_usd};
pub use telegram::{TelegramConfig, TelegramDispatcher, TELEGRAM_API_URL};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Delivery failures. The monitor never retries these.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A required credential is missing
    #[error("Notification channel not configured: missing {0}")]
    NotConfigured(&'static str),
    /// Request could not be sent or the response could not be read
    #[error("Transport error: {0}")]
    Transport(String),
    /// The API answered with a non-success status
    #[error("Rejected with status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sends one formatted alert message. Must tolerate concurrent calls.
#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), DispatchError>;
}

#[async_trait]
impl<T: AlertDispatcher + ?Sized> AlertDispatcher for Arc<T> {
    async fn send(&self, message: &str) -> Result<(), DispatchError> {
        (**self).send(message).await
    }
}
