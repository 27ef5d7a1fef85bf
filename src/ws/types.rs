//! WebSocket types and configuration

use std::time::Duration;

/// WebSocket connection configuration
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket URL to connect to
    pub url: String,
    /// Upper bound on the TCP + TLS + upgrade handshake
    pub connect_timeout: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl WsConfig {
    /// Create a new config with the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the handshake timeout
    pub fn connect_timeout(mut self, d: Duration) -> Self {
        self.connect_timeout = d;
        self
    }
}

/// Data frames surfaced to callers. Control frames are handled by the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsMessage {
    /// Text message
    Text(String),
    /// Binary message
    Binary(Vec<u8>),
}

/// WebSocket errors
#[derive(Debug, Clone)]
pub enum WsError {
    /// Handshake or read failed
    ConnectionFailed(String),
    /// Handshake did not finish within the configured timeout
    Timeout,
    /// Send failed
    SendFailed(String),
    /// Peer closed the connection, or it was closed locally
    Closed,
}

impl std::fmt::Display for WsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WsError::ConnectionFailed(e) => write!(f, "Connection failed: {}", e),
            WsError::Timeout => write!(f, "Connection timed out"),
            WsError::SendFailed(e) => write!(f, "Send failed: {}", e),
            WsError::Closed => write!(f, "Connection closed"),
        }
    }
}

impl std::error::Error for WsError {}
