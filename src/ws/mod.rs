//! WebSocket client library
//!
//! A thin transport over tokio-tungstenite: bounded handshake, text
//! frames in and out, protocol pings answered transparently and an
//! idempotent close. Retry policy lives with the caller.

mod client;
mod types;

pub use client::WsConnection;
pub use types::{WsConfig, WsError, WsMessage};
