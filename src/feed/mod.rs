//! Price feed module
//!
//! Subscription-scoped streaming connections that yield parsed ticks for
//! one instrument from the Bybit public WebSocket.

mod bybit;
mod types;

pub use bybit::{
    parse_ticker_message, BybitConnection, BybitConnector, FeedConfig, BYBIT_LINEAR_WS_URL,
};
pub use types::{Instrument, PriceTick};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Feed failures. All of them are recoverable from the monitor's point of view.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Could not connect or subscribe
    #[error("Connect failed: {0}")]
    Connect(String),
    /// No accepted tick within the read window
    #[error("No tick received within the read timeout")]
    Timeout,
    /// Transport failed mid-stream
    #[error("Connection lost: {0}")]
    ConnectionLost(String),
}

/// Opens subscriptions for a single instrument
#[async_trait]
pub trait FeedConnector: Send + Sync {
    /// Connection type handed out by `open`
    type Connection: FeedConnection;

    /// Connect and subscribe to the instrument's ticker channel
    async fn open(&self, instrument: &Instrument) -> Result<Self::Connection, FeedError>;
}

/// A live subscription
#[async_trait]
pub trait FeedConnection: Send {
    /// Wait up to `timeout` for the next tick of the subscribed instrument
    async fn next_tick(&mut self, timeout: Duration) -> Result<PriceTick, FeedError>;

    /// Release the transport. Safe to call repeatedly and after a failure.
    async fn close(&mut self);
}

/// Open a short-lived subscription and return its first tick
pub async fn fetch_last_price<C>(
    connector: &C,
    instrument: &Instrument,
    timeout: Duration,
) -> Result<PriceTick, FeedError>
where
    C: FeedConnector,
{
    let mut conn = connector.open(instrument).await?;
    let result = conn.next_tick(timeout).await;
    conn.close().await;
    result
}
