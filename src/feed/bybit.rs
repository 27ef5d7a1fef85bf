//! Bybit public WebSocket ticker feed

use super::{FeedConnection, FeedConnector, FeedError, Instrument, PriceTick};
use crate::ws::{WsConfig, WsConnection, WsMessage};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Bybit v5 public stream for USDT perpetuals
pub const BYBIT_LINEAR_WS_URL: &str = "wss://stream.bybit.com/v5/public/linear";

/// Streaming endpoint configuration
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// WebSocket URL (defaults to BYBIT_LINEAR_WS_URL)
    pub ws_url: String,
    /// Handshake timeout
    pub connect_timeout: Duration,
    /// Interval between application-level `{"op":"ping"}` heartbeats
    pub ping_interval: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: BYBIT_LINEAR_WS_URL.to_string(),
            connect_timeout: Duration::from_secs(5),
            ping_interval: Duration::from_secs(20),
        }
    }
}

/// Outbound control message (`subscribe`, `ping`)
#[derive(Debug, Serialize)]
struct ControlMessage {
    op: &'static str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    args: Vec<String>,
}

impl ControlMessage {
    fn subscribe(topic: String) -> Self {
        Self {
            op: "subscribe",
            args: vec![topic],
        }
    }

    fn ping() -> Self {
        Self {
            op: "ping",
            args: Vec::new(),
        }
    }
}

/// Ticker push message. Acks and pongs deserialize too, with no topic.
#[derive(Debug, Deserialize)]
struct TickerMessage {
    topic: Option<String>,
    /// Server timestamp (milliseconds)
    ts: Option<i64>,
    data: Option<TickerData>,
}

#[derive(Debug, Deserialize)]
struct TickerData {
    /// Sent as a string; absent from most delta updates
    #[serde(rename = "lastPrice")]
    last_price: Option<serde_json::Value>,
}

/// Parse a raw stream message into a tick for `instrument`.
///
/// Returns `None` for anything that is not a ticker update with a numeric
/// last price on the instrument's own channel.
pub fn parse_ticker_message(text: &str, instrument: &Instrument) -> Option<PriceTick> {
    let msg: TickerMessage = serde_json::from_str(text).ok()?;

    let topic = msg.topic?;
    if topic.strip_prefix("tickers.") != Some(instrument.symbol()) {
        return None;
    }

    let last_price = parse_price(msg.data?.last_price.as_ref()?)?;
    let exchange_ts = msg
        .ts
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single());

    Some(PriceTick {
        instrument: instrument.clone(),
        last_price,
        received_at: Utc::now(),
        exchange_ts,
    })
}

fn parse_price(value: &serde_json::Value) -> Option<Decimal> {
    let raw = match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

/// Opens Bybit ticker subscriptions
#[derive(Debug, Clone, Default)]
pub struct BybitConnector {
    config: FeedConfig,
}

impl BybitConnector {
    /// Create a connector with the given configuration
    pub fn new(config: FeedConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FeedConnector for BybitConnector {
    type Connection = BybitConnection;

    async fn open(&self, instrument: &Instrument) -> Result<BybitConnection, FeedError> {
        let ws_config =
            WsConfig::new(&self.config.ws_url).connect_timeout(self.config.connect_timeout);

        let mut ws = WsConnection::connect(&ws_config)
            .await
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        let topic = instrument.ticker_topic();
        let request = serde_json::to_string(&ControlMessage::subscribe(topic.clone()))
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        if let Err(e) = ws.send_text(request).await {
            ws.close().await;
            return Err(FeedError::Connect(e.to_string()));
        }

        tracing::info!(%instrument, %topic, "Subscribed to Bybit ticker stream");

        Ok(BybitConnection {
            ws,
            instrument: instrument.clone(),
            ping_interval: self.config.ping_interval,
            last_ping: Instant::now(),
        })
    }
}

/// A live Bybit ticker subscription
pub struct BybitConnection {
    ws: WsConnection,
    instrument: Instrument,
    ping_interval: Duration,
    last_ping: Instant,
}

impl BybitConnection {
    async fn send_ping(&mut self) -> Result<(), FeedError> {
        let ping = serde_json::to_string(&ControlMessage::ping())
            .map_err(|e| FeedError::ConnectionLost(e.to_string()))?;
        self.ws
            .send_text(ping)
            .await
            .map_err(|e| FeedError::ConnectionLost(e.to_string()))?;
        self.last_ping = Instant::now();
        tracing::trace!(instrument = %self.instrument, "Sent heartbeat");
        Ok(())
    }
}

#[async_trait]
impl FeedConnection for BybitConnection {
    async fn next_tick(&mut self, timeout: Duration) -> Result<PriceTick, FeedError> {
        let deadline = Instant::now() + timeout;

        loop {
            let ping_at = self.last_ping + self.ping_interval;

            tokio::select! {
                _ = sleep_until(deadline) => return Err(FeedError::Timeout),
                _ = sleep_until(ping_at) => self.send_ping().await?,
                msg = self.ws.recv() => match msg {
                    Ok(WsMessage::Text(text)) => {
                        if let Some(tick) = parse_ticker_message(&text, &self.instrument) {
                            return Ok(tick);
                        }
                        tracing::trace!(
                            preview = %text.chars().take(120).collect::<String>(),
                            "Discarding non-ticker message"
                        );
                    }
                    Ok(WsMessage::Binary(_)) => {}
                    Err(e) => return Err(FeedError::ConnectionLost(e.to_string())),
                },
            }
        }
    }

    async fn close(&mut self) {
        self.ws.close().await;
    }
}
