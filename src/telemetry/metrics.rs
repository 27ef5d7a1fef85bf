//! Prometheus metrics

use crate::feed::PriceTick;
use metrics_exporter_prometheus::PrometheusBuilder;
use rust_decimal::prelude::ToPrimitive;
use std::net::{Ipv4Addr, SocketAddr};

/// Feed lifecycle events worth counting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedEvent {
    /// `open` was called
    ConnectAttempt,
    /// `open` failed
    ConnectFailure,
    /// A read window passed without a tick
    Timeout,
    /// The stream broke mid-session
    ConnectionLost,
}

impl FeedEvent {
    fn label(self) -> &'static str {
        match self {
            FeedEvent::ConnectAttempt => "connect_attempt",
            FeedEvent::ConnectFailure => "connect_failure",
            FeedEvent::Timeout => "timeout",
            FeedEvent::ConnectionLost => "connection_lost",
        }
    }
}

/// Count a feed lifecycle event
pub fn record_feed_event(event: FeedEvent) {
    metrics::counter!("price_alert_feed_events_total", "event" => event.label()).increment(1);
}

/// Count an accepted tick and publish its price
pub fn record_tick(tick: &PriceTick) {
    let symbol = tick.instrument.symbol().to_string();
    metrics::counter!("price_alert_ticks_total", "instrument" => symbol.clone()).increment(1);
    if let Some(price) = tick.last_price.to_f64() {
        metrics::gauge!("price_alert_last_price", "instrument" => symbol).set(price);
    }
}

/// Count a dispatch attempt by result
pub fn record_dispatch(success: bool) {
    let result = if success { "sent" } else { "failed" };
    metrics::counter!("price_alert_alerts_total", "result" => result).increment(1);
}

/// Install the Prometheus recorder with an HTTP scrape endpoint on `port`
pub fn start_metrics_server(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}
