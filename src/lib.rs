//! price-alert: one-shot price threshold alerts for Bybit instruments
//!
//! This library provides the core components for:
//! - Subscription-scoped ticker feeds over the Bybit public WebSocket
//! - Threshold crossing evaluation (above / below a target)
//! - A resilient monitor loop that reconnects until the target is crossed
//! - Alert delivery through the Telegram Bot API
//! - Instrument validation against the Bybit REST API
//! - Structured logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod market;
pub mod monitor;
pub mod notify;
pub mod shutdown;
pub mod telemetry;
pub mod ws;
