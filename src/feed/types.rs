//! Price feed types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tradable symbol such as `BTCUSDT`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instrument(String);

impl Instrument {
    /// Wrap a full symbol, normalising case and whitespace
    pub fn new(symbol: impl AsRef<str>) -> Self {
        Self(symbol.as_ref().trim().to_uppercase())
    }

    /// Build a symbol from operator input like `btc`, appending the quote
    /// asset unless it is already there
    pub fn from_base(base: &str, quote: &str) -> Self {
        let base = base.trim().to_uppercase();
        let quote = quote.trim().to_uppercase();
        if base.ends_with(&quote) && base.len() > quote.len() {
            Self(base)
        } else {
            Self(format!("{}{}", base, quote))
        }
    }

    /// The symbol string
    pub fn symbol(&self) -> &str {
        &self.0
    }

    /// Ticker channel name on the public stream
    pub fn ticker_topic(&self) -> String {
        format!("tickers.{}", self.0)
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single price update for the subscribed instrument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceTick {
    /// Instrument the price belongs to
    pub instrument: Instrument,
    /// Last traded price
    pub last_price: Decimal,
    /// Local timestamp when the tick was received
    pub received_at: DateTime<Utc>,
    /// Exchange timestamp, when the message carried one
    pub exchange_ts: Option<DateTime<Utc>>,
}

impl PriceTick {
    /// Tick stamped with the current time
    pub fn now(instrument: Instrument, last_price: Decimal) -> Self {
        Self {
            instrument,
            last_price,
            received_at: Utc::now(),
            exchange_ts: None,
        }
    }
}
