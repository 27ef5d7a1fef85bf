//! Instrument discovery
//!
//! Confirms that an operator-supplied symbol is listed before any
//! monitoring starts.

mod bybit;

pub use bybit::{BybitInstruments, InstrumentsConfig, BYBIT_REST_URL};

use crate::feed::Instrument;
use async_trait::async_trait;

/// Existence check for symbols
#[async_trait]
pub trait InstrumentValidator: Send + Sync {
    /// Whether the instrument is listed. Lookup failures report `false`.
    async fn exists(&self, instrument: &Instrument) -> bool;
}
