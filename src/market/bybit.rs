//! Bybit instruments-info client for symbol validation

use super::InstrumentValidator;
use crate::feed::Instrument;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// Bybit REST base URL
pub const BYBIT_REST_URL: &str = "https://api.bybit.com";

/// Configuration for the instruments client
#[derive(Debug, Clone)]
pub struct InstrumentsConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Product category to look the symbol up in
    pub category: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for InstrumentsConfig {
    fn default() -> Self {
        Self {
            base_url: BYBIT_REST_URL.to_string(),
            category: "linear".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InstrumentsResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg", default)]
    ret_msg: String,
    result: Option<InstrumentsResult>,
}

#[derive(Debug, Deserialize)]
struct InstrumentsResult {
    #[serde(default)]
    list: Vec<InstrumentInfo>,
}

#[derive(Debug, Deserialize)]
struct InstrumentInfo {
    symbol: String,
}

/// Client for Bybit's `/v5/market/instruments-info`
pub struct BybitInstruments {
    config: InstrumentsConfig,
    client: Client,
}

impl BybitInstruments {
    /// Create a new client with the given configuration
    pub fn new(config: InstrumentsConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Look the symbol up. Errors mean the answer is unknown.
    pub async fn lookup(&self, instrument: &Instrument) -> anyhow::Result<bool> {
        let url = format!(
            "{}/v5/market/instruments-info",
            self.config.base_url.trim_end_matches('/')
        );

        tracing::debug!(url = %url, %instrument, "Looking up instrument");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("category", self.config.category.as_str()),
                ("symbol", instrument.symbol()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Bybit API error: {} - {}", status, body);
        }

        let body: InstrumentsResponse = response.json().await?;
        contains_symbol(body, instrument)
    }
}

fn contains_symbol(body: InstrumentsResponse, instrument: &Instrument) -> anyhow::Result<bool> {
    if body.ret_code != 0 {
        anyhow::bail!("Bybit API error {}: {}", body.ret_code, body.ret_msg);
    }

    Ok(body
        .result
        .map(|r| r.list.iter().any(|i| i.symbol == instrument.symbol()))
        .unwrap_or(false))
}

#[async_trait]
impl InstrumentValidator for BybitInstruments {
    async fn exists(&self, instrument: &Instrument) -> bool {
        match self.lookup(instrument).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(error = %e, %instrument, "Instrument lookup failed");
                false
            }
        }
    }
}
