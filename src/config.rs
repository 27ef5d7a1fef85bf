//! Configuration types for price-alert

use crate::feed::{FeedConfig, BYBIT_LINEAR_WS_URL};
use crate::market::{InstrumentsConfig, BYBIT_REST_URL};
use crate::monitor::MonitorConfig;
use crate::notify::{TelegramConfig, TELEGRAM_API_URL};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Environment variable overriding `telegram.bot_token`
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
/// Environment variable overriding `telegram.chat_id`
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedSettings,
    #[serde(default)]
    pub monitor: MonitorSettings,
    #[serde(default)]
    pub instruments: InstrumentSettings,
    #[serde(default)]
    pub telegram: TelegramSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Streaming endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedSettings {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,

    /// Appended to operator input such as `BTC`
    #[serde(default = "default_quote_asset")]
    pub quote_asset: String,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Application heartbeat interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_ws_url() -> String {
    BYBIT_LINEAR_WS_URL.to_string()
}
fn default_quote_asset() -> String {
    "USDT".to_string()
}
fn default_connect_timeout_secs() -> u64 {
    5
}
fn default_ping_interval_secs() -> u64 {
    20
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            quote_asset: default_quote_asset(),
            connect_timeout_secs: default_connect_timeout_secs(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

/// Monitor loop timing
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorSettings {
    /// Read window before a timeout is reported (seconds)
    #[serde(default = "default_tick_timeout_secs")]
    pub tick_timeout_secs: u64,

    /// Delay between failed connection attempts (seconds)
    #[serde(default = "default_connect_retry_secs")]
    pub connect_retry_secs: u64,

    /// Delay after a lost connection (seconds)
    #[serde(default = "default_reconnect_delay_secs")]
    pub reconnect_delay_secs: u64,
}

fn default_tick_timeout_secs() -> u64 {
    5
}
fn default_connect_retry_secs() -> u64 {
    5
}
fn default_reconnect_delay_secs() -> u64 {
    2
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            tick_timeout_secs: default_tick_timeout_secs(),
            connect_retry_secs: default_connect_retry_secs(),
            reconnect_delay_secs: default_reconnect_delay_secs(),
        }
    }
}

/// Instrument lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct InstrumentSettings {
    #[serde(default = "default_rest_url")]
    pub rest_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_rest_url() -> String {
    BYBIT_REST_URL.to_string()
}
fn default_category() -> String {
    "linear".to_string()
}
fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for InstrumentSettings {
    fn default() -> Self {
        Self {
            rest_url: default_rest_url(),
            category: default_category(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Telegram notification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelegramSettings {
    #[serde(default = "default_telegram_url")]
    pub api_url: String,
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    #[serde(default = "default_parse_mode")]
    pub parse_mode: String,
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_telegram_url() -> String {
    TELEGRAM_API_URL.to_string()
}
fn default_parse_mode() -> String {
    "Markdown".to_string()
}

impl Default for TelegramSettings {
    fn default() -> Self {
        Self {
            api_url: default_telegram_url(),
            bot_token: String::new(),
            chat_id: String::new(),
            parse_mode: default_parse_mode(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl TelegramSettings {
    /// Token with everything but the bot id hidden, for display
    pub fn masked_token(&self) -> String {
        match self.bot_token.split_once(':') {
            Some((bot_id, _)) => format!("{}:****", bot_id),
            None if self.bot_token.is_empty() => "<unset>".to_string(),
            None => "****".to_string(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would make the feed or monitor loops spin
    pub fn validate(&self) -> anyhow::Result<()> {
        let durations = [
            ("feed.connect_timeout_secs", self.feed.connect_timeout_secs),
            ("feed.ping_interval_secs", self.feed.ping_interval_secs),
            ("monitor.tick_timeout_secs", self.monitor.tick_timeout_secs),
            ("monitor.connect_retry_secs", self.monitor.connect_retry_secs),
            ("instruments.timeout_secs", self.instruments.timeout_secs),
            ("telegram.timeout_secs", self.telegram.timeout_secs),
        ];
        for (key, secs) in durations {
            if secs == 0 {
                anyhow::bail!("{} must be greater than zero", key);
            }
        }

        if self.feed.quote_asset.trim().is_empty() {
            anyhow::bail!("feed.quote_asset must not be empty");
        }
        Ok(())
    }

    /// Apply `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID` when set and non-empty
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(ENV_BOT_TOKEN).filter(|v| !v.is_empty()) {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = lookup(ENV_CHAT_ID).filter(|v| !v.is_empty()) {
            self.telegram.chat_id = chat_id;
        }
    }

    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            ws_url: self.feed.ws_url.clone(),
            connect_timeout: Duration::from_secs(self.feed.connect_timeout_secs),
            ping_interval: Duration::from_secs(self.feed.ping_interval_secs),
        }
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            tick_timeout: Duration::from_secs(self.monitor.tick_timeout_secs),
            connect_retry_delay: Duration::from_secs(self.monitor.connect_retry_secs),
            reconnect_delay: Duration::from_secs(self.monitor.reconnect_delay_secs),
        }
    }

    pub fn instruments_config(&self) -> InstrumentsConfig {
        InstrumentsConfig {
            base_url: self.instruments.rest_url.clone(),
            category: self.instruments.category.clone(),
            timeout: Duration::from_secs(self.instruments.timeout_secs),
        }
    }

    pub fn telegram_config(&self) -> TelegramConfig {
        TelegramConfig {
            api_url: self.telegram.api_url.clone(),
            bot_token: self.telegram.bot_token.clone(),
            chat_id: self.telegram.chat_id.clone(),
            parse_mode: self.telegram.parse_mode.clone(),
            timeout: Duration::from_secs(self.telegram.timeout_secs),
        }
    }
}
