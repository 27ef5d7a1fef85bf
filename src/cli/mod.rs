//! CLI interface for price-alert
//!
//! Provides subcommands for:
//! - `watch`: Interactive menu, one alert session after another (default)
//! - `alert`: One non-interactive alert session
//! - `config`: Show the effective configuration

mod alert;
mod input;
mod watch;

pub use alert::AlertArgs;
pub use input::{parse_target, InputError};
pub use watch::WatchArgs;

use crate::config::Config;
use crate::feed::{fetch_last_price, BybitConnector, Instrument, PriceTick};
use crate::market::{BybitInstruments, InstrumentValidator};
use crate::monitor::{Direction, Monitor, SessionOutcome};
use crate::notify::{format_usd, TelegramDispatcher};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::Write;

#[derive(Parser, Debug)]
#[command(name = "price-alert")]
#[command(about = "One-shot price threshold alerts for Bybit instruments, delivered over Telegram")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive menu (default)
    Watch(WatchArgs),
    /// Run a single alert session and exit
    Alert(AlertArgs),
    /// Show configuration
    Config,
}

/// Direction as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Above,
    Below,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Above => Direction::Above,
            DirectionArg::Below => Direction::Below,
        }
    }
}

/// Everything a command needs, built once from the configuration
pub struct AppContext {
    pub config: Config,
    pub monitor: Monitor<BybitConnector, TelegramDispatcher>,
    pub instruments: BybitInstruments,
}

impl AppContext {
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let telegram = config.telegram_config();
        if !telegram.is_configured() {
            tracing::warn!(
                "Telegram credentials are missing; alerts will fail to send. \
                 Set telegram.bot_token/chat_id or TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID"
            );
        }

        let monitor = Monitor::new(
            BybitConnector::new(config.feed_config()),
            TelegramDispatcher::new(telegram)?,
            config.monitor_config(),
        );
        let instruments = BybitInstruments::new(config.instruments_config())?;

        Ok(Self {
            config,
            monitor,
            instruments,
        })
    }

    /// Build an instrument from operator input and confirm it is listed
    pub async fn resolve_instrument(&self, base: &str) -> Option<Instrument> {
        let instrument = Instrument::from_base(base, &self.config.feed.quote_asset);
        if self.instruments.exists(&instrument).await {
            Some(instrument)
        } else {
            None
        }
    }

    /// Current price via a short-lived subscription
    pub async fn current_price(&self, instrument: &Instrument) -> anyhow::Result<PriceTick> {
        let tick = fetch_last_price(
            self.monitor.connector(),
            instrument,
            self.monitor.config().tick_timeout,
        )
        .await?;
        Ok(tick)
    }
}

/// Print the effective configuration with secrets masked
pub fn show_config(config: &Config) {
    println!("Current configuration:");
    println!(
        "  Feed: {} (quote {})",
        config.feed.ws_url, config.feed.quote_asset
    );
    println!(
        "  Monitor: timeout={}s, retry={}s, reconnect={}s",
        config.monitor.tick_timeout_secs,
        config.monitor.connect_retry_secs,
        config.monitor.reconnect_delay_secs
    );
    println!(
        "  Instruments: {} ({})",
        config.instruments.rest_url, config.instruments.category
    );
    println!(
        "  Telegram: token={}, chat_id={}",
        config.telegram.masked_token(),
        if config.telegram.chat_id.is_empty() {
            "<unset>"
        } else {
            config.telegram.chat_id.as_str()
        }
    );
    println!(
        "  Telemetry: level={}, format={:?}, metrics_port={:?}",
        config.telemetry.log_level, config.telemetry.log_format, config.telemetry.metrics_port
    );
}

fn now() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

fn print_session_header(instrument: &Instrument, target: rust_decimal::Decimal, direction: Direction) {
    println!("[{}] 🔎 Alert armed for {}", now(), instrument);
    println!(
        "[{}] Target {} {} the current price: {}",
        now(),
        direction.arrow(),
        direction,
        format_usd(target)
    );
}

/// Overwrite the status line with the latest price
fn print_price(tick: &PriceTick) {
    print!(
        "\r[{}] Current price: {}    ",
        now(),
        format_usd(tick.last_price)
    );
    let _ = std::io::stdout().flush();
}

fn report_outcome(outcome: &SessionOutcome) {
    // Finish the status line left by `print_price`
    println!();
    match outcome {
        SessionOutcome::Alerted(tick) => println!(
            "[{}] ⚠️ Alert triggered at {}",
            now(),
            format_usd(tick.last_price)
        ),
        SessionOutcome::DispatchFailed(tick) => println!(
            "[{}] ⚠️ Target crossed at {} but the alert could not be sent",
            now(),
            format_usd(tick.last_price)
        ),
        SessionOutcome::Cancelled => println!("[{}] Monitoring cancelled", now()),
    }
}
