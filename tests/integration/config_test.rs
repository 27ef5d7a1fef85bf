//! Configuration loading

use price_alert::config::Config;
use price_alert::monitor::MonitorConfig;
use std::time::Duration;

#[test]
fn test_config_example_loads() {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example")).unwrap();

    assert_eq!(config.feed.quote_asset, "USDT");
    assert_eq!(config.monitor_config(), MonitorConfig::default());
    assert_eq!(config.feed_config().connect_timeout, Duration::from_secs(5));
    assert!(config.telemetry.metrics_port.is_none());
}

#[test]
fn test_partial_config_fills_defaults() {
    let toml = r#"
        [telegram]
        bot_token = "1:x"
        chat_id = "2"
    "#;

    let config: Config = toml::from_str(toml).unwrap();
    assert!(config.telegram_config().is_configured());
    assert_eq!(config.instruments.category, "linear");
    assert_eq!(config.monitor.reconnect_delay_secs, 2);
}
