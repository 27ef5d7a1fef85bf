//! End-to-end: Bybit connector against a local WebSocket server

use crate::support::RecordingDispatcher;
use futures_util::{SinkExt, StreamExt};
use price_alert::feed::{fetch_last_price, BybitConnector, FeedConfig, FeedError, Instrument};
use price_alert::monitor::{AlertTarget, Direction, Monitor, MonitorConfig, SessionOutcome};
use price_alert::shutdown;
use rust_decimal_macros::dec;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

fn ticker(symbol: &str, price: &str) -> Message {
    Message::Text(format!(
        r#"{{"topic":"tickers.{}","type":"snapshot","data":{{"symbol":"{}","lastPrice":"{}"}},"ts":1704067200000}}"#,
        symbol, symbol, price
    ))
}

fn fast_monitor_config() -> MonitorConfig {
    MonitorConfig {
        tick_timeout: Duration::from_millis(200),
        connect_retry_delay: Duration::from_millis(50),
        reconnect_delay: Duration::from_millis(50),
    }
}

async fn local_feed() -> (TcpListener, BybitConnector) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let connector = BybitConnector::new(FeedConfig {
        ws_url: format!("ws://{}", listener.local_addr().unwrap()),
        ..Default::default()
    });
    (listener, connector)
}

#[tokio::test]
async fn test_monitor_alerts_over_websocket() {
    let (listener, connector) = local_feed().await;

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let _subscribe = ws.next().await;

        let messages = [
            Message::Text(r#"{"success":true,"ret_msg":"","op":"subscribe"}"#.to_string()),
            ticker("BTCUSDT", "50100"),
            ticker("ETHUSDT", "100"),
            ticker("BTCUSDT", "50050"),
            ticker("BTCUSDT", "49999"),
        ];
        for msg in messages {
            ws.send(msg).await.unwrap();
        }
        while ws.next().await.is_some() {}
    });

    let dispatcher = RecordingDispatcher::ok();
    let monitor = Monitor::new(connector, dispatcher.clone(), fast_monitor_config());
    let (_tx, mut rx) = shutdown::channel();

    let target = AlertTarget::new(Instrument::new("BTCUSDT"), dec!(50000), Direction::Below);
    let outcome = tokio::time::timeout(Duration::from_secs(10), monitor.run(target, &mut rx))
        .await
        .expect("monitor finished");

    assert_eq!(
        outcome.trigger_tick().map(|t| t.last_price),
        Some(dec!(49999))
    );
    assert_eq!(dispatcher.messages().len(), 1);
}

#[tokio::test]
async fn test_monitor_survives_dropped_connection() {
    let (listener, connector) = local_feed().await;

    tokio::spawn(async move {
        // First connection: one tick above target, then a hard drop
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let _subscribe = ws.next().await;
        ws.send(ticker("BTCUSDT", "50100")).await.unwrap();
        drop(ws);

        // Second connection delivers the crossing tick
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let sub = ws.next().await.unwrap().unwrap();
        assert_eq!(
            sub,
            Message::Text(r#"{"op":"subscribe","args":["tickers.BTCUSDT"]}"#.to_string())
        );
        ws.send(ticker("BTCUSDT", "50201")).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let dispatcher = RecordingDispatcher::ok();
    let monitor = Monitor::new(connector, dispatcher.clone(), fast_monitor_config());
    let (_tx, mut rx) = shutdown::channel();

    let target = AlertTarget::new(Instrument::new("BTCUSDT"), dec!(50200), Direction::Above);
    let outcome = tokio::time::timeout(Duration::from_secs(10), monitor.run(target, &mut rx))
        .await
        .expect("monitor finished");

    assert!(matches!(outcome, SessionOutcome::Alerted(ref t) if t.last_price == dec!(50201)));
    assert_eq!(dispatcher.messages().len(), 1);
    assert!(dispatcher.messages()[0].contains("$50,200.000000"));
}

#[tokio::test]
async fn test_fetch_last_price() {
    let (listener, connector) = local_feed().await;

    tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        let _subscribe = ws.next().await;
        ws.send(ticker("SOLUSDT", "101.25")).await.unwrap();
        while ws.next().await.is_some() {}
    });

    let tick = fetch_last_price(&connector, &Instrument::new("SOLUSDT"), Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(tick.last_price, dec!(101.25));
    assert!(tick.exchange_ts.is_some());
}

#[tokio::test]
async fn test_fetch_last_price_without_server() {
    let (listener, connector) = local_feed().await;
    drop(listener);

    let result =
        fetch_last_price(&connector, &Instrument::new("SOLUSDT"), Duration::from_secs(1)).await;
    assert!(matches!(result, Err(FeedError::Connect(_))));
}
