//! Single WebSocket connection with ping/pong handling

use super::types::{WsConfig, WsError, WsMessage};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One live WebSocket connection.
///
/// Reconnection is the caller's business: once `recv` or `send_text` fails the
/// connection should be closed and a new one opened.
pub struct WsConnection {
    url: String,
    stream: Option<WsStream>,
}

impl WsConnection {
    /// Open a connection, bounded by `config.connect_timeout`
    pub async fn connect(config: &WsConfig) -> Result<Self, WsError> {
        tracing::debug!(url = %config.url, "Connecting to WebSocket");

        let (stream, _response) =
            tokio::time::timeout(config.connect_timeout, connect_async(config.url.as_str()))
                .await
                .map_err(|_| WsError::Timeout)?
                .map_err(|e| WsError::ConnectionFailed(e.to_string()))?;

        tracing::debug!(url = %config.url, "WebSocket connected");

        Ok(Self {
            url: config.url.clone(),
            stream: Some(stream),
        })
    }

    /// Send a text frame
    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<(), WsError> {
        let stream = self.stream.as_mut().ok_or(WsError::Closed)?;
        stream
            .send(Message::Text(text.into()))
            .await
            .map_err(|e| WsError::SendFailed(e.to_string()))
    }

    /// Wait for the next data frame.
    ///
    /// Control frames are skipped; tungstenite queues the pong for each ping
    /// and flushes it on the next read. Cancel safe: dropping the future before it
    /// resolves loses no frame.
    pub async fn recv(&mut self) -> Result<WsMessage, WsError> {
        let stream = self.stream.as_mut().ok_or(WsError::Closed)?;

        loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Ok(WsMessage::Text(text)),
                Some(Ok(Message::Binary(data))) => return Ok(WsMessage::Binary(data)),
                Some(Ok(Message::Close(_))) => {
                    tracing::debug!(url = %self.url, "Received close frame");
                    return Err(WsError::Closed);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(WsError::ConnectionFailed(e.to_string())),
                None => {
                    return Err(WsError::ConnectionFailed(
                        "Stream ended unexpectedly".into(),
                    ))
                }
            }
        }
    }

    /// Close the connection. Idempotent, and errors from a dead peer are ignored.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.close(None).await {
                tracing::trace!(error = %e, "Ignoring error while closing WebSocket");
            }
        }
    }
}
