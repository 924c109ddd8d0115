use async_trait::async_trait;
use futures::StreamExt;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::error::SyncError;

/// A live push connection. Yields decoded text frames until the peer closes
/// or the connection drops.
#[async_trait]
pub trait PushStream: Send {
    /// Next text frame, or `None` once the connection has closed cleanly.
    async fn next_text(&mut self) -> Option<Result<String, SyncError>>;
}

/// Factory for push connections. Injected into the client so tests can
/// substitute a fake instead of a real socket.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn open(&self, url: &str) -> Result<Box<dyn PushStream>, SyncError>;
}

/// Derives the push-channel URL from the API base address by upgrading the
/// scheme for duplex delivery; the server mounts the socket at `/ws`.
pub fn push_url(base_url: &str) -> Result<String, SyncError> {
    let ws = if base_url.starts_with("https://") {
        base_url.replacen("https://", "wss://", 1)
    } else if base_url.starts_with("http://") {
        base_url.replacen("http://", "ws://", 1)
    } else {
        return Err(SyncError::Transport(format!(
            "base url must start with http:// or https://: {base_url}"
        )));
    };
    Ok(format!("{}/ws", ws.trim_end_matches('/')))
}

/// Production transport on tokio-tungstenite.
pub struct WebSocketTransport;

struct WebSocketPushStream {
    ws: tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
}

#[async_trait]
impl PushTransport for WebSocketTransport {
    async fn open(&self, url: &str) -> Result<Box<dyn PushStream>, SyncError> {
        let (ws, _) = connect_async(url)
            .await
            .map_err(|err| SyncError::Transport(err.to_string()))?;
        Ok(Box::new(WebSocketPushStream { ws }))
    }
}

#[async_trait]
impl PushStream for WebSocketPushStream {
    async fn next_text(&mut self) -> Option<Result<String, SyncError>> {
        while let Some(msg) = self.ws.next().await {
            match msg {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Close(_)) => return None,
                // Binary/ping/pong frames carry no events.
                Ok(_) => {}
                Err(err) => return Some(Err(SyncError::Transport(err.to_string()))),
            }
        }
        None
    }
}
