// SPDX-FileCopyrightText: 2026 Aware Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! WebSocket implementation of the PushChannel trait.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, warn};

use aware_config::model::ChannelConfig;
use aware_core::types::PushCallback;
use aware_core::{Adapter, AdapterType, AwareError, HealthStatus, PushChannel};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Wire frame in both directions.
#[derive(Debug, Serialize, Deserialize)]
struct Frame {
    message: String,
}

/// Shared state between the channel handle and its reader task.
struct Shared {
    callback: RwLock<Option<PushCallback>>,
    open: AtomicBool,
}

impl Shared {
    fn dispatch(&self, text: &str) {
        let frame: Frame = match serde_json::from_str(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("invalid push frame: {e}");
                return;
            }
        };
        let callback = match self.callback.read() {
            Ok(guard) => guard.clone(),
            Err(_) => None,
        };
        match callback {
            Some(callback) => callback(frame.message),
            None => warn!("push frame arrived with no handler installed, dropping"),
        }
    }
}

/// WebSocket-backed push channel.
///
/// Holds one connection for its whole lifetime. When the peer closes or
/// the transport fails, the channel flips to closed and every subsequent
/// [`PushChannel::send`] is a logged no-op.
pub struct WebSocketChannel {
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<WsSink>,
    reader: tokio::task::JoinHandle<()>,
}

impl WebSocketChannel {
    /// Connects to the configured push socket and spawns the reader task.
    pub async fn connect(config: &ChannelConfig) -> Result<Self, AwareError> {
        let (socket, _response) =
            connect_async(&config.url)
                .await
                .map_err(|e| AwareError::Channel {
                    message: format!("failed to connect to {}", config.url),
                    source: Some(Box::new(e)),
                })?;
        debug!(url = %config.url, "push channel connected");

        let (writer, mut reader) = socket.split();
        let shared = Arc::new(Shared {
            callback: RwLock::new(None),
            open: AtomicBool::new(true),
        });

        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            while let Some(result) = reader.next().await {
                match result {
                    Ok(Message::Text(text)) => reader_shared.dispatch(text.as_str()),
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!("push channel read failed: {e}");
                        break;
                    }
                }
            }
            reader_shared.open.store(false, Ordering::SeqCst);
            debug!("push channel reader finished");
        });

        Ok(Self {
            shared,
            writer: tokio::sync::Mutex::new(writer),
            reader,
        })
    }
}

impl Drop for WebSocketChannel {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

#[async_trait]
impl Adapter for WebSocketChannel {
    fn name(&self) -> &str {
        "ws"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, AwareError> {
        if self.is_open() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Unhealthy("connection closed".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), AwareError> {
        self.close().await
    }
}

#[async_trait]
impl PushChannel for WebSocketChannel {
    fn set_callback(&self, callback: PushCallback) {
        if let Ok(mut guard) = self.shared.callback.write() {
            *guard = Some(callback);
        }
    }

    async fn send(&self, payload: &str) {
        if !self.is_open() {
            error!("send on closed push channel, dropping payload");
            return;
        }
        let frame = Frame {
            message: payload.to_string(),
        };
        let text = match serde_json::to_string(&frame) {
            Ok(text) => text,
            Err(e) => {
                error!("failed to encode push frame: {e}");
                return;
            }
        };
        let mut writer = self.writer.lock().await;
        if let Err(e) = writer.send(Message::Text(text.into())).await {
            error!("push channel send failed: {e}");
            self.shared.open.store(false, Ordering::SeqCst);
        }
    }

    fn is_open(&self) -> bool {
        self.shared.open.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<(), AwareError> {
        if !self.shared.open.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        let mut writer = self.writer.lock().await;
        writer
            .send(Message::Close(None))
            .await
            .map_err(|e| AwareError::Channel {
                message: "failed to close push channel".into(),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;
    use tokio_tungstenite::accept_async;

    /// One-connection test server. Sends each of `outbound` as a text
    /// frame, then forwards every received text frame to the returned
    /// receiver.
    async fn spawn_server(
        outbound: Vec<String>,
    ) -> (String, mpsc::UnboundedReceiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            for frame in outbound {
                socket.send(Message::Text(frame.into())).await.unwrap();
            }
            while let Some(Ok(msg)) = socket.next().await {
                match msg {
                    Message::Text(text) => {
                        let _ = tx.send(text.as_str().to_string());
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        });

        (url, rx)
    }

    fn config(url: String) -> ChannelConfig {
        ChannelConfig { enabled: true, url }
    }

    async fn wait_for<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out")
            .expect("channel closed")
    }

    #[tokio::test]
    async fn inbound_frames_reach_the_handler() {
        let (url, _rx) = spawn_server(vec![r#"{"message":"ping"}"#.to_string()]).await;
        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();

        let (tx, mut received) = mpsc::unbounded_channel();
        channel.set_callback(Arc::new(move |message| {
            let _ = tx.send(message);
        }));

        assert_eq!(wait_for(&mut received).await, "ping");
        assert!(channel.is_open());
    }

    #[tokio::test]
    async fn malformed_frames_are_skipped() {
        let (url, _rx) = spawn_server(vec![
            "not json".to_string(),
            r#"{"wrong":"shape"}"#.to_string(),
            r#"{"message":"good"}"#.to_string(),
        ])
        .await;
        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();

        let (tx, mut received) = mpsc::unbounded_channel();
        channel.set_callback(Arc::new(move |message| {
            let _ = tx.send(message);
        }));

        assert_eq!(wait_for(&mut received).await, "good");
    }

    #[tokio::test]
    async fn replacing_the_handler_routes_to_the_new_one() {
        let (url, _rx) = spawn_server(Vec::new()).await;
        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();

        let (old_tx, mut old_rx) = mpsc::unbounded_channel();
        channel.set_callback(Arc::new(move |message| {
            let _ = old_tx.send(message);
        }));
        let (new_tx, mut new_rx) = mpsc::unbounded_channel();
        channel.set_callback(Arc::new(move |message| {
            let _ = new_tx.send(message);
        }));

        channel.shared.dispatch(r#"{"message":"routed"}"#);
        assert_eq!(wait_for(&mut new_rx).await, "routed");
        assert!(old_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn send_wraps_payload_in_a_frame() {
        let (url, mut server_rx) = spawn_server(Vec::new()).await;
        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();

        channel.send("hello").await;
        let raw = wait_for(&mut server_rx).await;
        let frame: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(frame["message"], "hello");
    }

    #[tokio::test]
    async fn send_after_close_is_a_noop() {
        let (url, mut server_rx) = spawn_server(Vec::new()).await;
        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();

        channel.close().await.unwrap();
        assert!(!channel.is_open());

        // Does not panic, does not reach the server.
        channel.send("dropped").await;
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(server_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn close_twice_is_ok() {
        let (url, _rx) = spawn_server(Vec::new()).await;
        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();
        channel.close().await.unwrap();
        channel.close().await.unwrap();
    }

    #[tokio::test]
    async fn connect_failure_maps_to_channel_error() {
        let result = WebSocketChannel::connect(&config("ws://127.0.0.1:1".into())).await;
        assert!(matches!(result, Err(AwareError::Channel { .. })));
    }

    #[tokio::test]
    async fn peer_close_flips_the_channel_closed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("ws://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            let _ = socket.close(None).await;
        });

        let channel = WebSocketChannel::connect(&config(url)).await.unwrap();
        for _ in 0..50 {
            if !channel.is_open() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(!channel.is_open());
    }
}
