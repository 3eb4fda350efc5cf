//! tokio-tungstenite backed transport

use super::types::{WsConfig, WsError, WsEvent};
use super::{ConnectionHandle, Transport};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// How an established stream ended without error
enum StreamEnd {
    /// Peer sent a close frame or the stream ended
    Remote,
    /// Local side asked to close, or nobody is listening anymore
    Local,
}

/// WebSocket transport with ping/pong keepalive
#[derive(Debug, Clone, Default)]
pub struct WsTransport {
    config: WsConfig,
}

impl WsTransport {
    /// Create a new transport with the given configuration
    pub fn new(config: WsConfig) -> Self {
        Self { config }
    }

    /// Drive one connection from handshake to close and report events
    async fn run_connection(
        config: WsConfig,
        url: String,
        events: mpsc::Sender<WsEvent>,
        mut close_rx: oneshot::Receiver<()>,
    ) {
        match Self::connect_and_stream(&config, &url, &events, &mut close_rx).await {
            Ok(StreamEnd::Remote) => {
                tracing::info!(url = %url, "WebSocket closed by peer");
                let _ = events.send(WsEvent::Closed).await;
            }
            Ok(StreamEnd::Local) => {
                tracing::debug!(url = %url, "WebSocket closed locally");
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "WebSocket connection error");
                let _ = events.send(WsEvent::Error(e)).await;
                let _ = events.send(WsEvent::Closed).await;
            }
        }
    }

    /// Connect to WebSocket and stream text frames until the connection ends
    async fn connect_and_stream(
        config: &WsConfig,
        url: &str,
        events: &mpsc::Sender<WsEvent>,
        close_rx: &mut oneshot::Receiver<()>,
    ) -> Result<StreamEnd, WsError> {
        tracing::info!(url = %url, "Connecting to WebSocket");

        let ws_stream = tokio::select! {
            biased;
            _ = &mut *close_rx => return Ok(StreamEnd::Local),
            res = connect_async(url) => {
                let (stream, _response) = res.map_err(|e| WsError::ConnectionFailed(e.to_string()))?;
                stream
            }
        };

        let (mut write, mut read) = ws_stream.split();

        tracing::info!(url = %url, "WebSocket connected");

        if events.send(WsEvent::Opened).await.is_err() {
            return Ok(StreamEnd::Local);
        }

        let mut ping_interval = tokio::time::interval(config.ping_interval);
        ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // First tick completes immediately
        ping_interval.tick().await;
        let mut waiting_for_pong = false;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if events.send(WsEvent::Frame(text)).await.is_err() {
                                tracing::debug!("Event receiver dropped, closing connection");
                                let _ = write.send(Message::Close(None)).await;
                                return Ok(StreamEnd::Local);
                            }
                        }
                        Some(Ok(Message::Ping(data))) => {
                            write.send(Message::Pong(data)).await
                                .map_err(|e| WsError::Stream(e.to_string()))?;
                        }
                        Some(Ok(Message::Pong(_))) => {
                            waiting_for_pong = false;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return Ok(StreamEnd::Remote);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            return Err(WsError::Stream(e.to_string()));
                        }
                        None => {
                            return Ok(StreamEnd::Remote);
                        }
                    }
                }

                _ = &mut *close_rx => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(StreamEnd::Local);
                }

                _ = ping_interval.tick() => {
                    if waiting_for_pong {
                        return Err(WsError::PongTimeout);
                    }
                    write.send(Message::Ping(vec![])).await
                        .map_err(|e| WsError::Stream(e.to_string()))?;
                    waiting_for_pong = true;
                }
            }
        }
    }
}

impl Transport for WsTransport {
    fn open(&self, url: &str, events: mpsc::Sender<WsEvent>) -> ConnectionHandle {
        let (close_tx, close_rx) = oneshot::channel();
        let config = self.config.clone();
        let url = url.to_string();

        let task = tokio::spawn(Self::run_connection(config, url, events, close_rx));

        ConnectionHandle::new(close_tx, task)
    }
}
