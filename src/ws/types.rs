//! WebSocket types and configuration

use std::time::Duration;
use thiserror::Error;

/// Transport-level configuration for a single connection
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// Interval for sending ping frames
    pub ping_interval: Duration,
}

impl Default for WsConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(30),
        }
    }
}

impl WsConfig {
    /// Set ping interval
    pub fn ping_interval(mut self, d: Duration) -> Self {
        self.ping_interval = d;
        self
    }
}

/// Events reported by one connection, in the order they happen.
///
/// A connection always ends with exactly one `Closed`, optionally preceded
/// by an `Error`.
#[derive(Debug, Clone)]
pub enum WsEvent {
    /// Handshake completed
    Opened,
    /// Text frame received
    Frame(String),
    /// Transport failure (establishment or mid-stream)
    Error(WsError),
    /// Connection is gone
    Closed,
}

/// WebSocket errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WsError {
    /// Handshake failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    /// Read or write failed on an established stream
    #[error("Stream error: {0}")]
    Stream(String),
    /// Peer stopped answering pings
    #[error("Pong timeout")]
    PongTimeout,
}
