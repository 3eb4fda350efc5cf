//! Per-symbol ticker state and connection status

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Error shown once automatic reconnection gives up
pub const MAX_ATTEMPTS_ERROR: &str = "connection failed after max attempts";

/// Direction of the latest move relative to the previous observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    /// Price rose since the previous update
    Up,
    /// Price fell since the previous update
    Down,
    /// Unchanged, or first observation
    #[default]
    Neutral,
}

impl PriceDirection {
    /// Classify a move from `previous` to `current`
    pub fn between(previous: f64, current: f64) -> Self {
        if current > previous {
            PriceDirection::Up
        } else if current < previous {
            PriceDirection::Down
        } else {
            PriceDirection::Neutral
        }
    }
}

/// Latest known state of one traded symbol
///
/// `open_price`, `high_price` and `low_price` are the rolling 24h window
/// values from the most recent message, not extrema tracked locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinState {
    /// Trading pair, e.g. "BTCUSDT"
    pub symbol: String,
    /// Latest close price
    pub current_price: f64,
    /// `current_price` as it was before the latest update
    pub previous_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    /// Base asset volume, as received
    pub volume: String,
    /// `current_price - open_price`
    pub price_change: f64,
    /// `price_change / open_price * 100`, zero when open is zero
    pub price_change_percent: f64,
    /// Exchange event time (epoch milliseconds)
    pub last_update: i64,
    pub price_direction: PriceDirection,
}

impl CoinState {
    /// Exchange event time as a UTC timestamp
    pub fn last_update_time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.last_update).single()
    }

    /// Where the current price sits inside the low..high range, in percent
    ///
    /// Returns `None` when the range is empty.
    pub fn range_position(&self) -> Option<f64> {
        let range = self.high_price - self.low_price;
        if range <= 0.0 {
            return None;
        }
        Some((self.current_price - self.low_price) / range * 100.0)
    }

    /// Volume as a number, 0.0 when it doesn't parse
    pub fn volume_value(&self) -> f64 {
        self.volume.parse().unwrap_or(0.0)
    }
}

/// Connection state as seen by readers of the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStatus {
    pub is_connected: bool,
    pub is_connecting: bool,
    pub error: Option<String>,
}

impl ConnectionStatus {
    /// Connection attempt in flight
    pub fn connecting() -> Self {
        Self {
            is_connected: false,
            is_connecting: true,
            error: None,
        }
    }

    /// Connection established
    pub fn connected() -> Self {
        Self {
            is_connected: true,
            is_connecting: false,
            error: None,
        }
    }

    /// No connection, no error
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// No connection, with an error for the reader
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            is_connected: false,
            is_connecting: false,
            error: Some(error.into()),
        }
    }

    /// True when both flags are down and an error is set
    pub fn is_failed(&self) -> bool {
        !self.is_connected && !self.is_connecting && self.error.is_some()
    }
}
