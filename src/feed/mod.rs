//! Price feed module
//!
//! Streams Binance mini-tickers into a [`TickerSink`], usually the
//! [`TickerStore`](crate::store::TickerStore).

mod client;
mod types;

pub use client::{FeedClient, FeedState};
pub use types::{decode_frame, MiniTicker};

use crate::store::{CoinState, ConnectionStatus, TickerStore};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors decoding feed data
#[derive(Debug, Error)]
pub enum FeedError {
    /// Frame is not valid mini-ticker JSON
    #[error("failed to decode frame: {0}")]
    Decode(#[from] serde_json::Error),
    /// A numeric field did not parse to a finite number
    #[error("invalid number in field {field:?}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

/// The two entry points the feed client writes through
pub trait TickerSink: Send + Sync + 'static {
    /// Apply a candidate state for one symbol
    fn update_coin(&self, coin: CoinState);
    /// Publish the current connection status
    fn set_connection_status(&self, status: ConnectionStatus);
}

impl TickerSink for TickerStore {
    fn update_coin(&self, coin: CoinState) {
        TickerStore::update_coin(self, coin);
    }

    fn set_connection_status(&self, status: ConnectionStatus) {
        TickerStore::set_connection_status(self, status);
    }
}

/// Feed output as a message, for channel-based consumers
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Coin(CoinState),
    Status(ConnectionStatus),
}

impl TickerSink for mpsc::UnboundedSender<FeedEvent> {
    fn update_coin(&self, coin: CoinState) {
        if self.send(FeedEvent::Coin(coin)).is_err() {
            tracing::trace!("Feed event receiver dropped");
        }
    }

    fn set_connection_status(&self, status: ConnectionStatus) {
        if self.send(FeedEvent::Status(status)).is_err() {
            tracing::trace!("Feed event receiver dropped");
        }
    }
}
