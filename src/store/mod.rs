//! Ticker store
//!
//! In-memory latest state per symbol with directional change tracking,
//! plus the feed's connection status.

mod coin;
mod ticker_store;
mod transform;

pub use coin::{CoinState, ConnectionStatus, PriceDirection, MAX_ATTEMPTS_ERROR};
pub use ticker_store::{StoreSnapshot, TickerStore};
pub use transform::{transform_batch, transform_ticker};
