//! Shared symbol map and connection status

use super::{CoinState, ConnectionStatus, PriceDirection};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Default)]
struct StoreState {
    coins: HashMap<String, CoinState>,
    status: ConnectionStatus,
}

#[derive(Debug)]
struct Inner {
    state: RwLock<StoreState>,
    revision: watch::Sender<u64>,
}

/// Consistent view of the store at one revision
#[derive(Debug, Clone, Default)]
pub struct StoreSnapshot {
    pub coins: HashMap<String, CoinState>,
    pub status: ConnectionStatus,
}

/// Latest state per symbol plus connection status.
///
/// Cloning is cheap and every clone sees the same data. Each mutating
/// operation is applied under one write lock, so readers never see half an
/// update.
#[derive(Debug, Clone)]
pub struct TickerStore {
    inner: Arc<Inner>,
}

impl Default for TickerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TickerStore {
    /// Create an empty, disconnected store
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(StoreState::default()),
                revision,
            }),
        }
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    /// Apply a candidate state for one symbol.
    ///
    /// The entry is replaced wholesale; only `previous_price` and
    /// `price_direction` are derived from the entry being replaced.
    pub fn update_coin(&self, mut candidate: CoinState) {
        {
            let mut state = self.inner.state.write();
            match state.coins.get(&candidate.symbol) {
                Some(existing) => {
                    candidate.previous_price = existing.current_price;
                    candidate.price_direction =
                        PriceDirection::between(existing.current_price, candidate.current_price);
                }
                None => {
                    candidate.previous_price = candidate.current_price;
                    candidate.price_direction = PriceDirection::Neutral;
                }
            }
            state.coins.insert(candidate.symbol.clone(), candidate);
        }
        self.bump();
    }

    /// Overwrite the connection status
    pub fn set_connection_status(&self, status: ConnectionStatus) {
        self.inner.state.write().status = status;
        self.bump();
    }

    /// Replace the whole symbol map
    pub fn set_coins(&self, coins: HashMap<String, CoinState>) {
        self.inner.state.write().coins = coins;
        self.bump();
    }

    /// Drop every symbol and mark the store disconnected
    pub fn reset(&self) {
        {
            let mut state = self.inner.state.write();
            state.coins.clear();
            state.status = ConnectionStatus::disconnected();
        }
        self.bump();
    }

    /// Copy of the symbol map
    pub fn coins(&self) -> HashMap<String, CoinState> {
        self.inner.state.read().coins.clone()
    }

    /// State of a single symbol
    pub fn coin(&self, symbol: &str) -> Option<CoinState> {
        self.inner.state.read().coins.get(symbol).cloned()
    }

    pub fn connection_status(&self) -> ConnectionStatus {
        self.inner.state.read().status.clone()
    }

    /// Coins and status read under the same lock
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.inner.state.read();
        StoreSnapshot {
            coins: state.coins.clone(),
            status: state.status.clone(),
        }
    }

    /// Number of tracked symbols
    pub fn len(&self) -> usize {
        self.inner.state.read().coins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.state.read().coins.is_empty()
    }

    /// Coins whose symbol contains `query` (case-insensitive), highest
    /// volume first. An empty query matches everything.
    pub fn coin_list(&self, query: &str) -> Vec<CoinState> {
        let needle = query.to_lowercase();
        let mut list: Vec<CoinState> = self
            .inner
            .state
            .read()
            .coins
            .values()
            .filter(|c| needle.is_empty() || c.symbol.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.volume_value().total_cmp(&a.volume_value()));
        list
    }

    /// Watch the store revision; it changes after every mutation
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Current revision
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }
}
