//! WebSocket transport
//!
//! A [`Transport`] opens one connection at a time and reports its lifecycle
//! as [`WsEvent`]s. Reconnection policy lives in the caller.

mod client;
mod types;

pub use client::WsTransport;
pub use types::{WsConfig, WsError, WsEvent};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// Something that can open a streaming connection
pub trait Transport: Send + Sync + 'static {
    /// Start a connection attempt to `url` and return immediately.
    ///
    /// Events for this attempt are delivered on `events`. Dropping the
    /// receiver or closing the returned handle ends the connection.
    fn open(&self, url: &str, events: mpsc::Sender<WsEvent>) -> ConnectionHandle;
}

/// Owning handle to a live or in-flight connection
#[derive(Debug)]
pub struct ConnectionHandle {
    close_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ConnectionHandle {
    /// Wrap a connection task and the signal that asks it to close
    pub fn new(close_tx: oneshot::Sender<()>, task: JoinHandle<()>) -> Self {
        Self {
            close_tx: Some(close_tx),
            task,
        }
    }

    /// Ask the connection to close gracefully
    pub fn close(mut self) {
        if let Some(tx) = self.close_tx.take() {
            // Task already finished if the receiver is gone
            let _ = tx.send(());
        }
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        // Not closed explicitly: tear the task down
        if self.close_tx.is_some() {
            self.task.abort();
        }
    }
}
