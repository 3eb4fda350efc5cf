//! ticker-feed: live cryptocurrency prices from the Binance mini-ticker stream
//!
//! This library provides:
//! - A WebSocket transport with ping/pong keepalive
//! - A feed client with bounded, fixed-delay reconnection
//! - An in-memory ticker store with directional price tracking
//! - Logging and Prometheus metrics

pub mod cli;
pub mod config;
pub mod feed;
pub mod format;
pub mod store;
pub mod telemetry;
pub mod ws;
