//! CLI interface for ticker-feed
//!
//! Provides subcommands for:
//! - `watch`: Stream mini-tickers and print the top symbols
//! - `config`: Show the effective configuration

mod watch;

pub use watch::WatchArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ticker-feed")]
#[command(about = "Live cryptocurrency prices from the Binance mini-ticker stream")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream prices and print the top symbols
    Watch(WatchArgs),
    /// Show the effective configuration
    Config,
}
