//! Watch command implementation

use crate::config::Config;
use crate::feed::FeedClient;
use crate::format::{format_percent, format_price, format_volume};
use crate::store::{CoinState, ConnectionStatus, PriceDirection, TickerStore};
use crate::telemetry::{self, GaugeMetric};
use crate::ws::{WsConfig, WsTransport};
use clap::Args;
use std::time::Duration;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Only show symbols containing this text
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Number of symbols to print
    #[arg(short = 'n', long, default_value = "10")]
    pub limit: usize,

    /// Seconds between refreshes
    #[arg(long, default_value = "5")]
    pub interval_secs: u64,
}

impl WatchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let store = TickerStore::new();
        let transport =
            WsTransport::new(WsConfig::default().ping_interval(config.feed.ping_interval()));
        let (client, driver) = FeedClient::spawn(config.feed.clone(), transport, store.clone());

        tracing::info!(url = %config.feed.url, "Starting ticker watch");
        client.connect();

        let mut refresh = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        let mut retry = RetrySignal::new();

        loop {
            tokio::select! {
                res = &mut shutdown => {
                    if let Err(e) = res {
                        tracing::warn!(error = %e, "Failed to listen for ctrl-c");
                    }
                    tracing::info!("Shutting down");
                    break;
                }
                _ = retry.recv() => {
                    tracing::info!("Manual reconnect requested");
                    client.reconnect();
                }
                _ = refresh.tick() => {
                    let snapshot = store.snapshot();
                    telemetry::set_gauge(GaugeMetric::TrackedSymbols, snapshot.coins.len() as f64);
                    let coins = store.coin_list(&self.filter);
                    println!("{}", render(&snapshot.status, snapshot.coins.len(), &coins, self.limit));
                }
            }
        }

        client.shutdown();
        driver.await?;
        Ok(())
    }
}

/// SIGHUP triggers a manual reconnect; never fires where unavailable
struct RetrySignal {
    #[cfg(unix)]
    hangup: Option<tokio::signal::unix::Signal>,
}

impl RetrySignal {
    fn new() -> Self {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let hangup = match signal(SignalKind::hangup()) {
                Ok(s) => Some(s),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to listen for SIGHUP");
                    None
                }
            };
            Self { hangup }
        }
        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        if let Some(hangup) = self.hangup.as_mut() {
            if hangup.recv().await.is_some() {
                return;
            }
            self.hangup = None;
        }
        std::future::pending::<()>().await
    }
}

fn status_line(status: &ConnectionStatus) -> String {
    match (status.is_connected, status.is_connecting, &status.error) {
        (true, _, _) => "connected".to_string(),
        (_, true, _) => "connecting...".to_string(),
        (_, _, Some(error)) => format!("disconnected ({error})"),
        _ => "disconnected".to_string(),
    }
}

fn arrow(direction: PriceDirection) -> char {
    match direction {
        PriceDirection::Up => '▲',
        PriceDirection::Down => '▼',
        PriceDirection::Neutral => '·',
    }
}

const RETRY_HINT: &str = "send SIGHUP to reconnect";

/// Render the status header and the top `limit` coins
fn render(status: &ConnectionStatus, tracked: usize, coins: &[CoinState], limit: usize) -> String {
    let mut out = format!("[{}] {} symbols tracked\n", status_line(status), tracked);
    if status.is_failed() {
        out.push_str(RETRY_HINT);
        out.push('\n');
    }
    for coin in coins.iter().take(limit) {
        out.push_str(&format!(
            "{:<14} {} {:>16} {:>9}  vol {:>9}\n",
            coin.symbol,
            arrow(coin.price_direction),
            format_price(coin.current_price),
            format_percent(coin.price_change_percent),
            format_volume(coin.volume_value()),
        ));
    }
    out
}
