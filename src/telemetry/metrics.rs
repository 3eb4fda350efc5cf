//! Prometheus metrics

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Text frames received from the feed
    FramesReceived,
    /// Frames dropped because they did not decode
    DecodeFailures,
    /// Ticker records applied to the store
    TickersApplied,
    /// Automatic reconnects scheduled
    ReconnectAttempts,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Symbols currently held by the store
    TrackedSymbols,
}

fn counter_name(metric: CounterMetric) -> &'static str {
    match metric {
        CounterMetric::FramesReceived => "tickerfeed_frames_received_total",
        CounterMetric::DecodeFailures => "tickerfeed_decode_failures_total",
        CounterMetric::TickersApplied => "tickerfeed_tickers_applied_total",
        CounterMetric::ReconnectAttempts => "tickerfeed_reconnect_attempts_total",
    }
}

fn gauge_name(metric: GaugeMetric) -> &'static str {
    match metric {
        GaugeMetric::TrackedSymbols => "tickerfeed_tracked_symbols",
    }
}

/// Increment a counter by `n`
pub fn increment(metric: CounterMetric, n: u64) {
    ::metrics::counter!(counter_name(metric)).increment(n);
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    ::metrics::gauge!(gauge_name(metric)).set(value);
}

/// Serve metrics over HTTP on `port`
///
/// Must be called from within a tokio runtime.
pub fn install_prometheus(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}
