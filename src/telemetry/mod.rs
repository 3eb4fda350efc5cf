//! Telemetry module
//!
//! Logging and metrics

mod logging;
mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::{increment, install_prometheus, set_gauge, CounterMetric, GaugeMetric};

use crate::config::TelemetryConfig;

/// Initialize all telemetry subsystems
pub fn init_telemetry(config: &TelemetryConfig) -> anyhow::Result<()> {
    init_logging(&config.log_level, config.log_format)?;

    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    Ok(())
}
