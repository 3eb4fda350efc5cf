//! Configuration types for ticker-feed

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Binance combined mini-ticker stream for all symbols
pub const DEFAULT_FEED_URL: &str = "wss://stream.binance.com:9443/ws/!miniTicker@arr";

/// Environment variable overriding `feed.url`
pub const ENV_WS_URL: &str = "TICKER_WS_URL";
/// Environment variable overriding `feed.reconnect_interval_ms`
pub const ENV_RECONNECT_INTERVAL: &str = "TICKER_RECONNECT_INTERVAL_MS";
/// Environment variable overriding `feed.max_reconnect_attempts`
pub const ENV_MAX_RECONNECT_ATTEMPTS: &str = "TICKER_MAX_RECONNECT_ATTEMPTS";
/// Environment variable overriding `telemetry.log_level`
pub const ENV_LOG_LEVEL: &str = "TICKER_LOG_LEVEL";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {var}: {value:?}")]
    Env { var: &'static str, value: String },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Price feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Stream endpoint
    #[serde(default = "default_url")]
    pub url: String,

    /// Fixed delay before each automatic reconnect (milliseconds)
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,

    /// Automatic reconnects before giving up
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,

    /// Delay between a manual reconnect's disconnect and connect (milliseconds)
    #[serde(default = "default_reconnect_settle_ms")]
    pub reconnect_settle_ms: u64,

    /// Only symbols ending with this quote asset are kept
    #[serde(default = "default_quote_suffix")]
    pub quote_suffix: String,

    /// Keepalive ping interval (seconds)
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_url() -> String {
    DEFAULT_FEED_URL.to_string()
}
fn default_reconnect_interval_ms() -> u64 {
    5000
}
fn default_max_reconnect_attempts() -> u32 {
    5
}
fn default_reconnect_settle_ms() -> u64 {
    1000
}
fn default_quote_suffix() -> String {
    "USDT".to_string()
}
fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            reconnect_interval_ms: default_reconnect_interval_ms(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
            reconnect_settle_ms: default_reconnect_settle_ms(),
            quote_suffix: default_quote_suffix(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl FeedConfig {
    pub fn reconnect_interval(&self) -> Duration {
        Duration::from_millis(self.reconnect_interval_ms)
    }

    pub fn reconnect_settle(&self) -> Duration {
        Duration::from_millis(self.reconnect_settle_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Serve Prometheus metrics on this port when set
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env { var, value })
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `TICKER_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply overrides from any variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_WS_URL) {
            self.feed.url = url;
        }
        if let Some(v) = lookup(ENV_RECONNECT_INTERVAL) {
            self.feed.reconnect_interval_ms = parse_env(ENV_RECONNECT_INTERVAL, v)?;
        }
        if let Some(v) = lookup(ENV_MAX_RECONNECT_ATTEMPTS) {
            self.feed.max_reconnect_attempts = parse_env(ENV_MAX_RECONNECT_ATTEMPTS, v)?;
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.telemetry.log_level = level;
        }
        Ok(())
    }

    /// Reject settings the feed cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.feed.url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("feed.url is not set".into()));
        }
        if !(url.starts_with("ws://") || url.starts_with("wss://")) {
            return Err(ConfigError::Invalid(format!(
                "feed.url must be a ws:// or wss:// URL, got {url}"
            )));
        }
        if self.feed.reconnect_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "feed.reconnect_interval_ms must be greater than zero".into(),
            ));
        }
        if self.feed.quote_suffix.is_empty() {
            return Err(ConfigError::Invalid("feed.quote_suffix is empty".into()));
        }
        Ok(())
    }

    /// Log the effective configuration at debug level
    pub fn log_summary(&self) {
        tracing::debug!(
            url = %self.feed.url,
            reconnect_interval_ms = self.feed.reconnect_interval_ms,
            max_reconnect_attempts = self.feed.max_reconnect_attempts,
            reconnect_settle_ms = self.feed.reconnect_settle_ms,
            quote_suffix = %self.feed.quote_suffix,
            log_level = %self.telemetry.log_level,
            metrics_port = ?self.telemetry.metrics_port,
            "Effective configuration"
        );
    }
}
