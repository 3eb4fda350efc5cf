//! Mini-ticker wire types and frame decoding

use super::FeedError;
use serde::{Deserialize, Serialize};

/// One record of the `!miniTicker@arr` stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniTicker {
    /// Event type ("24hrMiniTicker")
    #[serde(rename = "e", default)]
    pub event_type: String,
    /// Event time (milliseconds)
    #[serde(rename = "E")]
    pub event_time: i64,
    /// Symbol
    #[serde(rename = "s")]
    pub symbol: String,
    /// Close price
    #[serde(rename = "c")]
    pub close: String,
    /// Open price
    #[serde(rename = "o")]
    pub open: String,
    /// High price
    #[serde(rename = "h")]
    pub high: String,
    /// Low price
    #[serde(rename = "l")]
    pub low: String,
    /// Total traded base asset volume
    #[serde(rename = "v")]
    pub volume: String,
    /// Total traded quote asset volume
    #[serde(rename = "q", default)]
    pub quote_volume: String,
}

impl MiniTicker {
    /// True if the symbol is quoted in `suffix` (e.g. "USDT")
    pub fn is_quoted_in(&self, suffix: &str) -> bool {
        self.symbol.ends_with(suffix)
    }
}

/// The array stream sends a list, single-symbol streams send one object
#[derive(Deserialize)]
#[serde(untagged)]
enum Frame {
    Batch(Vec<MiniTicker>),
    Single(MiniTicker),
}

/// Decode one text frame into its ticker records
pub fn decode_frame(text: &str) -> Result<Vec<MiniTicker>, FeedError> {
    let frame: Frame = serde_json::from_str(text)?;
    Ok(match frame {
        Frame::Batch(tickers) => tickers,
        Frame::Single(ticker) => vec![ticker],
    })
}
