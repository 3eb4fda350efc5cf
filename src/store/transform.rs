//! Raw ticker to candidate coin state

use super::{CoinState, PriceDirection};
use crate::feed::{FeedError, MiniTicker};
use std::collections::HashMap;

fn parse_price(field: &'static str, value: &str) -> Result<f64, FeedError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| FeedError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Build a candidate [`CoinState`] from one ticker record.
///
/// `previous_price` and `price_direction` are placeholders; the store fills
/// them in when the candidate is applied.
pub fn transform_ticker(ticker: &MiniTicker) -> Result<CoinState, FeedError> {
    let current_price = parse_price("c", &ticker.close)?;
    let open_price = parse_price("o", &ticker.open)?;
    let price_change = current_price - open_price;
    let price_change_percent = if open_price > 0.0 {
        price_change / open_price * 100.0
    } else {
        0.0
    };

    Ok(CoinState {
        symbol: ticker.symbol.clone(),
        current_price,
        previous_price: current_price,
        open_price,
        high_price: parse_price("h", &ticker.high)?,
        low_price: parse_price("l", &ticker.low)?,
        volume: ticker.volume.clone(),
        price_change,
        price_change_percent,
        last_update: ticker.event_time,
        price_direction: PriceDirection::Neutral,
    })
}

/// Transform every record quoted in `quote_suffix`, keyed by symbol.
///
/// Records that fail to parse are skipped. Later records for the same
/// symbol win.
pub fn transform_batch(tickers: &[MiniTicker], quote_suffix: &str) -> HashMap<String, CoinState> {
    tickers
        .iter()
        .filter(|t| t.is_quoted_in(quote_suffix))
        .filter_map(|t| match transform_ticker(t) {
            Ok(coin) => Some((coin.symbol.clone(), coin)),
            Err(e) => {
                tracing::debug!(symbol = %t.symbol, error = %e, "Skipping ticker");
                None
            }
        })
        .collect()
}
