//! Display formatting for prices, changes and volumes

/// Price with precision scaled to its magnitude
pub fn format_price(price: f64) -> String {
    if price < 0.01 {
        format!("{price:.6}")
    } else if price < 1.0 {
        format!("{price:.4}")
    } else {
        format!("{price:.2}")
    }
}

/// Signed percentage, e.g. "+3.06%"
pub fn format_percent(percent: f64) -> String {
    let sign = if percent >= 0.0 { "+" } else { "" };
    format!("{sign}{percent:.2}%")
}

/// Compact volume, e.g. "1.23M"
pub fn format_volume(volume: f64) -> String {
    if volume > 1e9 {
        format!("{:.2}B", volume / 1e9)
    } else if volume > 1e6 {
        format!("{:.2}M", volume / 1e6)
    } else if volume > 1e3 {
        format!("{:.2}K", volume / 1e3)
    } else {
        format!("{volume:.2}")
    }
}
