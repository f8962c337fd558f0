//! Ticker symbol normalization.

/// Trim and upper-case `ticker`, appending `suffix` (e.g. `.NS`) unless the
/// symbol already ends with it.
pub fn normalize_ticker(ticker: &str, suffix: Option<&str>) -> String {
    let symbol = ticker.trim().to_uppercase();
    match suffix {
        Some(suffix) if !suffix.is_empty() => {
            let suffix = suffix.to_uppercase();
            if symbol.ends_with(&suffix) {
                symbol
            } else {
                format!("{}{}", symbol, suffix)
            }
        }
        _ => symbol,
    }
}
