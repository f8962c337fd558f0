//! Technical indicator implementations.
//!
//! Every indicator produces one slot per input bar. A slot is `None` while the
//! indicator is still inside its warm-up window, so callers can tell an
//! unavailable value apart from a genuine zero.

pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Ema(usize),
    Rsi(usize),
    Macd { fast: usize, slow: usize },
    MacdSignal { fast: usize, slow: usize, signal: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<Option<f64>>,
}

impl IndicatorSeries {
    pub fn at(&self, idx: usize) -> Option<f64> {
        self.values.get(idx).copied().flatten()
    }

    /// Value at the most recent bar.
    pub fn last(&self) -> Option<f64> {
        self.values.last().copied().flatten()
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow } => write!(f, "MACD({},{})", fast, slow),
            IndicatorType::MacdSignal { fast, slow, signal } => {
                write!(f, "MACD_SIGNAL({},{},{})", fast, slow, signal)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indicator_type_display_sma() {
        assert_eq!(IndicatorType::Sma(50).to_string(), "SMA(50)");
    }

    #[test]
    fn indicator_type_display_macd_signal() {
        let signal = IndicatorType::MacdSignal {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        assert_eq!(signal.to_string(), "MACD_SIGNAL(12,26,9)");
    }

    #[test]
    fn series_accessors() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Sma(2),
            values: vec![None, Some(1.5), Some(2.5)],
        };
        assert_eq!(series.at(0), None);
        assert_eq!(series.at(1), Some(1.5));
        assert_eq!(series.at(9), None);
        assert_eq!(series.last(), Some(2.5));
    }

    #[test]
    fn last_of_empty_series_is_unavailable() {
        let series = IndicatorSeries {
            indicator_type: IndicatorType::Rsi(14),
            values: vec![],
        };
        assert_eq!(series.last(), None);
    }
}
