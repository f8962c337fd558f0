//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow)
//! Signal Line = EMA(signal) of MACD Line
//!
//! Default parameters: fast=12, slow=26, signal=9
//! Warmup: the line inherits the EMA warmup (slot 0); the signal line seeds
//! on the first defined line value and is unavailable through slot 1.

use crate::domain::indicator::ema::ema_values;
use crate::domain::indicator::{calculate_ema, IndicatorSeries, IndicatorType};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: IndicatorSeries,
    pub signal: IndicatorSeries,
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Vec<Option<f64>> = ema_fast
        .values
        .iter()
        .zip(&ema_slow.values)
        .map(|(f, s)| Some((*f)? - (*s)?))
        .collect();
    let signal = ema_values(&line, signal_period);

    MacdSeries {
        line: IndicatorSeries {
            indicator_type: IndicatorType::Macd { fast, slow },
            values: line,
        },
        signal: IndicatorSeries {
            indicator_type: IndicatorType::MacdSignal {
                fast,
                slow,
                signal: signal_period,
            },
            values: signal,
        },
    }
}

pub fn calculate_macd_default(closes: &[f64]) -> MacdSeries {
    calculate_macd(closes, DEFAULT_FAST, DEFAULT_SLOW, DEFAULT_SIGNAL)
}
