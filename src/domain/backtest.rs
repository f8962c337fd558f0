//! Moving-average crossover backtest.
//!
//! The position held over bar t is decided by the signal at bar t-1, so a
//! crossover never earns the move of the bar it was observed on. Returns
//! are summed, not compounded, and are not annualized.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::PipelineError;
use crate::domain::indicator::{calculate_sma, IndicatorSeries};
use crate::domain::indicator_set::{SMA_FAST_PERIOD, SMA_SLOW_PERIOD};
use crate::domain::ohlcv::PriceSeries;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Long while SMA(50) is above SMA(200), flat otherwise.
    SmaCross,
}

impl Strategy {
    pub fn run(self, series: &PriceSeries) -> BacktestResult {
        match self {
            Strategy::SmaCross => run_sma_cross(series),
        }
    }
}

impl FromStr for Strategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sma_cross" => Ok(Strategy::SmaCross),
            _ => Err(PipelineError::UnknownStrategy {
                name: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::SmaCross => write!(f, "sma_cross"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    pub ticker: String,
    pub strategy_total_return: f64,
    pub buy_hold_return: f64,
    pub improvement_over_buy_hold: f64,
}

/// 1 where the fast SMA is strictly above the slow SMA, 0 otherwise
/// (including every bar where either is still warming up).
pub fn signals(fast: &IndicatorSeries, slow: &IndicatorSeries) -> Vec<u8> {
    fast.values
        .iter()
        .zip(&slow.values)
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) if f > s => 1,
            _ => 0,
        })
        .collect()
}

/// Close-to-close percent change. Index 0 has no prior close and is `None`,
/// as is any bar following a non-positive close.
pub fn pct_changes(closes: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(closes.len());
    if closes.is_empty() {
        return out;
    }
    out.push(None);
    out.extend(closes.windows(2).map(|w| {
        if w[0] > 0.0 {
            Some(w[1] / w[0] - 1.0)
        } else {
            None
        }
    }));
    out
}

/// Per-bar strategy returns with a one-bar signal lag:
/// `r[t] = signal[t-1] * pct_change[t]`.
pub fn strategy_returns(closes: &[f64], signals: &[u8]) -> Vec<Option<f64>> {
    let changes = pct_changes(closes);
    changes
        .iter()
        .enumerate()
        .map(|(t, change)| {
            let change = (*change)?;
            let held = signals.get(t.checked_sub(1)?).copied().unwrap_or(0);
            Some(f64::from(held) * change)
        })
        .collect()
}

fn total(returns: &[Option<f64>]) -> f64 {
    returns.iter().flatten().sum()
}

pub fn run_sma_cross(series: &PriceSeries) -> BacktestResult {
    let closes = series.closes();
    let fast = calculate_sma(&closes, SMA_FAST_PERIOD);
    let slow = calculate_sma(&closes, SMA_SLOW_PERIOD);
    let signal = signals(&fast, &slow);

    let strategy_total_return = total(&strategy_returns(&closes, &signal));
    let buy_hold_return = total(&pct_changes(&closes));

    BacktestResult {
        ticker: series.ticker().to_string(),
        strategy_total_return,
        buy_hold_return,
        improvement_over_buy_hold: strategy_total_return - buy_hold_return,
    }
}
