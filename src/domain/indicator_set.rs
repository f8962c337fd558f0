//! Indicator engine: the full per-bar indicator frame for a price series and
//! the latest-bar snapshot reported to callers.

use serde::Serialize;

use crate::domain::indicator::macd::calculate_macd_default;
use crate::domain::indicator::{calculate_ema, calculate_rsi, calculate_sma, IndicatorSeries};
use crate::domain::ohlcv::PriceSeries;

pub const SMA_FAST_PERIOD: usize = 50;
pub const SMA_SLOW_PERIOD: usize = 200;
pub const EMA_SPAN: usize = 20;
pub const RSI_PERIOD: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl Trend {
    /// Bullish iff MACD is strictly above its signal line.
    pub fn from_macd(macd: f64, signal: f64) -> Self {
        if macd > signal {
            Trend::Bullish
        } else {
            Trend::Bearish
        }
    }
}

/// Every pipeline indicator as a full series, one slot per bar.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    pub sma_50: IndicatorSeries,
    pub sma_200: IndicatorSeries,
    pub ema_20: IndicatorSeries,
    pub rsi_14: IndicatorSeries,
    pub macd: IndicatorSeries,
    pub macd_signal: IndicatorSeries,
}

impl IndicatorFrame {
    pub fn compute(series: &PriceSeries) -> Self {
        Self::from_closes(&series.closes())
    }

    pub fn from_closes(closes: &[f64]) -> Self {
        let macd = calculate_macd_default(closes);
        Self {
            sma_50: calculate_sma(closes, SMA_FAST_PERIOD),
            sma_200: calculate_sma(closes, SMA_SLOW_PERIOD),
            ema_20: calculate_ema(closes, EMA_SPAN),
            rsi_14: calculate_rsi(closes, RSI_PERIOD),
            macd: macd.line,
            macd_signal: macd.signal,
        }
    }

    fn len(&self) -> usize {
        self.sma_50.values.len()
    }
}

/// Indicator values at a single bar. `None` marks an indicator that is
/// still inside its warm-up window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorSet {
    #[serde(rename = "SMA_50")]
    pub sma_50: Option<f64>,
    #[serde(rename = "SMA_200")]
    pub sma_200: Option<f64>,
    #[serde(rename = "EMA_20")]
    pub ema_20: Option<f64>,
    #[serde(rename = "RSI")]
    pub rsi_14: Option<f64>,
    #[serde(rename = "MACD")]
    pub macd: Option<f64>,
    #[serde(rename = "MACD_SIGNAL")]
    pub macd_signal: Option<f64>,
    pub trend: Option<Trend>,
}

impl IndicatorSet {
    pub fn at(frame: &IndicatorFrame, idx: usize) -> Self {
        let macd = frame.macd.at(idx);
        let macd_signal = frame.macd_signal.at(idx);
        Self {
            sma_50: frame.sma_50.at(idx),
            sma_200: frame.sma_200.at(idx),
            ema_20: frame.ema_20.at(idx),
            rsi_14: frame.rsi_14.at(idx),
            macd,
            macd_signal,
            trend: macd.zip(macd_signal).map(|(m, s)| Trend::from_macd(m, s)),
        }
    }

    pub fn latest(frame: &IndicatorFrame) -> Self {
        Self::at(frame, frame.len().saturating_sub(1))
    }

    pub fn is_complete(&self) -> bool {
        self.sma_50.is_some()
            && self.sma_200.is_some()
            && self.ema_20.is_some()
            && self.rsi_14.is_some()
            && self.macd.is_some()
            && self.macd_signal.is_some()
    }
}

/// Indicators at the most recent bar of `series`.
pub fn compute_indicator_set(series: &PriceSeries) -> IndicatorSet {
    IndicatorSet::latest(&IndicatorFrame::compute(series))
}
