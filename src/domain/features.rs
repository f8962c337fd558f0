//! The model's input schema.
//!
//! `FEATURE_SCHEMA` is the single ordered list of features shared by online
//! prediction and the offline training export. The regressor artifact is
//! trained against exactly this order; reordering it invalidates every
//! artifact built before the change.

use crate::domain::error::PipelineError;
use crate::domain::indicator_set::IndicatorSet;
use crate::domain::ohlcv::{PriceBar, PriceSeries};

pub const FEATURE_COUNT: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    Close,
    Volume,
    Rsi14,
    Sma50,
    Sma200,
    Ema20,
    Macd,
}

pub const FEATURE_SCHEMA: [FeatureKind; FEATURE_COUNT] = [
    FeatureKind::Close,
    FeatureKind::Volume,
    FeatureKind::Rsi14,
    FeatureKind::Sma50,
    FeatureKind::Sma200,
    FeatureKind::Ema20,
    FeatureKind::Macd,
];

impl FeatureKind {
    /// Column name used in training exports and artifact metadata.
    pub fn name(self) -> &'static str {
        match self {
            FeatureKind::Close => "Close",
            FeatureKind::Volume => "Volume",
            FeatureKind::Rsi14 => "RSI",
            FeatureKind::Sma50 => "SMA_50",
            FeatureKind::Sma200 => "SMA_200",
            FeatureKind::Ema20 => "EMA_20",
            FeatureKind::Macd => "MACD",
        }
    }

    pub fn extract(self, bar: &PriceBar, indicators: &IndicatorSet) -> Option<f64> {
        match self {
            FeatureKind::Close => Some(bar.close),
            FeatureKind::Volume => Some(bar.volume as f64),
            FeatureKind::Rsi14 => indicators.rsi_14,
            FeatureKind::Sma50 => indicators.sma_50,
            FeatureKind::Sma200 => indicators.sma_200,
            FeatureKind::Ema20 => indicators.ema_20,
            FeatureKind::Macd => indicators.macd,
        }
    }
}

pub fn feature_names() -> [&'static str; FEATURE_COUNT] {
    FEATURE_SCHEMA.map(FeatureKind::name)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Feature vector for the most recent bar of `series`.
pub fn build_feature_vector(
    series: &PriceSeries,
    indicators: &IndicatorSet,
) -> Result<FeatureVector, PipelineError> {
    build_feature_vector_at(series.last(), indicators)
}

/// Feature vector for an arbitrary bar. Fails with `IncompleteFeatures`
/// naming every unavailable input rather than substituting a placeholder.
pub fn build_feature_vector_at(
    bar: &PriceBar,
    indicators: &IndicatorSet,
) -> Result<FeatureVector, PipelineError> {
    let mut values = [0.0; FEATURE_COUNT];
    let mut missing = Vec::new();

    for (slot, kind) in values.iter_mut().zip(FEATURE_SCHEMA) {
        match kind.extract(bar, indicators) {
            Some(v) if v.is_finite() => *slot = v,
            _ => missing.push(kind.name()),
        }
    }

    if missing.is_empty() {
        Ok(FeatureVector(values))
    } else {
        Err(PipelineError::IncompleteFeatures { missing })
    }
}
