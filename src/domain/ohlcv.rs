//! Price bars and per-ticker price series.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Ordered, non-empty run of bars for one ticker and one (period, interval) pair.
///
/// Construction sorts bars oldest-first and rejects an empty input, so every
/// `PriceSeries` in the pipeline has a last bar.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    ticker: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(ticker: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<Self, PipelineError> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(PipelineError::DataUnavailable { ticker });
        }
        bars.sort_by_key(|b| b.timestamp);
        Ok(Self { ticker, bars })
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last(&self) -> &PriceBar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}
