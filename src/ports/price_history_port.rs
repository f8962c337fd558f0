//! Price history port trait.

use async_trait::async_trait;

use crate::domain::error::PipelineError;
use crate::domain::ohlcv::PriceSeries;
use crate::domain::period::Period;

/// Source of historical bars for one ticker.
///
/// Implementations return bars oldest-first and report an empty result as
/// `PipelineError::DataUnavailable`. Dropping the returned future must
/// abandon any in-flight request.
#[async_trait]
pub trait PriceHistoryPort: Send + Sync {
    async fn fetch(
        &self,
        ticker: &str,
        period: &Period,
        interval: &str,
    ) -> Result<PriceSeries, PipelineError>;
}
