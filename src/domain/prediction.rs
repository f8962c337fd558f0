//! Prediction service: indicators, feature vector, scaler, regressor.
//!
//! The model predicts a single next-step close. `horizon_days` is carried
//! through to the result as metadata and does not change the forecast.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::error::PipelineError;
use crate::domain::features::build_feature_vector;
use crate::domain::indicator_set::compute_indicator_set;
use crate::domain::model::ModelArtifact;
use crate::domain::ohlcv::PriceSeries;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub ticker: String,
    pub horizon_days: u32,
    pub predicted_price: f64,
    pub current_price: f64,
}

/// Read-only state shared by every prediction call.
#[derive(Debug, Clone)]
pub struct PredictionContext {
    artifact: Arc<ModelArtifact>,
}

impl PredictionContext {
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            artifact: Arc::new(artifact),
        }
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn predict(
        &self,
        series: &PriceSeries,
        horizon_days: u32,
    ) -> Result<PredictionResult, PipelineError> {
        predict_from_series(&self.artifact, series, horizon_days)
    }
}

pub fn predict_from_series(
    artifact: &ModelArtifact,
    series: &PriceSeries,
    horizon_days: u32,
) -> Result<PredictionResult, PipelineError> {
    let indicators = compute_indicator_set(series);
    let features = build_feature_vector(series, &indicators)?;
    let predicted_price = artifact.predict(&features);

    Ok(PredictionResult {
        ticker: series.ticker().to_string(),
        horizon_days,
        predicted_price,
        current_price: series.last().close,
    })
}
