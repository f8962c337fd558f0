//! Training dataset export.
//!
//! Rows are built with the same indicator frame and feature schema the
//! prediction path uses, so a booster trained on the exported columns sees
//! exactly what it will be fed online.

use std::io::Write;

use crate::domain::error::PipelineError;
use crate::domain::features::{build_feature_vector_at, feature_names, FeatureVector};
use crate::domain::indicator_set::{IndicatorFrame, IndicatorSet};
use crate::domain::model::StandardScaler;
use crate::domain::ohlcv::PriceSeries;

pub const TARGET_COLUMN: &str = "target";

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    pub features: FeatureVector,
    /// Close of the following bar.
    pub target: f64,
}

/// One sample per bar that has every schema feature defined and a next bar.
pub fn build_training_set(series: &PriceSeries) -> Vec<TrainingSample> {
    let frame = IndicatorFrame::compute(series);
    let bars = series.bars();

    bars.windows(2)
        .enumerate()
        .filter_map(|(idx, pair)| {
            let set = IndicatorSet::at(&frame, idx);
            let features = build_feature_vector_at(&pair[0], &set).ok()?;
            Some(TrainingSample {
                features,
                target: pair[1].close,
            })
        })
        .collect()
}

pub fn fit_scaler(samples: &[TrainingSample]) -> Option<StandardScaler> {
    let vectors: Vec<FeatureVector> = samples.iter().map(|s| s.features).collect();
    StandardScaler::fit(&vectors)
}

/// Write samples as CSV: the schema columns in order, then `target`.
pub fn write_training_csv<W: Write>(
    writer: W,
    samples: &[TrainingSample],
) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_writer(writer);
    let csv_err = |e: csv::Error| PipelineError::Io(std::io::Error::other(e));

    let mut header: Vec<&str> = feature_names().to_vec();
    header.push(TARGET_COLUMN);
    wtr.write_record(&header).map_err(csv_err)?;

    for sample in samples {
        let row = sample
            .features
            .as_slice()
            .iter()
            .chain(std::iter::once(&sample.target))
            .map(|v| v.to_string());
        wtr.write_record(row).map_err(csv_err)?;
    }
    wtr.flush()?;
    Ok(())
}
