//! Model artifact: the trained regressor and its feature scaler.

pub mod regressor;
pub mod scaler;

pub use regressor::GradientBoostedTrees;
pub use scaler::StandardScaler;

use std::fs;
use std::path::Path;

use crate::domain::error::PipelineError;
use crate::domain::features::{feature_names, FeatureVector, FEATURE_COUNT};

/// Immutable {regressor, scaler} pair, loaded once per process and shared
/// read-only by every prediction.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifact {
    regressor: GradientBoostedTrees,
    scaler: StandardScaler,
}

impl ModelArtifact {
    /// Assemble an artifact, checking both halves against the feature schema.
    pub fn new(regressor: GradientBoostedTrees, scaler: StandardScaler) -> Result<Self, PipelineError> {
        check_count(regressor.num_features())?;
        check_count(scaler.num_features())?;
        check_names("regressor", regressor.feature_names())?;
        if let Some(names) = &scaler.feature_names {
            check_names("scaler", names)?;
        }
        Ok(Self { regressor, scaler })
    }

    /// Fail-fast load from the two artifact files.
    pub fn load(
        regressor_path: impl AsRef<Path>,
        scaler_path: impl AsRef<Path>,
    ) -> Result<Self, PipelineError> {
        let regressor_path = regressor_path.as_ref();
        let scaler_path = scaler_path.as_ref();

        let regressor = read_artifact(regressor_path, GradientBoostedTrees::from_json)?;
        let scaler = read_artifact(scaler_path, StandardScaler::from_json)?;
        let artifact = Self::new(regressor, scaler)?;

        tracing::info!(
            regressor = %regressor_path.display(),
            scaler = %scaler_path.display(),
            trees = artifact.regressor.num_trees(),
            "model artifact loaded"
        );
        Ok(artifact)
    }

    /// Scale the vector, then run the regressor.
    pub fn predict(&self, features: &FeatureVector) -> f64 {
        let scaled = self.scaler.transform(features);
        self.regressor.predict(&scaled)
    }
}

fn read_artifact<T>(
    path: &Path,
    parse: impl FnOnce(&str) -> Result<T, String>,
) -> Result<T, PipelineError> {
    let load_err = |reason: String| PipelineError::ArtifactLoad {
        path: path.display().to_string(),
        reason,
    };
    let text = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
    parse(&text).map_err(load_err)
}

fn check_count(found: usize) -> Result<(), PipelineError> {
    if found != FEATURE_COUNT {
        return Err(PipelineError::FeatureCountMismatch {
            expected: FEATURE_COUNT,
            found,
        });
    }
    Ok(())
}

fn check_names(which: &str, names: &[String]) -> Result<(), PipelineError> {
    if names.is_empty() {
        return Ok(());
    }
    let expected = feature_names();
    if names.iter().map(String::as_str).ne(expected.iter().copied()) {
        return Err(PipelineError::ArtifactLoad {
            path: which.to_string(),
            reason: format!(
                "feature order {:?} does not match pipeline order {:?}",
                names, expected
            ),
        });
    }
    Ok(())
}
