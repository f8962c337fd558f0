//! Per-feature standardization fitted at training time.

use serde::{Deserialize, Serialize};

use crate::domain::features::{FeatureVector, FEATURE_COUNT};

/// x' = (x - mean) / scale, column by column.
///
/// A zero scale (constant training column) is treated as 1 so the transform
/// only centers that column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn from_json(text: &str) -> Result<Self, String> {
        let scaler: StandardScaler =
            serde_json::from_str(text).map_err(|e| format!("invalid scaler JSON: {}", e))?;
        scaler.validate()?;
        Ok(scaler)
    }

    fn validate(&self) -> Result<(), String> {
        if self.mean.len() != self.scale.len() {
            return Err(format!(
                "scaler mean has {} columns but scale has {}",
                self.mean.len(),
                self.scale.len()
            ));
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err("scaler contains non-finite values".into());
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(format!(
                    "scaler names {} columns but stores {}",
                    names.len(),
                    self.mean.len()
                ));
            }
        }
        Ok(())
    }

    pub fn num_features(&self) -> usize {
        self.mean.len()
    }

    /// Fit mean and population standard deviation (ddof = 0) per column.
    pub fn fit(samples: &[FeatureVector]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mut mean = vec![0.0; FEATURE_COUNT];
        let mut scale = vec![0.0; FEATURE_COUNT];

        for (col, m) in mean.iter_mut().enumerate() {
            *m = samples.iter().map(|s| s.0[col]).sum::<f64>() / n;
        }
        for (col, sd) in scale.iter_mut().enumerate() {
            let var = samples
                .iter()
                .map(|s| (s.0[col] - mean[col]).powi(2))
                .sum::<f64>()
                / n;
            *sd = var.sqrt();
        }

        Some(Self {
            feature_names: Some(
                crate::domain::features::feature_names()
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
            ),
            mean,
            scale,
        })
    }

    pub fn transform(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut out = [0.0; FEATURE_COUNT];
        for (col, (slot, x)) in out.iter_mut().zip(features.0).enumerate() {
            let scale = match self.scale.get(col) {
                Some(&s) if s != 0.0 => s,
                _ => 1.0,
            };
            *slot = (x - self.mean.get(col).copied().unwrap_or(0.0)) / scale;
        }
        out
    }
}
