//! Resolved runtime settings.
//!
//! Built from a `ConfigPort` by `config_validation::settings_from_config`;
//! `Settings::default()` is what an absent config file means.

use std::path::PathBuf;

use crate::domain::period::Period;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REGRESSOR_PATH: &str = "models/xgb_model.json";
pub const DEFAULT_SCALER_PATH: &str = "models/scaler.json";
pub const DEFAULT_INTERVAL: &str = "1d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub data_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub ticker_suffix: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderKind::Yahoo,
            data_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ticker_suffix: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSettings {
    pub regressor_path: PathBuf,
    pub scaler_path: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            regressor_path: PathBuf::from(DEFAULT_REGRESSOR_PATH),
            scaler_path: PathBuf::from(DEFAULT_SCALER_PATH),
        }
    }
}

/// Look-back windows used by each tool when fetching history.
///
/// The prediction window defaults to 6 months (about 126 daily bars), which
/// is shorter than the 200-bar SMA warm-up; such predictions report
/// incomplete features. Set `prediction_period = 1y` to get a full vector.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub indicator_period: Period,
    pub prediction_period: Period,
    pub backtest_period: Period,
    pub interval: String,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            indicator_period: Period::Months(6),
            prediction_period: Period::Months(6),
            backtest_period: Period::Years(1),
            interval: DEFAULT_INTERVAL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Settings {
    pub provider: ProviderSettings,
    pub model: ModelSettings,
    pub pipeline: PipelineSettings,
}
