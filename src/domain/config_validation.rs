//! Configuration validation.
//!
//! Every key is checked before any fetch or artifact load starts.

use std::path::PathBuf;

use crate::domain::error::PipelineError;
use crate::domain::period::Period;
use crate::domain::settings::{
    ModelSettings, PipelineSettings, ProviderKind, ProviderSettings, Settings,
    DEFAULT_INTERVAL, DEFAULT_REGRESSOR_PATH, DEFAULT_SCALER_PATH, DEFAULT_TIMEOUT_SECS,
};
use crate::ports::config_port::ConfigPort;

/// Intervals accepted by the chart endpoint.
pub const SUPPORTED_INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

pub fn settings_from_config(config: &dyn ConfigPort) -> Result<Settings, PipelineError> {
    Ok(Settings {
        provider: validate_provider(config)?,
        model: validate_model(config),
        pipeline: validate_pipeline(config)?,
    })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> PipelineError {
    PipelineError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn non_empty(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn validate_provider(config: &dyn ConfigPort) -> Result<ProviderSettings, PipelineError> {
    let kind = match non_empty(config, "provider", "kind").as_deref() {
        None => ProviderKind::default(),
        Some(k) if k.eq_ignore_ascii_case("yahoo") => ProviderKind::Yahoo,
        Some(k) if k.eq_ignore_ascii_case("csv") => ProviderKind::Csv,
        Some(k) => {
            return Err(invalid(
                "provider",
                "kind",
                format!("unknown provider {}, expected yahoo or csv", k),
            ))
        }
    };

    let data_dir = non_empty(config, "provider", "data_dir").map(PathBuf::from);
    if kind == ProviderKind::Csv && data_dir.is_none() {
        return Err(invalid(
            "provider",
            "data_dir",
            "data_dir is required for the csv provider",
        ));
    }

    let timeout_secs = match non_empty(config, "provider", "timeout_secs") {
        None => DEFAULT_TIMEOUT_SECS,
        Some(raw) => match raw.parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => {
                return Err(invalid(
                    "provider",
                    "timeout_secs",
                    "timeout_secs must be a positive integer",
                ))
            }
        },
    };

    let ticker_suffix = non_empty(config, "provider", "ticker_suffix");
    if let Some(suffix) = &ticker_suffix {
        if !suffix.starts_with('.') {
            return Err(invalid(
                "provider",
                "ticker_suffix",
                "ticker_suffix must start with '.'",
            ));
        }
    }

    Ok(ProviderSettings {
        kind,
        data_dir,
        timeout_secs,
        ticker_suffix,
    })
}

fn validate_model(config: &dyn ConfigPort) -> ModelSettings {
    let path = |key: &str, default: &str| {
        PathBuf::from(non_empty(config, "model", key).unwrap_or_else(|| default.to_string()))
    };
    ModelSettings {
        regressor_path: path("regressor_path", DEFAULT_REGRESSOR_PATH),
        scaler_path: path("scaler_path", DEFAULT_SCALER_PATH),
    }
}

fn validate_period(
    config: &dyn ConfigPort,
    key: &str,
    default: Period,
) -> Result<Period, PipelineError> {
    match non_empty(config, "pipeline", key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<Period>()
            .map_err(|e| invalid("pipeline", key, e.to_string())),
    }
}

fn validate_pipeline(config: &dyn ConfigPort) -> Result<PipelineSettings, PipelineError> {
    let defaults = PipelineSettings::default();

    let interval = non_empty(config, "pipeline", "interval")
        .unwrap_or_else(|| DEFAULT_INTERVAL.to_string());
    if !SUPPORTED_INTERVALS.contains(&interval.as_str()) {
        return Err(invalid(
            "pipeline",
            "interval",
            format!("unsupported interval {}", interval),
        ));
    }

    Ok(PipelineSettings {
        indicator_period: validate_period(config, "indicator_period", defaults.indicator_period)?,
        prediction_period: validate_period(
            config,
            "prediction_period",
            defaults.prediction_period,
        )?,
        backtest_period: validate_period(config, "backtest_period", defaults.backtest_period)?,
        interval,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn empty_config_gives_defaults() {
        let settings = settings_from_config(&make_config("")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.pipeline.prediction_period, Period::Months(6));
        assert_eq!(settings.pipeline.backtest_period, Period::Years(1));
        assert_eq!(
            settings.model.regressor_path,
            PathBuf::from("models/xgb_model.json")
        );
    }

    #[test]
    fn full_config_is_read() {
        let config = make_config(
            r#"
[provider]
kind = csv
data_dir = /var/lib/prices
timeout_secs = 5
ticker_suffix = .NS

[model]
regressor_path = /opt/models/xgb.json
scaler_path = /opt/models/scaler.json

[pipeline]
indicator_period = 1y
prediction_period = 1y
backtest_period = 2y
interval = 1d
"#,
        );
        let settings = settings_from_config(&config).unwrap();
        assert_eq!(settings.provider.kind, ProviderKind::Csv);
        assert_eq!(settings.provider.data_dir, Some(PathBuf::from("/var/lib/prices")));
        assert_eq!(settings.provider.timeout_secs, 5);
        assert_eq!(settings.provider.ticker_suffix.as_deref(), Some(".NS"));
        assert_eq!(settings.model.scaler_path, PathBuf::from("/opt/models/scaler.json"));
        assert_eq!(settings.pipeline.prediction_period, Period::Years(1));
        assert_eq!(settings.pipeline.backtest_period, Period::Years(2));
    }

    #[test]
    fn unknown_provider_fails() {
        let err = settings_from_config(&make_config("[provider]\nkind = bloomberg\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "kind"));
    }

    #[test]
    fn csv_provider_requires_data_dir() {
        let err = settings_from_config(&make_config("[provider]\nkind = csv\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "data_dir"));
    }

    #[test]
    fn zero_timeout_fails() {
        let err = settings_from_config(&make_config("[provider]\ntimeout_secs = 0\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn non_numeric_timeout_fails() {
        let err =
            settings_from_config(&make_config("[provider]\ntimeout_secs = soon\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "timeout_secs"));
    }

    #[test]
    fn suffix_without_dot_fails() {
        let err =
            settings_from_config(&make_config("[provider]\nticker_suffix = NS\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "ticker_suffix"));
    }

    #[test]
    fn bad_period_fails() {
        let err = settings_from_config(&make_config("[pipeline]\nbacktest_period = 1 year\n"))
            .unwrap_err();
        assert!(
            matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "backtest_period")
        );
    }

    #[test]
    fn unsupported_interval_fails() {
        let err = settings_from_config(&make_config("[pipeline]\ninterval = 7d\n")).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { key, .. } if key == "interval"));
    }
}
