#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use stockpulse::domain::error::PipelineError;
use stockpulse::domain::model::ModelArtifact;
pub use stockpulse::domain::ohlcv::{PriceBar, PriceSeries};
use stockpulse::domain::period::Period;
use stockpulse::domain::prediction::PredictionContext;
use stockpulse::domain::settings::PipelineSettings;
use stockpulse::ports::price_history_port::PriceHistoryPort;
use stockpulse::tools::Toolbox;

/// In-memory provider keyed by ticker. Unknown tickers behave like an empty
/// provider response.
pub struct MockPriceHistory {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
    pub calls: AtomicUsize,
}

impl MockPriceHistory {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

#[async_trait]
impl PriceHistoryPort for MockPriceHistory {
    async fn fetch(
        &self,
        ticker: &str,
        _period: &Period,
        _interval: &str,
    ) -> Result<PriceSeries, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = self.errors.get(ticker) {
            return Err(PipelineError::Provider {
                ticker: ticker.to_string(),
                reason: reason.clone(),
            });
        }
        PriceSeries::new(ticker, self.data.get(ticker).cloned().unwrap_or_default())
    }
}

/// Daily bars starting 2023-01-02, one per close, volume fixed at 10_000.
pub fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
    let start = Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + Duration::days(i as i64),
            open: close,
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 10_000,
        })
        .collect()
}

pub fn constant_closes(n: usize, price: f64) -> Vec<f64> {
    vec![price; n]
}

pub fn rising_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

/// Two stumps: Close (f0) split at 100 with leaves -1/+1, RSI (f2) split at
/// 50 with leaves -0.5/+0.5, base score 10.
pub const STUMPS_MODEL: &str = r#"{
    "learner": {
        "feature_names": [],
        "gradient_booster": {
            "model": {
                "trees": [
                    {
                        "left_children": [1, -1, -1],
                        "right_children": [2, -1, -1],
                        "split_indices": [0, 0, 0],
                        "split_conditions": [100.0, -1.0, 1.0],
                        "default_left": [1, 0, 0]
                    },
                    {
                        "left_children": [1, -1, -1],
                        "right_children": [2, -1, -1],
                        "split_indices": [2, 0, 0],
                        "split_conditions": [50.0, -0.5, 0.5],
                        "default_left": [0, 0, 0]
                    }
                ]
            },
            "name": "gbtree"
        },
        "learner_model_param": { "base_score": "1E1", "num_feature": "7" },
        "objective": { "name": "reg:squarederror" }
    },
    "version": [2, 0, 0]
}"#;

pub const IDENTITY_SCALER: &str =
    r#"{"mean":[0,0,0,0,0,0,0],"scale":[1,1,1,1,1,1,1]}"#;

pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub fn stumps_artifact() -> ModelArtifact {
    let model = write_temp(STUMPS_MODEL);
    let scaler = write_temp(IDENTITY_SCALER);
    ModelArtifact::load(model.path(), scaler.path()).unwrap()
}

pub fn toolbox(provider: MockPriceHistory) -> Toolbox {
    Toolbox::new(Arc::new(provider), PipelineSettings::default())
        .with_prediction(PredictionContext::new(stumps_artifact()))
}
