//! Tool invocation surface.
//!
//! Four operations exposed to an orchestration layer: `get_data`,
//! `indicators`, `predict` and `backtest`. Each returns either its result
//! object or `{ "error": "..." }`; pipeline errors never escape as `Err`.
//! [`Toolbox::handle_line`] serves the same operations over line-delimited
//! JSON requests of the form `{ "id": .., "tool": "predict", "args": {..} }`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::backtest::{BacktestResult, Strategy};
use crate::domain::error::PipelineError;
use crate::domain::indicator_set::{compute_indicator_set, IndicatorSet};
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::Period;
use crate::domain::prediction::{PredictionContext, PredictionResult};
use crate::domain::settings::PipelineSettings;
use crate::domain::ticker::normalize_ticker;
use crate::ports::price_history_port::PriceHistoryPort;

pub const DEFAULT_HORIZON_DAYS: u32 = 5;
pub const DEFAULT_STRATEGY: &str = "sma_cross";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolError {
    pub error: String,
}

/// Success payload or `{ "error": .. }`, serialized without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult<T> {
    Ok(T),
    Err(ToolError),
}

impl<T> ToolResult<T> {
    pub fn error(&self) -> Option<&str> {
        match self {
            ToolResult::Err(e) => Some(&e.error),
            ToolResult::Ok(_) => None,
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            ToolResult::Ok(v) => Some(v),
            ToolResult::Err(_) => None,
        }
    }
}

impl<T> From<Result<T, PipelineError>> for ToolResult<T> {
    fn from(result: Result<T, PipelineError>) -> Self {
        match result {
            Ok(v) => ToolResult::Ok(v),
            Err(e) => {
                tracing::warn!(error = %e, "tool call failed");
                ToolResult::Err(ToolError {
                    error: e.to_string(),
                })
            }
        }
    }
}

/// One row of `get_data` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DataRecord {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl From<&PriceBar> for DataRecord {
    fn from(bar: &PriceBar) -> Self {
        Self {
            date: bar.timestamp,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorReport {
    pub ticker: String,
    #[serde(flatten)]
    pub indicators: IndicatorSet,
}

#[derive(Debug, Deserialize)]
pub struct ToolRequest {
    #[serde(default)]
    pub id: Value,
    pub tool: String,
    #[serde(default)]
    pub args: Value,
}

#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub id: Value,
    pub result: Value,
}

#[derive(Debug, Deserialize)]
struct GetDataArgs {
    ticker: String,
    period: Option<String>,
    interval: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IndicatorsArgs {
    ticker: String,
    period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PredictArgs {
    ticker: String,
    horizon: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct BacktestArgs {
    ticker: String,
    strategy: Option<String>,
}

/// Everything a tool call needs. Cloning is cheap; clones share the
/// provider and the model artifact.
#[derive(Clone)]
pub struct Toolbox {
    provider: Arc<dyn PriceHistoryPort>,
    settings: PipelineSettings,
    ticker_suffix: Option<String>,
    prediction: Option<PredictionContext>,
}

impl Toolbox {
    pub fn new(provider: Arc<dyn PriceHistoryPort>, settings: PipelineSettings) -> Self {
        Self {
            provider,
            settings,
            ticker_suffix: None,
            prediction: None,
        }
    }

    pub fn with_ticker_suffix(mut self, suffix: Option<String>) -> Self {
        self.ticker_suffix = suffix;
        self
    }

    pub fn with_prediction(mut self, prediction: PredictionContext) -> Self {
        self.prediction = Some(prediction);
        self
    }

    fn ticker(&self, raw: &str) -> String {
        normalize_ticker(raw, self.ticker_suffix.as_deref())
    }

    async fn fetch(
        &self,
        ticker: &str,
        period: &Period,
        interval: &str,
    ) -> Result<PriceSeries, PipelineError> {
        self.provider.fetch(ticker, period, interval).await
    }

    fn period_or(raw: Option<&str>, default: Period) -> Result<Period, PipelineError> {
        raw.map_or(Ok(default), str::parse)
    }

    pub async fn get_data(
        &self,
        ticker: &str,
        period: Option<&str>,
        interval: Option<&str>,
    ) -> ToolResult<Vec<DataRecord>> {
        self.try_get_data(ticker, period, interval).await.into()
    }

    pub async fn indicators(&self, ticker: &str, period: Option<&str>) -> ToolResult<IndicatorReport> {
        self.try_indicators(ticker, period).await.into()
    }

    pub async fn predict(&self, ticker: &str, horizon_days: u32) -> ToolResult<PredictionResult> {
        self.try_predict(ticker, horizon_days).await.into()
    }

    pub async fn backtest(&self, ticker: &str, strategy: &str) -> ToolResult<BacktestResult> {
        self.try_backtest(ticker, strategy).await.into()
    }

    pub(crate) async fn try_get_data(
        &self,
        ticker: &str,
        period: Option<&str>,
        interval: Option<&str>,
    ) -> Result<Vec<DataRecord>, PipelineError> {
        let ticker = self.ticker(ticker);
        let period = Self::period_or(period, self.settings.indicator_period)?;
        let interval = interval.unwrap_or(&self.settings.interval);
        let series = self.fetch(&ticker, &period, interval).await?;
        Ok(series.bars().iter().map(DataRecord::from).collect())
    }

    pub(crate) async fn try_indicators(
        &self,
        ticker: &str,
        period: Option<&str>,
    ) -> Result<IndicatorReport, PipelineError> {
        let ticker = self.ticker(ticker);
        let period = Self::period_or(period, self.settings.indicator_period)?;
        let series = self.fetch(&ticker, &period, &self.settings.interval).await?;
        Ok(IndicatorReport {
            ticker,
            indicators: compute_indicator_set(&series),
        })
    }

    pub(crate) async fn try_predict(
        &self,
        ticker: &str,
        horizon_days: u32,
    ) -> Result<PredictionResult, PipelineError> {
        let Some(prediction) = &self.prediction else {
            return Err(PipelineError::ArtifactLoad {
                path: "model".into(),
                reason: "no model artifact loaded".into(),
            });
        };
        let ticker = self.ticker(ticker);
        let series = self
            .fetch(&ticker, &self.settings.prediction_period, &self.settings.interval)
            .await?;
        let result = prediction.predict(&series, horizon_days)?;
        tracing::info!(
            ticker = %result.ticker,
            bars = series.len(),
            horizon_days,
            predicted_price = result.predicted_price,
            current_price = result.current_price,
            "prediction served"
        );
        Ok(result)
    }

    pub(crate) async fn try_backtest(&self, ticker: &str, strategy: &str) -> Result<BacktestResult, PipelineError> {
        let strategy: Strategy = strategy.parse()?;
        let ticker = self.ticker(ticker);
        let series = self
            .fetch(&ticker, &self.settings.backtest_period, &self.settings.interval)
            .await?;
        let result = strategy.run(&series);
        tracing::info!(
            ticker = %result.ticker,
            %strategy,
            bars = series.len(),
            strategy_total_return = result.strategy_total_return,
            buy_hold_return = result.buy_hold_return,
            "backtest served"
        );
        Ok(result)
    }

    /// Dispatch one request by tool name.
    pub async fn handle(&self, request: ToolRequest) -> ToolResponse {
        tracing::debug!(tool = %request.tool, id = %request.id, "tool request");
        let result = match request.tool.as_str() {
            "get_data" => match parse_args::<GetDataArgs>(request.args) {
                Ok(a) => to_value(
                    self.get_data(&a.ticker, a.period.as_deref(), a.interval.as_deref())
                        .await,
                ),
                Err(e) => e,
            },
            "indicators" => match parse_args::<IndicatorsArgs>(request.args) {
                Ok(a) => to_value(self.indicators(&a.ticker, a.period.as_deref()).await),
                Err(e) => e,
            },
            "predict" => match parse_args::<PredictArgs>(request.args) {
                Ok(a) => to_value(
                    self.predict(&a.ticker, a.horizon.unwrap_or(DEFAULT_HORIZON_DAYS))
                        .await,
                ),
                Err(e) => e,
            },
            "backtest" => match parse_args::<BacktestArgs>(request.args) {
                Ok(a) => to_value(
                    self.backtest(&a.ticker, a.strategy.as_deref().unwrap_or(DEFAULT_STRATEGY))
                        .await,
                ),
                Err(e) => e,
            },
            other => error_value(format!("unknown tool: {}", other)),
        };
        ToolResponse {
            id: request.id,
            result,
        }
    }

    /// Handle one line of JSON and return one line of JSON.
    pub async fn handle_line(&self, line: &str) -> String {
        let response = match serde_json::from_str::<ToolRequest>(line) {
            Ok(request) => self.handle(request).await,
            Err(e) => ToolResponse {
                id: Value::Null,
                result: error_value(format!("invalid request: {}", e)),
            },
        };
        serde_json::to_string(&response).unwrap_or_else(|e| {
            format!(r#"{{"id":null,"result":{{"error":"serialization failed: {}"}}}}"#, e)
        })
    }
}

fn error_value(error: String) -> Value {
    serde_json::json!({ "error": error })
}

fn to_value<T: Serialize>(result: ToolResult<T>) -> Value {
    serde_json::to_value(result)
        .unwrap_or_else(|e| error_value(format!("serialization failed: {}", e)))
}

fn parse_args<A: serde::de::DeserializeOwned>(args: Value) -> Result<A, Value> {
    serde_json::from_value(args).map_err(|e| error_value(format!("invalid arguments: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};

    struct FixedProvider {
        closes: Vec<f64>,
    }

    #[async_trait]
    impl PriceHistoryPort for FixedProvider {
        async fn fetch(
            &self,
            ticker: &str,
            _period: &Period,
            _interval: &str,
        ) -> Result<PriceSeries, PipelineError> {
            if ticker == "FAKE.NS" {
                return PriceSeries::new(ticker, vec![]);
            }
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let bars = self
                .closes
                .iter()
                .enumerate()
                .map(|(i, &close)| PriceBar {
                    timestamp: start + Duration::days(i as i64),
                    open: close,
                    high: close,
                    low: close,
                    close,
                    volume: 500,
                })
                .collect();
            PriceSeries::new(ticker, bars)
        }
    }

    fn toolbox(closes: Vec<f64>) -> Toolbox {
        Toolbox::new(Arc::new(FixedProvider { closes }), PipelineSettings::default())
            .with_ticker_suffix(Some(".NS".into()))
    }

    #[test]
    fn tool_result_serializes_untagged() {
        let ok = ToolResult::from(Ok::<u32, PipelineError>(7));
        assert_eq!(serde_json::to_string(&ok).unwrap(), "7");

        let err = ToolResult::<u32>::from(Err(PipelineError::DataUnavailable {
            ticker: "FAKE.NS".into(),
        }));
        assert_eq!(
            serde_json::to_string(&err).unwrap(),
            r#"{"error":"No data for ticker FAKE.NS"}"#
        );
    }

    #[tokio::test]
    async fn get_data_uses_capitalized_fields() {
        let tb = toolbox(vec![10.0, 11.0]);
        let rows = tb.get_data("tcs", None, None).await.ok().unwrap();
        let json = serde_json::to_value(&rows[1]).unwrap();
        assert_eq!(json["Close"], 11.0);
        assert_eq!(json["Volume"], 500);
        assert!(json["Date"].as_str().unwrap().starts_with("2024-01-02"));
    }

    #[tokio::test]
    async fn indicators_carry_normalized_ticker() {
        let tb = toolbox(vec![100.0; 30]);
        let report = tb.indicators("infy", None).await.ok().unwrap();
        assert_eq!(report.ticker, "INFY.NS");
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["SMA_50"].is_null());
        assert_eq!(json["RSI"], 50.0);
    }

    #[tokio::test]
    async fn unknown_strategy_is_error_value() {
        let tb = toolbox(vec![100.0; 10]);
        let result = tb.backtest("TCS", "momentum").await;
        assert_eq!(result.error(), Some("unknown strategy: momentum"));
    }

    #[tokio::test]
    async fn predict_without_artifact_is_error_value() {
        let tb = toolbox(vec![100.0; 10]);
        assert!(tb.predict("TCS", 5).await.error().is_some());
    }

    #[tokio::test]
    async fn bad_period_is_error_value() {
        let tb = toolbox(vec![100.0; 10]);
        let result = tb.indicators("TCS", Some("forever")).await;
        assert_eq!(result.error(), Some("invalid period: forever"));
    }

    #[tokio::test]
    async fn dispatch_echoes_id() {
        let tb = toolbox(vec![100.0; 10]);
        let line = tb
            .handle_line(r#"{"id": 42, "tool": "backtest", "args": {"ticker": "FAKE"}}"#)
            .await;
        let json: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["result"]["error"], "No data for ticker FAKE.NS");
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_tool_and_bad_json() {
        let tb = toolbox(vec![100.0; 10]);

        let line = tb.handle_line(r#"{"id": "a", "tool": "trade", "args": {}}"#).await;
        let json: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["result"]["error"], "unknown tool: trade");

        let line = tb.handle_line("not json").await;
        let json: Value = serde_json::from_str(&line).unwrap();
        assert!(json["id"].is_null());
        assert!(json["result"]["error"].as_str().unwrap().starts_with("invalid request"));
    }

    #[tokio::test]
    async fn dispatch_reports_missing_arguments() {
        let tb = toolbox(vec![100.0; 10]);
        let line = tb.handle_line(r#"{"id": 1, "tool": "predict", "args": {}}"#).await;
        let json: Value = serde_json::from_str(&line).unwrap();
        assert!(json["result"]["error"].as_str().unwrap().starts_with("invalid arguments"));
    }
}
