//! Yahoo Finance chart API adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::domain::error::PipelineError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::Period;
use crate::ports::price_history_port::PriceHistoryPort;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

/// Upper-cased; dots are kept so exchange suffixes such as `.NS` survive.
fn chart_symbol(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

pub struct YahooAdapter {
    client: Client,
}

impl YahooAdapter {
    pub fn new(timeout_secs: u64) -> Result<Self, PipelineError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(std::io::Error::other)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PriceHistoryPort for YahooAdapter {
    async fn fetch(
        &self,
        ticker: &str,
        period: &Period,
        interval: &str,
    ) -> Result<PriceSeries, PipelineError> {
        let provider_err = |reason: String| PipelineError::Provider {
            ticker: ticker.to_string(),
            reason,
        };
        let url = format!("{}/{}", CHART_URL, chart_symbol(ticker));
        let range = period.to_string();

        tracing::debug!(ticker, %range, interval, "fetching chart");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("range", range.as_str()),
                ("interval", interval),
                ("includePrePost", "false"),
            ])
            .send()
            .await
            .map_err(|e| provider_err(format!("request failed: {}", e)))?;

        // Unknown symbols come back as 404 with a chart error body.
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PipelineError::DataUnavailable {
                ticker: ticker.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(provider_err(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| provider_err(format!("read failed: {}", e)))?;
        let series = parse_chart(ticker, &body)?;

        tracing::info!(ticker, bars = series.len(), %range, interval, "fetched price history");
        Ok(series)
    }
}

/// Decode a chart response body into a series. Bars without a positive
/// close are dropped.
pub(crate) fn parse_chart(ticker: &str, body: &str) -> Result<PriceSeries, PipelineError> {
    let provider_err = |reason: String| PipelineError::Provider {
        ticker: ticker.to_string(),
        reason,
    };
    let unavailable = || PipelineError::DataUnavailable {
        ticker: ticker.to_string(),
    };

    let data: ChartResponse =
        serde_json::from_str(body).map_err(|e| provider_err(format!("parse error: {}", e)))?;

    if let Some(error) = data.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(unavailable());
        }
        return Err(provider_err(format!("{} - {}", error.code, error.description)));
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return Err(unavailable());
    };
    let timestamps = result.timestamp.unwrap_or_default();
    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Err(unavailable());
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(close) = at(&closes, i).filter(|c| *c > 0.0) else {
            continue;
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        bars.push(PriceBar {
            timestamp,
            open: at(&opens, i).unwrap_or(close),
            high: at(&highs, i).unwrap_or(close),
            low: at(&lows, i).unwrap_or(close),
            close,
            volume: volumes.get(i).copied().flatten().unwrap_or(0),
        });
    }

    PriceSeries::new(ticker, bars)
}
