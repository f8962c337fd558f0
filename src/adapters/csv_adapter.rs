//! CSV file price history adapter.
//!
//! Reads `<data_dir>/<TICKER>.csv` with a `date,open,high,low,close,volume`
//! header and daily rows.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::error::PipelineError;
use crate::domain::ohlcv::{PriceBar, PriceSeries};
use crate::domain::period::Period;
use crate::ports::price_history_port::PriceHistoryPort;

#[derive(Debug, Deserialize)]
struct Row {
    date: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", ticker))
    }
}

#[async_trait]
impl PriceHistoryPort for CsvAdapter {
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
        if interval != "1d" {
            return Err(provider_err(format!(
                "csv provider only serves daily bars, not {}",
                interval
            )));
        }

        let path = self.csv_path(ticker);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::DataUnavailable {
                    ticker: ticker.to_string(),
                })
            }
            Err(e) => {
                return Err(provider_err(format!(
                    "failed to read {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for result in rdr.deserialize::<Row>() {
            let row = result.map_err(|e| provider_err(format!("CSV parse error: {}", e)))?;
            let date = NaiveDate::parse_from_str(row.date.trim(), "%Y-%m-%d")
                .map_err(|e| provider_err(format!("invalid date {}: {}", row.date, e)))?;
            bars.push(PriceBar {
                timestamp: date.and_time(chrono::NaiveTime::MIN).and_utc(),
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(start) = bars.last().and_then(|b| period.start_from(b.timestamp)) {
            bars.retain(|b| b.timestamp >= start);
        }

        tracing::debug!(ticker, bars = bars.len(), %period, "read csv history");
        PriceSeries::new(ticker, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "date,open,high,low,close,volume\n\
            2024-01-17,110.0,120.0,105.0,115.0,55000\n\
            2023-06-15,100.0,110.0,90.0,105.0,50000\n\
            2024-01-16,105.0,115.0,100.0,110.0,60000\n";

        fs::write(path.join("TCS.NS.csv"), csv_content).unwrap();
        fs::write(path.join("EMPTY.NS.csv"), "date,open,high,low,close,volume\n").unwrap();
        fs::write(
            path.join("BAD.NS.csv"),
            "date,open,high,low,close,volume\n17/01/2024,1,1,1,1,1\n",
        )
        .unwrap();

        (dir, path)
    }

    #[tokio::test]
    async fn fetch_returns_sorted_bars() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch("TCS.NS", &Period::Max, "1d").await.unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![105.0, 110.0, 115.0]);
        let first = &series.bars()[0];
        assert_eq!(first.open, 100.0);
        assert_eq!(first.high, 110.0);
        assert_eq!(first.low, 90.0);
        assert_eq!(first.volume, 50000);
    }

    #[tokio::test]
    async fn fetch_filters_by_period_from_newest_bar() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let series = adapter.fetch("TCS.NS", &Period::Months(6), "1d").await.unwrap();
        assert_eq!(series.closes(), vec![110.0, 115.0]);
    }

    #[tokio::test]
    async fn oversized_period_keeps_every_bar() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let period: Period = "4000000000d".parse().unwrap();
        let series = adapter.fetch("TCS.NS", &period, "1d").await.unwrap();
        assert_eq!(series.len(), 3);
    }

    #[tokio::test]
    async fn missing_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch("FAKE.NS", &Period::Years(1), "1d").await.unwrap_err();
        assert_eq!(err.to_string(), "No data for ticker FAKE.NS");
    }

    #[tokio::test]
    async fn header_only_file_is_data_unavailable() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch("EMPTY.NS", &Period::Years(1), "1d").await.unwrap_err();
        assert!(matches!(err, PipelineError::DataUnavailable { .. }));
    }

    #[tokio::test]
    async fn bad_date_is_provider_error() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch("BAD.NS", &Period::Years(1), "1d").await.unwrap_err();
        assert!(matches!(err, PipelineError::Provider { .. }));
    }

    #[tokio::test]
    async fn intraday_interval_is_rejected() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch("TCS.NS", &Period::Days(5), "1h").await.unwrap_err();
        assert!(matches!(err, PipelineError::Provider { ref reason, .. } if reason.contains("1h")));
    }
}
