//! CLI integration tests.
//!
//! Tests cover:
//! - Argument parsing and defaults for every subcommand
//! - Settings loading from INI files on disk
//! - The line-delimited JSON tool server with a mock provider

mod common;

use clap::Parser;
use common::*;
use std::path::PathBuf;
use stockpulse::cli::{self, Cli, Command};
use stockpulse::domain::error::PipelineError;
use stockpulse::domain::period::Period;
use stockpulse::domain::settings::ProviderKind;

mod argument_parsing {
    use super::*;

    #[test]
    fn predict_defaults_to_five_day_horizon() {
        let cli = Cli::try_parse_from(["stockpulse", "predict", "RELIANCE.NS"]).unwrap();
        assert!(cli.config.is_none());
        match cli.command {
            Command::Predict { ticker, horizon } => {
                assert_eq!(ticker, "RELIANCE.NS");
                assert_eq!(horizon, 5);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn backtest_defaults_to_sma_cross() {
        let cli = Cli::try_parse_from(["stockpulse", "backtest", "TCS.NS"]).unwrap();
        assert!(matches!(cli.command, Command::Backtest { ref strategy, .. } if strategy == "sma_cross"));
    }

    #[test]
    fn config_is_accepted_after_subcommand() {
        let cli =
            Cli::try_parse_from(["stockpulse", "indicators", "INFY.NS", "--config", "sp.ini"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("sp.ini")));
    }

    #[test]
    fn features_defaults_to_nse_universe() {
        let cli = Cli::try_parse_from(["stockpulse", "features", "--output", "data.csv"]).unwrap();
        match cli.command {
            Command::Features {
                tickers, period, ..
            } => {
                assert_eq!(tickers.len(), 5);
                assert_eq!(tickers[0], "RELIANCE.NS");
                assert_eq!(period, "2y");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn features_requires_output() {
        assert!(Cli::try_parse_from(["stockpulse", "features"]).is_err());
    }
}

mod settings_loading {
    use super::*;

    #[test]
    fn no_config_file_means_defaults() {
        let settings = cli::load_settings(None).unwrap();
        assert_eq!(settings.provider.kind, ProviderKind::Yahoo);
        assert_eq!(settings.pipeline.indicator_period, Period::Months(6));
    }

    #[test]
    fn reads_ini_from_disk() {
        let file = write_temp("[provider]\nkind = csv\ndata_dir = /tmp/prices\n\n[pipeline]\nprediction_period = 1y\n");
        let settings = cli::load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.provider.kind, ProviderKind::Csv);
        assert_eq!(settings.pipeline.prediction_period, Period::Years(1));
    }

    #[test]
    fn missing_file_is_config_parse_error() {
        let err = cli::load_settings(Some(std::path::Path::new("/nonexistent/sp.ini"))).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
    }

    #[test]
    fn invalid_value_is_config_error() {
        let file = write_temp("[pipeline]\nbacktest_period = forever\n");
        let err = cli::load_settings(Some(file.path())).unwrap_err();
        assert!(matches!(err, PipelineError::ConfigInvalid { ref key, .. } if key == "backtest_period"));
    }
}

mod tool_server {
    use super::*;
    use serde_json::Value;
    use tokio::io::BufReader;

    async fn serve(provider: MockPriceHistory, input: &str) -> Vec<Value> {
        let mut out = Vec::new();
        cli::serve_lines(toolbox(provider), BufReader::new(input.as_bytes()), &mut out)
            .await
            .unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    fn by_id(responses: &[Value], id: u64) -> &Value {
        responses
            .iter()
            .find(|r| r["id"] == id)
            .unwrap_or_else(|| panic!("no response for id {id}"))
    }

    #[tokio::test]
    async fn answers_every_request() {
        let provider = MockPriceHistory::new()
            .with_bars("UP.NS", make_bars(&rising_closes(300)))
            .with_bars("FLAT.NS", make_bars(&constant_closes(250, 100.0)));
        let input = concat!(
            r#"{"id": 1, "tool": "indicators", "args": {"ticker": "UP.NS"}}"#, "\n",
            "\n",
            r#"{"id": 2, "tool": "backtest", "args": {"ticker": "UP.NS"}}"#, "\n",
            r#"{"id": 3, "tool": "predict", "args": {"ticker": "FLAT.NS", "horizon": 3}}"#, "\n",
            r#"{"id": 4, "tool": "get_data", "args": {"ticker": "FAKE.NS"}}"#, "\n",
        );

        let responses = serve(provider, input).await;
        assert_eq!(responses.len(), 4);

        assert_eq!(by_id(&responses, 1)["result"]["RSI"], 100.0);
        assert_eq!(by_id(&responses, 1)["result"]["ticker"], "UP.NS");
        assert!(by_id(&responses, 2)["result"]["strategy_total_return"].as_f64().unwrap() > 0.0);
        assert_eq!(by_id(&responses, 3)["result"]["horizon_days"], 3);
        assert_eq!(by_id(&responses, 3)["result"]["predicted_price"], 11.5);
        assert_eq!(
            by_id(&responses, 4)["result"]["error"],
            "No data for ticker FAKE.NS"
        );
    }

    #[tokio::test]
    async fn empty_input_shuts_down_cleanly() {
        assert!(serve(MockPriceHistory::new(), "").await.is_empty());
    }
}
