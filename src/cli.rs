//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::price_history_provider;
use crate::domain::config_validation::settings_from_config;
use crate::domain::error::PipelineError;
use crate::domain::model::ModelArtifact;
use crate::domain::period::Period;
use crate::domain::prediction::PredictionContext;
use crate::domain::settings::{ModelSettings, Settings};
use crate::domain::ticker::normalize_ticker;
use crate::domain::training::{build_training_set, fit_scaler, write_training_csv};
use crate::ports::price_history_port::PriceHistoryPort;
use crate::tools::{Toolbox, DEFAULT_HORIZON_DAYS, DEFAULT_STRATEGY};

pub const DEFAULT_TRAINING_TICKERS: &str = "RELIANCE.NS,TCS.NS,INFY.NS,HDFCBANK.NS,ICICIBANK.NS";

#[derive(Parser, Debug)]
#[command(name = "stockpulse", about = "Technical indicators, price prediction and backtests")]
pub struct Cli {
    /// INI configuration file; defaults apply when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print historical bars as JSON records
    Data {
        ticker: String,
        #[arg(long)]
        period: Option<String>,
        #[arg(long)]
        interval: Option<String>,
    },
    /// Print the latest indicator values
    Indicators {
        ticker: String,
        #[arg(long)]
        period: Option<String>,
    },
    /// Predict the next close with the trained model
    Predict {
        ticker: String,
        #[arg(long, default_value_t = DEFAULT_HORIZON_DAYS)]
        horizon: u32,
    },
    /// Backtest a rule over the configured window
    Backtest {
        ticker: String,
        #[arg(short, long, default_value = DEFAULT_STRATEGY)]
        strategy: String,
    },
    /// Export a training dataset and fit its feature scaler
    Features {
        #[arg(long, value_delimiter = ',', default_value = DEFAULT_TRAINING_TICKERS)]
        tickers: Vec<String>,
        #[arg(long, default_value = "2y")]
        period: String,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        scaler_output: Option<PathBuf>,
    },
    /// Serve tool requests as JSON lines on stdin/stdout
    Serve,
}

pub fn run(cli: Cli) -> ExitCode {
    let settings = match load_settings(cli.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return ExitCode::from(1);
        }
    };

    runtime.block_on(async {
        tokio::select! {
            code = dispatch(cli.command, settings) => code,
            _ = tokio::signal::ctrl_c() => {
                tracing::warn!("interrupted, abandoning in-flight requests");
                ExitCode::from(130)
            }
        }
    })
}

pub fn load_settings(path: Option<&Path>) -> Result<Settings, PipelineError> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    tracing::info!(path = %path.display(), "loading config");
    let adapter = FileConfigAdapter::from_file(path).map_err(|e| PipelineError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })?;
    settings_from_config(&adapter)
}

fn load_artifact(model: &ModelSettings) -> Result<PredictionContext, PipelineError> {
    ModelArtifact::load(&model.regressor_path, &model.scaler_path).map(PredictionContext::new)
}

async fn dispatch(command: Command, settings: Settings) -> ExitCode {
    let provider = match price_history_provider(&settings.provider) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let toolbox = Toolbox::new(provider.clone(), settings.pipeline.clone())
        .with_ticker_suffix(settings.provider.ticker_suffix.clone());

    match command {
        Command::Data {
            ticker,
            period,
            interval,
        } => print_result(
            toolbox
                .try_get_data(&ticker, period.as_deref(), interval.as_deref())
                .await,
        ),
        Command::Indicators { ticker, period } => {
            print_result(toolbox.try_indicators(&ticker, period.as_deref()).await)
        }
        Command::Predict { ticker, horizon } => {
            let prediction = match load_artifact(&settings.model) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            let toolbox = toolbox.with_prediction(prediction);
            print_result(toolbox.try_predict(&ticker, horizon).await)
        }
        Command::Backtest { ticker, strategy } => {
            print_result(toolbox.try_backtest(&ticker, &strategy).await)
        }
        Command::Features {
            tickers,
            period,
            output,
            scaler_output,
        } => {
            let request = FeatureExport {
                tickers: &tickers,
                period: &period,
                output: &output,
                scaler_output: scaler_output.as_deref().unwrap_or(&settings.model.scaler_path),
            };
            match run_features(provider.as_ref(), &settings, request).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    (&e).into()
                }
            }
        }
        Command::Serve => {
            let prediction = match load_artifact(&settings.model) {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("error: {e}");
                    return (&e).into();
                }
            };
            match run_serve(toolbox.with_prediction(prediction)).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {e}");
                    (&e).into()
                }
            }
        }
    }
}

/// Print a success payload, or `{"error": ..}` plus a non-zero exit code.
fn print_result<T: Serialize>(result: Result<T, PipelineError>) -> ExitCode {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{text}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
        },
        Err(e) => {
            println!("{}", serde_json::json!({ "error": e.to_string() }));
            (&e).into()
        }
    }
}

struct FeatureExport<'a> {
    tickers: &'a [String],
    period: &'a str,
    output: &'a Path,
    scaler_output: &'a Path,
}

async fn run_features(
    provider: &dyn PriceHistoryPort,
    settings: &Settings,
    request: FeatureExport<'_>,
) -> Result<(), PipelineError> {
    let period: Period = request.period.parse()?;
    let suffix = settings.provider.ticker_suffix.as_deref();
    let mut samples = Vec::new();

    for raw in request.tickers {
        let ticker = normalize_ticker(raw, suffix);
        match provider.fetch(&ticker, &period, &settings.pipeline.interval).await {
            Ok(series) => {
                let rows = build_training_set(&series);
                tracing::info!(ticker = %ticker, rows = rows.len(), "collected training rows");
                samples.extend(rows);
            }
            Err(e @ PipelineError::DataUnavailable { .. }) => {
                tracing::warn!(ticker = %ticker, error = %e, "skipping ticker");
            }
            Err(e) => return Err(e),
        }
    }

    let Some(scaler) = fit_scaler(&samples) else {
        return Err(PipelineError::DataUnavailable {
            ticker: request.tickers.join(","),
        });
    };

    create_parent(request.output)?;
    write_training_csv(fs::File::create(request.output)?, &samples)?;

    create_parent(request.scaler_output)?;
    let json = serde_json::to_string_pretty(&scaler).map_err(std::io::Error::other)?;
    fs::write(request.scaler_output, json)?;

    eprintln!(
        "Wrote {} rows to {} and scaler to {}",
        samples.len(),
        request.output.display(),
        request.scaler_output.display()
    );
    Ok(())
}

fn create_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}

/// Read requests line by line; each is handled on its own task and its
/// response written as soon as it is ready, so responses may arrive out
/// of order and are matched by `id`.
pub async fn run_serve(toolbox: Toolbox) -> Result<(), PipelineError> {
    serve_lines(
        toolbox,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
}

pub async fn serve_lines<R, W>(toolbox: Toolbox, input: R, mut output: W) -> Result<(), PipelineError>
where
    R: tokio::io::AsyncBufRead + Unpin,
    W: tokio::io::AsyncWrite + Unpin,
{
    let toolbox = Arc::new(toolbox);
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let mut lines = input.lines();
    tracing::info!("serving tool requests on stdin");

    let reader = async {
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let toolbox = Arc::clone(&toolbox);
            let tx = tx.clone();
            tokio::spawn(async move {
                let response = toolbox.handle_line(&line).await;
                let _ = tx.send(response);
            });
        }
        drop(tx);
        Ok::<(), std::io::Error>(())
    };

    let writer = async {
        while let Some(response) = rx.recv().await {
            output.write_all(response.as_bytes()).await?;
            output.write_all(b"\n").await?;
            output.flush().await?;
        }
        Ok::<(), std::io::Error>(())
    };

    let (read, write) = tokio::join!(reader, writer);
    read?;
    write?;
    tracing::info!("input closed, shutting down");
    Ok(())
}
