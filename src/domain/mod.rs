//! Core domain types and the numerical pipeline.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod features;
pub mod indicator;
pub mod indicator_set;
pub mod model;
pub mod ohlcv;
pub mod period;
pub mod prediction;
pub mod settings;
pub mod ticker;
pub mod training;
