//! stockpulse: technical indicators, next-close prediction and moving-average
//! backtests over daily equity price history.
//!
//! Hexagonal architecture: the numerical pipeline lives in [`domain`], port
//! traits in [`ports`], concrete implementations in [`adapters`]. [`tools`]
//! is the structured-result surface consumed by an orchestration layer.

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;
pub mod tools;
