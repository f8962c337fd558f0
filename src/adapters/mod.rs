//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;

use std::sync::Arc;

use crate::domain::error::PipelineError;
use crate::domain::settings::{ProviderKind, ProviderSettings};
use crate::ports::price_history_port::PriceHistoryPort;

/// Build the configured price history provider.
pub fn price_history_provider(
    settings: &ProviderSettings,
) -> Result<Arc<dyn PriceHistoryPort>, PipelineError> {
    match settings.kind {
        ProviderKind::Csv => {
            let dir = settings.data_dir.clone().ok_or_else(|| PipelineError::ConfigInvalid {
                section: "provider".into(),
                key: "data_dir".into(),
                reason: "data_dir is required for the csv provider".into(),
            })?;
            Ok(Arc::new(csv_adapter::CsvAdapter::new(dir)))
        }
        #[cfg(feature = "yahoo")]
        ProviderKind::Yahoo => Ok(Arc::new(yahoo_adapter::YahooAdapter::new(
            settings.timeout_secs,
        )?)),
        #[cfg(not(feature = "yahoo"))]
        ProviderKind::Yahoo => Err(PipelineError::ConfigInvalid {
            section: "provider".into(),
            key: "kind".into(),
            reason: "built without the yahoo feature".into(),
        }),
    }
}
