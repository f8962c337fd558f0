//! Domain error types.

/// Top-level error type for stockpulse.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("No data for ticker {ticker}")]
    DataUnavailable { ticker: String },

    #[error("provider error for {ticker}: {reason}")]
    Provider { ticker: String, reason: String },

    #[error("incomplete features: {} unavailable", missing.join(", "))]
    IncompleteFeatures { missing: Vec<&'static str> },

    #[error("failed to load model artifact {path}: {reason}")]
    ArtifactLoad { path: String, reason: String },

    #[error("model artifact expects {found} features, pipeline produces {expected}")]
    FeatureCountMismatch { expected: usize, found: usize },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error("invalid period: {value}")]
    InvalidPeriod { value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PipelineError> for std::process::ExitCode {
    fn from(err: &PipelineError) -> Self {
        let code: u8 = match err {
            PipelineError::Io(_) => 1,
            PipelineError::ConfigParse { .. } | PipelineError::ConfigInvalid { .. } => 2,
            PipelineError::ArtifactLoad { .. } | PipelineError::FeatureCountMismatch { .. } => 3,
            PipelineError::UnknownStrategy { .. } | PipelineError::InvalidPeriod { .. } => 4,
            PipelineError::DataUnavailable { .. }
            | PipelineError::Provider { .. }
            | PipelineError::IncompleteFeatures { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
