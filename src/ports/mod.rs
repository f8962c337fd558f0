//! Port traits for the pipeline's external collaborators.

pub mod config_port;
pub mod price_history_port;
