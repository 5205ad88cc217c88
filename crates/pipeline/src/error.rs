//! Error types for pipeline runs.

use meridian_model::ModelError;
use meridian_utils::UtilsError;

/// Errors raised while loading configuration or reading the asset table.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Table helper error.
    #[error("table error: {0}")]
    Utils(#[from] UtilsError),

    /// Model error.
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
