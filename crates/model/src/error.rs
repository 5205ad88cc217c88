//! Error types for characteristic modelling.

use meridian_math::MathError;
use meridian_traits::EstimatorError;
use meridian_utils::UtilsError;

/// Errors that can occur during regression, stability analysis, or scoring.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),

    /// Table helper error.
    #[error("table error: {0}")]
    Utils(#[from] UtilsError),

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Dimension mismatch.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
}

impl ModelError {
    /// Returns whether this error signals missing data rather than a fault.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Estimator(e) => e.is_recoverable(),
            Self::MissingColumn(_) => true,
            _ => false,
        }
    }
}

impl From<ModelError> for EstimatorError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Estimator(e) => e,
            ModelError::Polars(e) | ModelError::Utils(UtilsError::Polars(e)) => Self::Polars(e),
            ModelError::MissingColumn(c) | ModelError::Utils(UtilsError::MissingColumn(c)) => {
                Self::MissingColumn(c)
            }
            ModelError::Math(MathError::InsufficientData { required, actual }) => {
                Self::InsufficientData { required, actual }
            }
            ModelError::Math(e) if e.is_degenerate() => Self::Degenerate(e.to_string()),
            ModelError::Math(e) => Self::LinearAlgebra(e.to_string()),
            ModelError::InvalidConfig(msg) | ModelError::Utils(UtilsError::InvalidParameter(msg)) => {
                Self::InvalidConfig(msg)
            }
            ModelError::DimensionMismatch(msg) => {
                Self::DimensionMismatch { expected: 0, actual: 0, context: msg }
            }
        }
    }
}
