//! Error types for diagnostics.

use meridian_math::MathError;

/// Errors that can occur while computing diagnostics.
#[derive(Debug, thiserror::Error)]
pub enum DiagnosticsError {
    /// Too few observations or overlapping points.
    #[error("insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Required count.
        required: usize,
        /// Actual count.
        actual: usize,
    },

    /// Dimension mismatch between returns and covariance.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),
}

impl DiagnosticsError {
    /// Returns whether this error signals missing data rather than a fault.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}
