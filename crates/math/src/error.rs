//! Error types for mathematical operations.

/// Errors that can occur during mathematical operations.
#[derive(Debug, thiserror::Error)]
pub enum MathError {
    /// Invalid quantile value.
    #[error("invalid quantile: {0} (must be in [0, 1])")]
    InvalidQuantile(f64),

    /// Dimension mismatch.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Singular or nearly singular matrix.
    #[error("matrix is singular or nearly singular")]
    Singular,

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),

    /// Empty data.
    #[error("empty data provided")]
    EmptyData,

    /// Too few observations for the requested statistic.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Numerical instability (NaN or Inf).
    #[error("numerical instability: {0}")]
    NumericalInstability(String),
}

impl MathError {
    /// Whether the error stems from degenerate numerics rather than bad input shapes.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Singular | Self::NumericalInstability(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = MathError::InvalidQuantile(1.5);
        assert!(err.to_string().contains("1.5"));

        let err = MathError::DimensionMismatch { expected: 10, actual: 5 };
        assert!(err.to_string().contains("10") && err.to_string().contains('5'));
    }

    #[test]
    fn degenerate_classification() {
        assert!(MathError::Singular.is_degenerate());
        assert!(!MathError::EmptyData.is_degenerate());
    }
}
