//! Error types for portfolio construction.

use meridian_math::MathError;
use meridian_traits::SolverError;

/// Errors that can occur while building a portfolio.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    /// Too few assets or overlapping observations.
    #[error("insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Required count.
        required: usize,
        /// Actual count.
        actual: usize,
    },

    /// Dimension mismatch between returns and a supplied matrix or vector.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// The mode needs an input that was not supplied.
    #[error("missing input for {mode}: {input}")]
    MissingInput {
        /// Optimisation mode.
        mode: String,
        /// Name of the missing input.
        input: String,
    },

    /// Numerically degenerate result (zero exposure, weights summing to zero).
    #[error("degenerate portfolio: {0}")]
    Degenerate(String),

    /// Convex solver failure.
    #[error("solver error: {0}")]
    Solver(#[from] SolverError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),
}

impl PortfolioError {
    /// Returns whether this error signals missing data rather than a fault.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::MissingInput { .. })
    }
}
