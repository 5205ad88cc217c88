//! Error types for covariance estimation.

use meridian_math::MathError;
use meridian_traits::EstimatorError;

/// Errors that can occur while building a risk view.
#[derive(Debug, thiserror::Error)]
pub enum CovarianceError {
    /// Too few usable assets or periods in the window.
    #[error("insufficient data: need at least {required}, got {actual}")]
    InsufficientData {
        /// Required count.
        required: usize,
        /// Actual count.
        actual: usize,
    },

    /// The estimate carries no variance.
    #[error("degenerate covariance: {0}")]
    Degenerate(String),

    /// Estimator error.
    #[error("estimator error: {0}")]
    Estimator(#[from] EstimatorError),

    /// Math error.
    #[error("math error: {0}")]
    Math(#[from] MathError),
}

impl CovarianceError {
    /// Returns whether this error signals missing data rather than a fault.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::InsufficientData { .. } => true,
            Self::Estimator(e) => e.is_recoverable(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = CovarianceError::InsufficientData { required: 2, actual: 1 };
        assert!(err.to_string().contains("need at least 2"));
    }

    #[test]
    fn error_is_recoverable() {
        assert!(CovarianceError::InsufficientData { required: 2, actual: 0 }.is_recoverable());
        assert!(!CovarianceError::Math(MathError::Singular).is_recoverable());
        assert!(!CovarianceError::Degenerate("zero trace".to_string()).is_recoverable());
    }
}
