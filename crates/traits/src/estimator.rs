//! Estimation trait definitions.

use meridian_primitives::CoefficientSeries;
use ndarray::Array2;
use polars::prelude::*;

/// Errors that can occur during estimation.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// Dimension mismatch in input data.
    #[error("dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
        /// Context description.
        context: String,
    },

    /// Insufficient data for estimation.
    #[error("insufficient data: need at least {required} observations, got {actual}")]
    InsufficientData {
        /// Required number of observations.
        required: usize,
        /// Actual number of observations.
        actual: usize,
    },

    /// Numerically degenerate input (zero variance, singular matrix).
    #[error("degenerate input: {0}")]
    Degenerate(String),

    /// No characteristic survived preprocessing.
    #[error("no usable characteristics remain")]
    NoCharacteristics,

    /// Polars error.
    #[error("data processing error: {0}")]
    Polars(#[from] PolarsError),

    /// Missing required column.
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Linear algebra error.
    #[error("linear algebra error: {0}")]
    LinearAlgebra(String),
}

impl EstimatorError {
    /// Returns whether this error signals missing data rather than a fault.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. } | Self::NoCharacteristics | Self::MissingColumn(_)
        )
    }
}

/// Estimates a covariance matrix from a return window.
pub trait CovarianceEstimator: Send + Sync {
    /// Estimate the per-period covariance of the columns of `returns`.
    ///
    /// # Arguments
    /// * `returns` - Gap-free return matrix (n_periods x n_assets)
    ///
    /// # Returns
    /// Symmetric covariance matrix (n_assets x n_assets), not annualised.
    ///
    /// # Errors
    /// Returns `EstimatorError` if there are too few periods or the estimate degenerates.
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, EstimatorError>;

    /// Returns the name of this estimator.
    fn name(&self) -> &str;
}

/// Estimates per-characteristic cross-sectional coefficients ("pure returns").
pub trait CoefficientEstimator: Send + Sync {
    /// Regress `target` on `characteristics` across the rows of `table`.
    ///
    /// # Arguments
    /// * `table` - Asset table with one row per asset
    /// * `characteristics` - Candidate characteristic columns
    /// * `target` - Forward-return column
    ///
    /// # Returns
    /// One coefficient per surviving characteristic.
    ///
    /// # Errors
    /// Returns `EstimatorError` when the regression cannot be fitted.
    fn try_estimate(
        &self,
        table: &DataFrame,
        characteristics: &[String],
        target: &str,
    ) -> Result<CoefficientSeries, EstimatorError>;

    /// Total variant of [`Self::try_estimate`]: failures yield an empty series.
    fn estimate(&self, table: &DataFrame, characteristics: &[String], target: &str) -> CoefficientSeries {
        self.try_estimate(table, characteristics, target).unwrap_or_default()
    }

    /// Returns the name of this estimator.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimator_error_is_recoverable() {
        let err = EstimatorError::InsufficientData { required: 20, actual: 5 };
        assert!(err.is_recoverable());

        let err = EstimatorError::LinearAlgebra("singular".to_string());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn estimator_error_display() {
        let err = EstimatorError::DimensionMismatch {
            expected: 100,
            actual: 50,
            context: "returns".to_string(),
        };
        assert_eq!(err.to_string(), "dimension mismatch for returns: expected 100, got 50");
    }
}
