//! Ledoit-Wolf Shrinkage Covariance Estimator
//!
//! Implements the analytical shrinkage estimator from:
//! "A well-conditioned estimator for large-dimensional covariance matrices"
//! (Ledoit & Wolf, 2004)
//!
//! The estimate blends the sample covariance `S` toward a scaled identity:
//! Σ_LW = (1 - δ*) S + δ* μ I,  μ = trace(S) / p
//!
//! where δ* in `[0, 1]` is the asymptotically optimal shrinkage intensity.

use meridian_traits::{CovarianceEstimator, EstimatorError};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

/// Ledoit-Wolf covariance estimator configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LedoitWolfConfig {
    /// Minimum number of observations required (default: 2).
    pub min_observations: usize,
    /// Whether to center returns before computing covariance (default: true).
    pub center: bool,
}

impl Default for LedoitWolfConfig {
    fn default() -> Self {
        Self { min_observations: 2, center: true }
    }
}

/// Ledoit-Wolf shrinkage covariance estimator.
#[derive(Debug, Clone, Default)]
pub struct LedoitWolfEstimator {
    config: LedoitWolfConfig,
}

impl LedoitWolfEstimator {
    /// Create a new estimator with the given configuration.
    #[must_use]
    pub const fn new(config: LedoitWolfConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &LedoitWolfConfig {
        &self.config
    }

    fn prepared(&self, returns: &Array2<f64>) -> Result<Array2<f64>, EstimatorError> {
        let n_periods = returns.nrows();
        if n_periods < self.config.min_observations.max(1) {
            return Err(EstimatorError::InsufficientData {
                required: self.config.min_observations.max(1),
                actual: n_periods,
            });
        }
        if returns.ncols() == 0 {
            return Err(EstimatorError::InsufficientData { required: 1, actual: 0 });
        }
        if returns.iter().any(|v| !v.is_finite()) {
            return Err(EstimatorError::Degenerate("non-finite return in window".to_string()));
        }

        if self.config.center {
            let means = returns
                .mean_axis(Axis(0))
                .ok_or(EstimatorError::InsufficientData { required: 1, actual: 0 })?;
            Ok(returns - &means.insert_axis(Axis(0)))
        } else {
            Ok(returns.clone())
        }
    }

    /// Optimal shrinkage intensity δ* for a prepared (possibly centered) window.
    fn intensity(x: &Array2<f64>) -> f64 {
        let (n_periods, n_assets) = x.dim();
        if n_assets == 1 {
            return 0.0;
        }
        let n = n_periods as f64;
        let p = n_assets as f64;

        let x2 = x.mapv(|v| v * v);
        let emp_cov_trace = x2.sum_axis(Axis(0)) / n;
        let mu = emp_cov_trace.sum() / p;

        let beta_ = x2.t().dot(&x2).sum();
        let delta_ = x.t().dot(x).mapv(|v| v * v).sum() / (n * n);

        let beta = (beta_ / n - delta_) / (p * n);
        let delta = (delta_ - 2.0 * mu * emp_cov_trace.sum() + p * mu * mu) / p;

        let beta = beta.min(delta);
        if beta == 0.0 || delta <= 0.0 { 0.0 } else { beta / delta }
    }

    /// Shrinkage intensity that [`CovarianceEstimator::estimate`] would apply.
    ///
    /// # Errors
    /// Returns `EstimatorError` if there are too few observations.
    pub fn shrinkage_intensity(&self, returns: &Array2<f64>) -> Result<f64, EstimatorError> {
        let x = self.prepared(returns)?;
        Ok(Self::intensity(&x))
    }
}

impl CovarianceEstimator for LedoitWolfEstimator {
    fn estimate(&self, returns: &Array2<f64>) -> Result<Array2<f64>, EstimatorError> {
        let x = self.prepared(returns)?;
        let (n_periods, n_assets) = x.dim();

        // S = XᵀX / n
        let sample_cov = x.t().dot(&x) / n_periods as f64;
        let mu = sample_cov.diag().sum() / n_assets as f64;
        let shrinkage = Self::intensity(&x);

        let mut shrunk = sample_cov * (1.0 - shrinkage);
        for i in 0..n_assets {
            shrunk[[i, i]] += shrinkage * mu;
        }
        Ok(shrunk)
    }

    fn name(&self) -> &str {
        "LedoitWolf"
    }
}
