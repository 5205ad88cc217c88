//! Universe-indexed risk views built from return panels.

use meridian_math::try_nearest_psd;
use meridian_primitives::{ReturnPanel, Symbol, TRADING_DAYS_PER_YEAR};
use meridian_traits::CovarianceEstimator;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::{CovarianceError, LedoitWolfEstimator};

/// Configuration for [`RiskModel`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RiskConfig {
    /// Number of most recent periods used for estimation.
    pub window: usize,
    /// Periods per year used to annualise the covariance.
    pub annualization: f64,
    /// Volatilities below this are treated as 1 when normalising to correlation.
    pub vol_floor: f64,
    /// Eigenvalue floor for the PSD projection of the correlation matrix.
    pub eigen_floor: f64,
    /// Minimum number of assets with data in the window.
    pub min_assets: usize,
    /// Total variance below which the estimate is considered degenerate.
    pub min_total_variance: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            window: 90,
            annualization: TRADING_DAYS_PER_YEAR,
            vol_floor: 1e-8,
            eigen_floor: meridian_math::DEFAULT_EIGEN_FLOOR,
            min_assets: 2,
            min_total_variance: 1e-16,
        }
    }
}

/// Annualised covariance and PSD correlation over an asset universe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskView {
    symbols: Vec<Symbol>,
    correlation: Array2<f64>,
    covariance: Array2<f64>,
    fallback: bool,
}

impl RiskView {
    /// Identity correlation and covariance over `symbols`.
    #[must_use]
    pub fn identity(symbols: &[Symbol]) -> Self {
        let n = symbols.len();
        Self {
            symbols: symbols.to_vec(),
            correlation: Array2::eye(n),
            covariance: Array2::eye(n),
            fallback: true,
        }
    }

    /// Universe the matrices are indexed by.
    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// PSD correlation matrix.
    #[must_use]
    pub const fn correlation(&self) -> &Array2<f64> {
        &self.correlation
    }

    /// Annualised covariance matrix.
    #[must_use]
    pub const fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    /// Whether this view is the identity substitute for a failed estimate.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fallback
    }

    /// Covariance restricted to `symbols`, in that order.
    ///
    /// Symbols outside the universe get unit variance and zero covariance.
    #[must_use]
    pub fn covariance_of(&self, symbols: &[Symbol]) -> Array2<f64> {
        let positions: Vec<Option<usize>> =
            symbols.iter().map(|s| self.symbols.iter().position(|u| u == s)).collect();
        let n = symbols.len();
        Array2::from_shape_fn((n, n), |(i, j)| match (positions[i], positions[j]) {
            (Some(a), Some(b)) => self.covariance[[a, b]],
            _ if i == j => 1.0,
            _ => 0.0,
        })
    }
}

/// Estimates a [`RiskView`] from a return panel.
#[derive(Debug, Clone)]
pub struct RiskModel<E = LedoitWolfEstimator> {
    config: RiskConfig,
    estimator: E,
}

impl RiskModel {
    /// Create a new model with default configuration and Ledoit-Wolf shrinkage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RiskConfig::default())
    }

    /// Create a new model with custom configuration and Ledoit-Wolf shrinkage.
    #[must_use]
    pub fn with_config(config: RiskConfig) -> Self {
        Self { config, estimator: LedoitWolfEstimator::default() }
    }
}

impl Default for RiskModel {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CovarianceEstimator> RiskModel<E> {
    /// Create a model around a custom covariance estimator.
    #[must_use]
    pub const fn with_estimator(config: RiskConfig, estimator: E) -> Self {
        Self { config, estimator }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Estimate the risk view, reporting failures.
    ///
    /// The most recent `window` rows of the universe's columns are used; columns
    /// with no data in the window are dropped and remaining gaps are zero-filled.
    /// The estimate is annualised, normalised to correlation, re-embedded into
    /// `universe` (absent assets get unit variance), and the correlation is
    /// projected onto the PSD cone.
    ///
    /// # Errors
    /// Returns `CovarianceError` if fewer than `min_assets` assets have data, the
    /// estimator fails, or the estimate carries no variance.
    pub fn try_estimate(
        &self,
        panel: &ReturnPanel,
        universe: &[Symbol],
    ) -> Result<RiskView, CovarianceError> {
        let window = panel
            .select(universe)
            .tail(self.config.window)
            .drop_empty_columns()
            .fill_missing(0.0);

        let n_valid = window.n_assets();
        if n_valid < self.config.min_assets {
            return Err(CovarianceError::InsufficientData {
                required: self.config.min_assets,
                actual: n_valid,
            });
        }

        let covariance = self.estimator.estimate(window.values())? * self.config.annualization;
        let total_variance = covariance.diag().sum();
        if !total_variance.is_finite() || total_variance < self.config.min_total_variance {
            return Err(CovarianceError::Degenerate(format!(
                "total variance {total_variance:.3e} across {n_valid} assets"
            )));
        }

        let vols = covariance
            .diag()
            .mapv(|v| if v.sqrt() < self.config.vol_floor { 1.0 } else { v.sqrt() });
        let correlation = Array2::from_shape_fn((n_valid, n_valid), |(i, j)| {
            covariance[[i, j]] / (vols[i] * vols[j])
        });

        let n = universe.len();
        let positions: Vec<Option<usize>> =
            universe.iter().map(|s| window.position(s)).collect();
        let mut full_corr = Array2::eye(n);
        let mut full_cov = Array2::eye(n);
        for (i, pi) in positions.iter().enumerate() {
            for (j, pj) in positions.iter().enumerate() {
                if let (Some(a), Some(b)) = (pi, pj) {
                    full_corr[[i, j]] = correlation[[*a, *b]];
                    full_cov[[i, j]] = covariance[[*a, *b]];
                }
            }
        }

        let full_corr = try_nearest_psd(&full_corr, self.config.eigen_floor)?;
        tracing::debug!(
            estimator = self.estimator.name(),
            assets = n_valid,
            universe = n,
            periods = window.n_dates(),
            "estimated risk view"
        );

        Ok(RiskView { symbols: universe.to_vec(), correlation: full_corr, covariance: full_cov, fallback: false })
    }

    /// Estimate the risk view, substituting identity matrices on any failure.
    #[must_use]
    pub fn estimate(&self, panel: &ReturnPanel, universe: &[Symbol]) -> RiskView {
        self.try_estimate(panel, universe).unwrap_or_else(|e| {
            tracing::warn!(estimator = self.estimator.name(), "covariance estimation failed: {e}; using identity");
            RiskView::identity(universe)
        })
    }
}
