//! Factor-mimicking portfolios.

use std::collections::BTreeSet;

use meridian_math::{invert, ols, simple_regression, try_nearest_psd};
use meridian_primitives::{Date, PortfolioWeights, ReturnPanel, ReturnSeries, common_dates};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::PortfolioError;

/// Configuration for [`FmpBuilder`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FmpConfig {
    /// Minimum overlapping observations between assets and factors.
    pub min_observations: usize,
    /// `BᵀΩ⁻¹B` below this is treated as zero exposure.
    pub denominator_floor: f64,
    /// Eigenvalue floor for the PSD correction before inversion.
    pub eigen_floor: f64,
}

impl Default for FmpConfig {
    fn default() -> Self {
        Self { min_observations: 2, denominator_floor: 1e-9, eigen_floor: meridian_math::DEFAULT_EIGEN_FLOOR }
    }
}

/// Builds minimum-variance portfolios with unit exposure to a factor.
///
/// Weights are `Ω⁻¹B / (BᵀΩ⁻¹B)` scaled to unit gross exposure, where `B`
/// holds each asset's beta to the (optionally orthogonalised) factor.
#[derive(Debug, Clone, Default)]
pub struct FmpBuilder {
    config: FmpConfig,
}

impl FmpBuilder {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    #[must_use]
    pub const fn with_config(config: FmpConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &FmpConfig {
        &self.config
    }

    /// Build the factor-mimicking portfolio.
    ///
    /// # Arguments
    /// * `returns` - Asset returns; columns must match the covariance order
    /// * `factor` - Return series of the factor to mimic
    /// * `covariance` - Asset covariance (n_assets x n_assets)
    /// * `existing` - Factors to orthogonalise against; may be empty
    ///
    /// # Errors
    /// Returns error on too little overlap, mismatched dimensions, a singular
    /// covariance, a constant factor, or zero factor exposure.
    pub fn try_build(
        &self,
        returns: &ReturnPanel,
        factor: &ReturnSeries,
        covariance: &Array2<f64>,
        existing: &[ReturnSeries],
    ) -> Result<PortfolioWeights, PortfolioError> {
        let n = returns.n_assets();
        if n == 0 {
            return Err(PortfolioError::InsufficientData { required: 1, actual: 0 });
        }
        if covariance.dim() != (n, n) {
            return Err(PortfolioError::DimensionMismatch { expected: n, actual: covariance.nrows() });
        }
        let precision = invert(&try_nearest_psd(covariance, self.config.eigen_floor)?)?;

        let panel_dates: BTreeSet<&Date> = returns.dates().iter().collect();
        let mut dates = common_dates(std::iter::once(factor).chain(existing));
        dates.retain(|d| panel_dates.contains(d));
        if dates.len() < self.config.min_observations {
            return Err(PortfolioError::InsufficientData {
                required: self.config.min_observations,
                actual: dates.len(),
            });
        }

        let aligned = returns.restrict_to(&dates).fill_missing(0.0);
        let values_on = |s: &ReturnSeries| -> Vec<f64> {
            dates.iter().map(|d| s.get(*d).unwrap_or(0.0)).collect()
        };

        let target = values_on(factor);
        let factor_values = if existing.is_empty() {
            target
        } else {
            let columns: Vec<Vec<f64>> = existing.iter().map(values_on).collect();
            let design = Array2::from_shape_fn((dates.len(), existing.len()), |(i, k)| columns[k][i]);
            ols(&Array1::from(target), &design)?.residuals.to_vec()
        };

        let betas = aligned
            .values()
            .columns()
            .into_iter()
            .map(|column| simple_regression(&factor_values, &column.to_vec()).map(|(slope, _)| slope))
            .collect::<Result<Array1<f64>, _>>()?;

        let scaled = precision.dot(&betas);
        let exposure = betas.dot(&scaled);
        if exposure < self.config.denominator_floor {
            return Err(PortfolioError::Degenerate(format!("factor exposure {exposure:.3e}")));
        }

        let weights = scaled / exposure;
        let gross: f64 = weights.iter().map(|w| w.abs()).sum();
        if !gross.is_finite() || gross <= f64::EPSILON {
            return Err(PortfolioError::Degenerate(format!("gross exposure {gross:.3e}")));
        }

        tracing::debug!(assets = n, observations = dates.len(), exposure, "factor-mimicking portfolio built");
        Ok(PortfolioWeights::new(aligned.symbols().to_vec(), weights / gross))
    }

    /// Total variant of [`Self::try_build`]: failures yield equal weights.
    #[must_use]
    pub fn build(
        &self,
        returns: &ReturnPanel,
        factor: &ReturnSeries,
        covariance: &Array2<f64>,
        existing: &[ReturnSeries],
    ) -> PortfolioWeights {
        self.try_build(returns, factor, covariance, existing).unwrap_or_else(|e| {
            tracing::warn!("FMP construction failed: {e}; using equal weights");
            PortfolioWeights::equal(returns.symbols().to_vec())
        })
    }
}
