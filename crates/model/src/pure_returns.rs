//! Cross-sectional "pure return" regression of forward returns on characteristics.

use meridian_math::{Pca, RobustScaler, prune_by_vif, ridge, stats};
use meridian_primitives::CoefficientSeries;
use meridian_traits::{CoefficientEstimator, EstimatorError};
use meridian_utils::{numeric_column, numeric_column_names, numeric_matrix};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use rand::{SeedableRng, rngs::StdRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Configuration for [`PureReturnsEstimator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressorConfig {
    /// Columns are pruned until every variance inflation factor is below this.
    pub vif_threshold: f64,
    /// Regress on principal components instead of scaled features.
    pub use_pca: bool,
    /// Cumulative explained variance retained by the PCA step.
    pub pca_variance_threshold: f64,
    /// Ridge penalty.
    pub ridge_alpha: f64,
    /// Minimum rows with a valid target.
    pub min_samples: usize,
    /// Coefficients are clipped to `[-bound, bound]`.
    pub coefficient_bound: f64,
    /// Non-negative columns whose 75th percentile exceeds this are log-transformed.
    pub skew_threshold: f64,
    /// Columns with sample variance below this receive jitter.
    pub jitter_variance: f64,
    /// Standard deviation of the jitter.
    pub jitter_std: f64,
    /// Floor applied to feature scales when un-scaling coefficients.
    pub scale_floor: f64,
    /// Seed for the jitter; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for RegressorConfig {
    fn default() -> Self {
        Self {
            vif_threshold: 5.0,
            use_pca: true,
            pca_variance_threshold: 0.95,
            ridge_alpha: 1.0,
            min_samples: 20,
            coefficient_bound: 10.0,
            skew_threshold: 1000.0,
            jitter_variance: 1e-8,
            // jittered variance lands on the VIF floor; survival depends on the draw
            jitter_std: 1e-4,
            scale_floor: 1e-8,
            seed: None,
        }
    }
}

/// Ridge-based cross-sectional regressor producing one coefficient per characteristic.
#[derive(Debug, Clone, Default)]
pub struct PureReturnsEstimator {
    config: RegressorConfig,
}

impl PureReturnsEstimator {
    /// Create a new estimator with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new estimator with custom configuration.
    #[must_use]
    pub const fn with_config(config: RegressorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &RegressorConfig {
        &self.config
    }

    /// Fit coefficients from a dense characteristic matrix.
    ///
    /// # Arguments
    /// * `x` - Characteristic matrix (n_assets x n_characteristics), NaN for missing
    /// * `y` - Forward-return target (n_assets,), NaN for missing
    /// * `names` - Characteristic names, one per column of `x`
    ///
    /// # Returns
    /// Coefficients for the characteristics that survive preprocessing, in
    /// column order.
    ///
    /// # Errors
    /// Returns `ModelError` if fewer than `min_samples` rows have a target, no
    /// characteristic survives, or the regression degenerates.
    pub fn fit(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        names: &[String],
    ) -> Result<CoefficientSeries, ModelError> {
        if x.ncols() != names.len() {
            return Err(ModelError::DimensionMismatch(format!(
                "{} characteristic columns for {} names",
                x.ncols(),
                names.len()
            )));
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch(format!(
                "{} characteristic rows for {} targets",
                x.nrows(),
                y.len()
            )));
        }

        let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i].is_finite()).collect();
        if rows.len() < self.config.min_samples {
            return Err(EstimatorError::InsufficientData {
                required: self.config.min_samples,
                actual: rows.len(),
            }
            .into());
        }
        if names.is_empty() {
            return Err(EstimatorError::NoCharacteristics.into());
        }

        let target = y.select(Axis(0), &rows);
        let (features, kept_names) = self.prepare(&x.select(Axis(0), &rows), names)?;

        let keep = prune_by_vif(&features, self.config.vif_threshold);
        if keep.is_empty() {
            return Err(EstimatorError::NoCharacteristics.into());
        }
        let features = features.select(Axis(1), &keep);
        let kept_names: Vec<String> = keep.iter().map(|&j| kept_names[j].clone()).collect();
        tracing::debug!(kept = kept_names.len(), of = names.len(), "characteristics after VIF pruning");

        let (scaler, scaled) = RobustScaler::fit_transform(&features)?;
        let coefficients = if self.config.use_pca {
            let pca = Pca::fit(&scaled, self.config.pca_variance_threshold)?;
            let scores = pca.transform(&scaled)?;
            let (gamma, _) = ridge(&target, &scores, self.config.ridge_alpha)?;
            pca.inverse_transform(&gamma)?
        } else {
            ridge(&target, &scaled, self.config.ridge_alpha)?.0
        };

        let bound = self.config.coefficient_bound;
        let values: Vec<f64> = coefficients
            .iter()
            .zip(scaler.scale())
            .map(|(c, s)| (c / s.max(self.config.scale_floor)).clamp(-bound, bound))
            .collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(EstimatorError::Degenerate("non-finite coefficient".to_string()).into());
        }

        Ok(CoefficientSeries::from_parts(&kept_names, &values))
    }

    /// Median-impute, log-transform skewed columns, and jitter near-constant ones.
    ///
    /// Columns with no observed value are dropped.
    fn prepare(
        &self,
        x: &Array2<f64>,
        names: &[String],
    ) -> Result<(Array2<f64>, Vec<String>), ModelError> {
        let mut rng = self.config.seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        let jitter = Normal::new(0.0, self.config.jitter_std)
            .map_err(|e| ModelError::InvalidConfig(format!("jitter_std: {e}")))?;

        let mut columns: Vec<Vec<f64>> = Vec::with_capacity(names.len());
        let mut kept = Vec::with_capacity(names.len());
        for (j, name) in names.iter().enumerate() {
            let column = x.column(j);
            let observed: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
            if observed.is_empty() {
                tracing::debug!(characteristic = %name, "dropping characteristic with no observations");
                continue;
            }
            let fill = stats::median(&observed)?;
            let mut values: Vec<f64> =
                column.iter().map(|&v| if v.is_finite() { v } else { fill }).collect();

            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            if min >= 0.0 && stats::quantile(&values, 0.75)? > self.config.skew_threshold {
                values.iter_mut().for_each(|v| *v = v.ln_1p());
            }
            if stats::variance(&values, 1) < self.config.jitter_variance {
                values.iter_mut().for_each(|v| *v += jitter.sample(&mut rng));
            }

            columns.push(values);
            kept.push(name.clone());
        }

        if columns.is_empty() {
            return Err(EstimatorError::NoCharacteristics.into());
        }
        let matrix = Array2::from_shape_fn((x.nrows(), columns.len()), |(i, j)| columns[j][i]);
        Ok((matrix, kept))
    }

    fn fit_table(
        &self,
        table: &DataFrame,
        characteristics: &[String],
        target: &str,
    ) -> Result<CoefficientSeries, ModelError> {
        if table.height() == 0 {
            return Err(EstimatorError::InsufficientData { required: self.config.min_samples, actual: 0 }.into());
        }
        let y = Array1::from_iter(numeric_column(table, target)?.into_iter().map(|v| v.unwrap_or(f64::NAN)));

        let numeric = numeric_column_names(table);
        let usable: Vec<String> =
            characteristics.iter().filter(|c| numeric.contains(c)).cloned().collect();
        let x = numeric_matrix(table, &usable)?;

        self.fit(&x, &y, &usable)
    }
}

impl CoefficientEstimator for PureReturnsEstimator {
    fn try_estimate(
        &self,
        table: &DataFrame,
        characteristics: &[String],
        target: &str,
    ) -> Result<CoefficientSeries, EstimatorError> {
        self.fit_table(table, characteristics, target).map_err(EstimatorError::from)
    }

    fn estimate(&self, table: &DataFrame, characteristics: &[String], target: &str) -> CoefficientSeries {
        match self.try_estimate(table, characteristics, target) {
            Ok(coefficients) => coefficients,
            Err(e) if e.is_recoverable() => {
                tracing::warn!(target_column = target, "pure returns skipped: {e}");
                CoefficientSeries::empty()
            }
            Err(e) => {
                tracing::error!(target_column = target, "pure returns regression failed: {e}");
                CoefficientSeries::empty()
            }
        }
    }

    fn name(&self) -> &str {
        "PureReturns"
    }
}
