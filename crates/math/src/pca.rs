//! Principal component analysis retaining a target share of variance.

use ndarray::{Array1, Array2, Axis, s};
use serde::{Deserialize, Serialize};

use crate::{MathError, SymmetricEigen};

/// Fitted principal components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pca {
    mean: Array1<f64>,
    /// Retained components as rows (`k x p`).
    components: Array2<f64>,
    explained_variance_ratio: Array1<f64>,
}

impl Pca {
    /// Fit on `x` (`n x p`), keeping the fewest leading components whose
    /// cumulative explained-variance ratio reaches `variance_threshold`.
    ///
    /// # Errors
    /// Returns error if `x` has fewer than two rows, no columns, the
    /// threshold is outside `(0, 1]`, or the data has no variance.
    pub fn fit(x: &Array2<f64>, variance_threshold: f64) -> Result<Self, MathError> {
        let (n, p) = x.dim();
        if n < 2 {
            return Err(MathError::InsufficientData { required: 2, actual: n });
        }
        if p == 0 {
            return Err(MathError::EmptyData);
        }
        if !(variance_threshold > 0.0 && variance_threshold <= 1.0) {
            return Err(MathError::InvalidQuantile(variance_threshold));
        }

        let mean = x.mean_axis(Axis(0)).ok_or(MathError::EmptyData)?;
        let centered = x - &mean.view().insert_axis(Axis(0));
        let covariance = centered.t().dot(&centered) / (n - 1) as f64;

        let eigen = SymmetricEigen::new(&covariance)?;
        let variances = eigen.values.mapv(|v| v.max(0.0));
        let total: f64 = variances.sum();
        if total <= 0.0 {
            return Err(MathError::NumericalInstability("data has zero variance".to_string()));
        }
        let ratio = variances / total;

        let mut cumulative = 0.0;
        let mut below = 0;
        for r in &ratio {
            cumulative += r;
            if cumulative <= variance_threshold {
                below += 1;
            } else {
                break;
            }
        }
        let k = (below + 1).min(p);

        let components = eigen.vectors.slice(s![.., ..k]).t().to_owned();
        Ok(Self { mean, components, explained_variance_ratio: ratio })
    }

    /// Project `x` onto the retained components.
    ///
    /// # Errors
    /// Returns error if `x` has the wrong number of columns.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, MathError> {
        if x.ncols() != self.mean.len() {
            return Err(MathError::DimensionMismatch { expected: self.mean.len(), actual: x.ncols() });
        }
        let centered = x - &self.mean.view().insert_axis(Axis(0));
        Ok(centered.dot(&self.components.t()))
    }

    /// Map a point in component space back to feature space: `z · C + mean`.
    ///
    /// # Errors
    /// Returns error if `scores` does not have one entry per component.
    pub fn inverse_transform(&self, scores: &Array1<f64>) -> Result<Array1<f64>, MathError> {
        if scores.len() != self.n_components() {
            return Err(MathError::DimensionMismatch { expected: self.n_components(), actual: scores.len() });
        }
        Ok(scores.dot(&self.components) + &self.mean)
    }

    /// Number of retained components.
    #[must_use]
    pub fn n_components(&self) -> usize {
        self.components.nrows()
    }

    /// Column means of the fitted data.
    #[must_use]
    pub const fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Retained components as rows.
    #[must_use]
    pub const fn components(&self) -> &Array2<f64> {
        &self.components
    }

    /// Explained-variance ratio of every component, descending.
    #[must_use]
    pub const fn explained_variance_ratio(&self) -> &Array1<f64> {
        &self.explained_variance_ratio
    }
}
