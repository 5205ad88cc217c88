//! Median / interquartile-range feature scaling.

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::{MathError, stats};

/// Column-wise robust scaler: `(x - median) / IQR`.
///
/// Columns with zero interquartile range are given unit scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobustScaler {
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl RobustScaler {
    /// Fit medians and interquartile ranges for each column of `x`.
    ///
    /// # Errors
    /// Returns error if `x` has no rows.
    pub fn fit(x: &Array2<f64>) -> Result<Self, MathError> {
        if x.nrows() == 0 {
            return Err(MathError::EmptyData);
        }
        let mut center = Array1::zeros(x.ncols());
        let mut scale = Array1::ones(x.ncols());
        for (j, column) in x.axis_iter(Axis(1)).enumerate() {
            let values = column.to_vec();
            center[j] = stats::median(&values)?;
            let spread = stats::iqr(&values)?;
            if spread != 0.0 {
                scale[j] = spread;
            }
        }
        Ok(Self { center, scale })
    }

    /// Apply the fitted centering and scaling.
    ///
    /// # Errors
    /// Returns error if `x` has a different number of columns than the fit.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, MathError> {
        if x.ncols() != self.center.len() {
            return Err(MathError::DimensionMismatch {
                expected: self.center.len(),
                actual: x.ncols(),
            });
        }
        let centered = x - &self.center.view().insert_axis(Axis(0));
        Ok(centered / &self.scale.view().insert_axis(Axis(0)))
    }

    /// Fit on `x` and return the scaled data together with the scaler.
    ///
    /// # Errors
    /// Returns error if `x` has no rows.
    pub fn fit_transform(x: &Array2<f64>) -> Result<(Self, Array2<f64>), MathError> {
        let scaler = Self::fit(x)?;
        let scaled = scaler.transform(x)?;
        Ok((scaler, scaled))
    }

    /// Column medians.
    #[must_use]
    pub const fn center(&self) -> &Array1<f64> {
        &self.center
    }

    /// Column scales (never zero).
    #[must_use]
    pub const fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn scales_by_median_and_iqr() {
        let x = array![[1.0, 5.0], [2.0, 5.0], [3.0, 5.0], [4.0, 5.0], [100.0, 5.0]];
        let (scaler, scaled) = RobustScaler::fit_transform(&x).unwrap();

        assert_relative_eq!(scaler.center()[0], 3.0);
        assert_relative_eq!(scaler.scale()[0], 2.0);
        assert_relative_eq!(scaled[[4, 0]], 48.5);

        // constant column keeps unit scale
        assert_relative_eq!(scaler.scale()[1], 1.0);
        assert!(scaled.column(1).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn transform_rejects_wrong_width() {
        let scaler = RobustScaler::fit(&array![[1.0, 2.0], [3.0, 4.0]]).unwrap();
        assert!(scaler.transform(&array![[1.0]]).is_err());
    }
}
