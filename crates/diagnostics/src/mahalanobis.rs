//! Mahalanobis distances and their calibration variance.

use meridian_math::{DEFAULT_EIGEN_FLOOR, invert, stats, try_nearest_psd};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::DiagnosticsError;

/// Per-period distances and MALV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MahalanobisResult {
    /// Population variance of the squared distances; NaN when undefined.
    pub malv: f64,
    /// Distance of each period's return vector.
    pub distances: Vec<f64>,
}

impl MahalanobisResult {
    /// The undefined result.
    #[must_use]
    pub const fn undefined() -> Self {
        Self { malv: f64::NAN, distances: Vec::new() }
    }
}

/// Mahalanobis distance `sqrt(rᵀΩ⁻¹r)` of every row of `returns`, and the
/// variance of the squared distances.
///
/// The covariance is PSD-corrected before inversion. Missing cells count as
/// zero return.
///
/// # Errors
/// Returns error if there are no periods, dimensions disagree, or the
/// covariance cannot be inverted.
pub fn try_mahalanobis(
    returns: &Array2<f64>,
    covariance: &Array2<f64>,
) -> Result<MahalanobisResult, DiagnosticsError> {
    let (periods, n) = returns.dim();
    if covariance.dim() != (n, n) {
        return Err(DiagnosticsError::DimensionMismatch { expected: n, actual: covariance.nrows() });
    }
    if periods == 0 || n == 0 {
        return Err(DiagnosticsError::InsufficientData { required: 1, actual: periods.min(n) });
    }

    let precision = invert(&try_nearest_psd(covariance, DEFAULT_EIGEN_FLOOR)?)?;
    let filled = returns.mapv(|v| if v.is_finite() { v } else { 0.0 });
    let distances: Vec<f64> =
        filled.rows().into_iter().map(|r| r.dot(&precision.dot(&r)).max(0.0).sqrt()).collect();

    let squared: Vec<f64> = distances.iter().map(|d| d * d).collect();
    Ok(MahalanobisResult { malv: stats::variance(&squared, 0), distances })
}

/// Total variant of [`try_mahalanobis`]: failures yield NaN MALV and no distances.
#[must_use]
pub fn mahalanobis(returns: &Array2<f64>, covariance: &Array2<f64>) -> MahalanobisResult {
    try_mahalanobis(returns, covariance).unwrap_or_else(|e| {
        tracing::warn!("Mahalanobis diagnostics failed: {e}");
        MahalanobisResult::undefined()
    })
}
