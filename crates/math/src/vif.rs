//! Variance inflation factors and collinearity pruning.

use ndarray::{Array1, Array2, Axis};

use crate::stats;

/// Relative residual energy below which a column counts as perfectly explained.
const COLLINEAR_TOLERANCE: f64 = 1e-12;

/// Variance floor below which a column is dropped before VIF pruning.
pub const MIN_COLUMN_VARIANCE: f64 = 1e-8;

/// Variance inflation factor of every column of `x`.
///
/// Each column is regressed on all the others without an intercept, so `R²`
/// is measured against the raw sum of squares. The factor is `1 / (1 - R²)`,
/// infinite when the column is a linear combination of the rest. Columns
/// sharing a large common level therefore inflate each other even when their
/// deviations are unrelated.
#[must_use]
pub fn variance_inflation_factors(x: &Array2<f64>) -> Array1<f64> {
    let p = x.ncols();
    if x.nrows() == 0 || p == 0 {
        return Array1::zeros(p);
    }

    (0..p)
        .map(|j| {
            let target = x.column(j);
            let total: f64 = target.dot(&target);
            if total <= 0.0 {
                return f64::INFINITY;
            }
            let basis = orthonormal_basis(x, j);
            let mut residual = target.to_owned();
            for q in &basis {
                let proj = q.dot(&residual);
                residual.scaled_add(-proj, q);
            }
            let rss = residual.dot(&residual);
            if rss <= COLLINEAR_TOLERANCE * total {
                return f64::INFINITY;
            }
            total / rss
        })
        .collect()
}

/// Modified Gram-Schmidt basis for every column except `skip`.
fn orthonormal_basis(x: &Array2<f64>, skip: usize) -> Vec<Array1<f64>> {
    let mut basis: Vec<Array1<f64>> = Vec::with_capacity(x.ncols());
    for (k, column) in x.axis_iter(Axis(1)).enumerate() {
        if k == skip {
            continue;
        }
        let original = column.dot(&column);
        let mut v = column.to_owned();
        for q in &basis {
            let proj = q.dot(&v);
            v.scaled_add(-proj, q);
        }
        let norm_sq = v.dot(&v);
        if norm_sq > COLLINEAR_TOLERANCE * original && norm_sq > 0.0 {
            v /= norm_sq.sqrt();
            basis.push(v);
        }
    }
    basis
}

/// Iteratively drop the most collinear column until every VIF is below `threshold`.
///
/// Columns with variance at or below [`MIN_COLUMN_VARIANCE`] are removed first.
/// Each round drops the column with the largest factor (ties go to the earliest
/// column); pruning stops when fewer than two columns remain or after as many
/// rounds as there were columns. Returns the indices of the retained columns in
/// their original order.
#[must_use]
pub fn prune_by_vif(x: &Array2<f64>, threshold: f64) -> Vec<usize> {
    let mut keep: Vec<usize> = (0..x.ncols())
        .filter(|&j| stats::variance(&x.column(j).to_vec(), 1) > MIN_COLUMN_VARIANCE)
        .collect();
    if keep.len() < x.ncols() {
        tracing::debug!(dropped = x.ncols() - keep.len(), "dropped near-constant columns before VIF");
    }

    let max_rounds = keep.len();
    for _ in 0..max_rounds {
        if keep.len() < 2 {
            break;
        }
        let subset = x.select(Axis(1), &keep);
        let factors = variance_inflation_factors(&subset);

        let mut worst = 0;
        for (i, f) in factors.iter().enumerate() {
            if *f > factors[worst] {
                worst = i;
            }
        }
        if factors[worst] < threshold {
            break;
        }
        tracing::debug!(column = keep[worst], vif = factors[worst], "dropping collinear column");
        keep.remove(worst);
    }
    keep
}
