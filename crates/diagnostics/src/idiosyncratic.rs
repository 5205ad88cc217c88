//! Annualised residual variance of each asset after a factor regression.

use std::collections::{BTreeMap, BTreeSet};

use meridian_math::{ols, stats};
use meridian_primitives::{Date, ReturnPanel, ReturnSeries, Symbol, common_dates};
use ndarray::{Array1, Array2, Axis};

use crate::DiagnosticsError;

/// Regress every asset on `factors` over their shared dates and annualise the
/// population variance of the residuals.
///
/// Each asset uses only the dates where its own return is observed. An asset
/// whose regression fails gets zero.
///
/// # Errors
/// Returns `InsufficientData` if there are no factors or the factors and the
/// panel share fewer than two dates.
pub fn try_idiosyncratic_variance(
    returns: &ReturnPanel,
    factors: &[ReturnSeries],
    annualization: f64,
) -> Result<BTreeMap<Symbol, f64>, DiagnosticsError> {
    if factors.is_empty() {
        return Err(DiagnosticsError::InsufficientData { required: 1, actual: 0 });
    }
    let panel_dates: BTreeSet<&Date> = returns.dates().iter().collect();
    let mut dates = common_dates(factors);
    dates.retain(|d| panel_dates.contains(d));
    if dates.len() < 2 {
        return Err(DiagnosticsError::InsufficientData { required: 2, actual: dates.len() });
    }

    let aligned = returns.restrict_to(&dates);
    let design = Array2::from_shape_fn((aligned.n_dates(), factors.len()), |(i, k)| {
        factors[k].get(aligned.dates()[i]).unwrap_or(f64::NAN)
    });

    let variances = aligned
        .symbols()
        .iter()
        .zip(aligned.values().columns())
        .map(|(symbol, column)| {
            let rows: Vec<usize> = (0..column.len()).filter(|&i| column[i].is_finite()).collect();
            let y = Array1::from_iter(rows.iter().map(|&i| column[i]));
            let x = design.select(Axis(0), &rows);
            let variance = match ols(&y, &x) {
                Ok(fit) => stats::variance(&fit.residuals.to_vec(), 0) * annualization,
                Err(e) => {
                    tracing::debug!(%symbol, "residual regression failed: {e}");
                    0.0
                }
            };
            (symbol.clone(), if variance.is_finite() { variance } else { 0.0 })
        })
        .collect();
    Ok(variances)
}

/// Total variant of [`try_idiosyncratic_variance`]: failure assigns every asset zero.
#[must_use]
pub fn idiosyncratic_variance(
    returns: &ReturnPanel,
    factors: &[ReturnSeries],
    annualization: f64,
) -> BTreeMap<Symbol, f64> {
    try_idiosyncratic_variance(returns, factors, annualization).unwrap_or_else(|e| {
        tracing::warn!("idiosyncratic variance failed: {e}");
        returns.symbols().iter().map(|s| (s.clone(), 0.0)).collect()
    })
}
