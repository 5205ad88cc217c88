//! Per-horizon coefficient stability.

use meridian_math::stats;
use meridian_primitives::{CoefficientSeries, StabilityRecord, StabilityTable};

/// Added to the coefficient standard deviation before dividing.
pub const STABILITY_EPSILON: f64 = 1e-6;

/// Summarise how stable each characteristic's coefficient is across snapshots.
///
/// For every characteristic seen in any snapshot: mean, sample standard
/// deviation, fraction of snapshots with a positive coefficient, and the
/// coefficient Sharpe `mean / (std + ε)`. A characteristic observed only once
/// has no measurable dispersion and is given zero deviation and zero Sharpe.
#[must_use]
pub fn analyze_stability(snapshots: &[CoefficientSeries]) -> StabilityTable {
    if snapshots.is_empty() {
        return StabilityTable::default();
    }

    let mut names: Vec<&str> = Vec::new();
    for snapshot in snapshots {
        for name in snapshot.names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let runs = snapshots.len() as f64;
    let records = names
        .into_iter()
        .map(|name| {
            let values: Vec<f64> = snapshots.iter().filter_map(|s| s.get(name)).collect();
            let mean_coeff = stats::mean(&values);
            let pct_positive = values.iter().filter(|v| **v > 0.0).count() as f64 / runs;
            let (std_coeff, sharpe_ratio_coeff) = if values.len() < 2 {
                (0.0, 0.0)
            } else {
                let std = stats::std_dev(&values, 1);
                (std, mean_coeff / (std + STABILITY_EPSILON))
            };
            StabilityRecord {
                characteristic: name.to_string(),
                mean_coeff,
                std_coeff,
                pct_positive,
                sharpe_ratio_coeff,
            }
        })
        .collect();

    StabilityTable::new(records)
}
