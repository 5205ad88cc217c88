//! Multi-horizon stability aggregation and scoring weights.

use std::collections::BTreeMap;

use meridian_primitives::{
    CoefficientSeries, Horizon, MetricCatalog, RationaleRow, StabilityTable,
};
use meridian_traits::{CoefficientEstimator, SnapshotProvider};
use polars::prelude::DataFrame;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{PureReturnsEstimator, SimulatedSnapshots, analyze_stability};

/// Configuration for [`StabilityAggregator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    /// Forward-return horizons to regress, each on its `Return_{days}d` column.
    pub horizons: Vec<Horizon>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self { horizons: Horizon::ALL.to_vec() }
    }
}

/// Output of a stability aggregation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Final weight per catalog display name, in percent; every catalog metric present.
    pub weights: BTreeMap<String, f64>,
    /// Cross-horizon rationale, sorted by descending final score.
    pub rationale: Vec<RationaleRow>,
    /// Per-horizon stability tables, for horizons that produced coefficients.
    pub stability: BTreeMap<Horizon, StabilityTable>,
    /// Today's coefficients per horizon.
    pub coefficients: BTreeMap<Horizon, CoefficientSeries>,
}

impl AggregationResult {
    /// Rationale row for a characteristic.
    #[must_use]
    pub fn rationale_for(&self, characteristic: &str) -> Option<&RationaleRow> {
        self.rationale.iter().find(|r| r.characteristic == characteristic)
    }
}

/// Runs the coefficient estimator over several horizons and turns coefficient
/// stability into scoring weights.
#[derive(Debug, Clone)]
pub struct StabilityAggregator<E = PureReturnsEstimator, P = SimulatedSnapshots> {
    config: AggregatorConfig,
    estimator: E,
    provider: P,
}

impl StabilityAggregator {
    /// Create an aggregator with default configuration, regressor, and simulated history.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parts(AggregatorConfig::default(), PureReturnsEstimator::new(), SimulatedSnapshots::new())
    }
}

impl Default for StabilityAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CoefficientEstimator, P: SnapshotProvider> StabilityAggregator<E, P> {
    /// Create an aggregator from its parts.
    #[must_use]
    pub const fn with_parts(config: AggregatorConfig, estimator: E, provider: P) -> Self {
        Self { config, estimator, provider }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// Regress every horizon in parallel, analyse snapshot stability, and
    /// aggregate into weights keyed by `catalog` display names.
    ///
    /// Horizons whose regression is empty contribute nothing.
    #[must_use]
    pub fn run(
        &self,
        table: &DataFrame,
        characteristics: &[String],
        catalog: &MetricCatalog,
    ) -> AggregationResult {
        let per_horizon: Vec<(Horizon, CoefficientSeries, StabilityTable)> = self
            .config
            .horizons
            .par_iter()
            .map(|&horizon| {
                let today = self.estimator.estimate(table, characteristics, &horizon.target_column());
                let snapshots = self.provider.snapshots(horizon, &today);
                tracing::debug!(
                    %horizon,
                    estimator = self.estimator.name(),
                    provider = self.provider.name(),
                    coefficients = today.len(),
                    snapshots = snapshots.len(),
                    "horizon regressed"
                );
                (horizon, today, analyze_stability(&snapshots))
            })
            .collect();

        let mut stability = BTreeMap::new();
        let mut coefficients = BTreeMap::new();
        for (horizon, today, table) in per_horizon {
            if !table.is_empty() {
                stability.insert(horizon, table);
            }
            coefficients.insert(horizon, today);
        }
        if stability.is_empty() {
            tracing::warn!("no horizon produced coefficients; all weights are zero");
        }

        let (weights, rationale) = aggregate_stability(&stability, catalog);
        tracing::info!(
            horizons = stability.len(),
            characteristics = rationale.len(),
            weighted = rationale.iter().filter(|r| r.final_weight > 0.0).count(),
            "stability aggregation complete"
        );
        AggregationResult { weights, rationale, stability, coefficients }
    }
}

/// Combine per-horizon stability tables into scoring weights.
///
/// For each characteristic: the mean of its per-horizon coefficient Sharpes,
/// the fraction of horizons whose sign matches that mean's sign (zero when the
/// mean is zero), and the score `|mean| * consistency²`. Weights are scores as
/// a percentage of their total. The returned weight map is keyed by display
/// name and covers every catalog metric, defaulting to zero.
#[must_use]
pub fn aggregate_stability(
    tables: &BTreeMap<Horizon, StabilityTable>,
    catalog: &MetricCatalog,
) -> (BTreeMap<String, f64>, Vec<RationaleRow>) {
    let mut weights: BTreeMap<String, f64> =
        catalog.display_names().map(|name| (name.to_string(), 0.0)).collect();

    let mut names: Vec<&str> = Vec::new();
    for table in tables.values() {
        for record in table.records() {
            if !names.contains(&record.characteristic.as_str()) {
                names.push(&record.characteristic);
            }
        }
    }

    let mut rationale: Vec<RationaleRow> = names
        .into_iter()
        .map(|name| {
            let sharpes: Vec<f64> = tables
                .values()
                .filter_map(|t| t.get(name))
                .map(|r| r.sharpe_ratio_coeff)
                .collect();
            let avg = sharpes.iter().sum::<f64>() / sharpes.len() as f64;
            let consistency = if avg == 0.0 || !avg.is_finite() {
                0.0
            } else {
                let sign = avg.signum();
                sharpes.iter().filter(|s| **s != 0.0 && s.signum() == sign).count() as f64
                    / sharpes.len() as f64
            };
            let score = avg.abs() * consistency * consistency;
            RationaleRow {
                characteristic: name.to_string(),
                avg_sharpe_coeff: avg,
                consistency_score: consistency,
                horizons_present: sharpes.len(),
                final_score: if score.is_finite() { score } else { 0.0 },
                final_weight: 0.0,
            }
        })
        .collect();

    let total: f64 = rationale.iter().map(|r| r.final_score).sum();
    if total > 0.0 {
        for row in &mut rationale {
            row.final_weight = row.final_score / total * 100.0;
        }
    }
    rationale.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    for row in &rationale {
        let display = catalog.display_name(&row.characteristic);
        if let Some(weight) = weights.get_mut(display) {
            *weight = row.final_weight;
        }
    }

    (weights, rationale)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use meridian_primitives::StabilityRecord;
    use rand::{Rng, SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{RegressorConfig, SnapshotConfig};

    fn table(entries: &[(&str, f64)]) -> StabilityTable {
        StabilityTable::new(
            entries
                .iter()
                .map(|(name, sharpe)| StabilityRecord {
                    characteristic: (*name).to_string(),
                    mean_coeff: *sharpe,
                    std_coeff: 1.0,
                    pct_positive: 1.0,
                    sharpe_ratio_coeff: *sharpe,
                })
                .collect(),
        )
    }

    fn catalog() -> MetricCatalog {
        MetricCatalog::new([
            ("ROE".to_string(), "Return on Equity".to_string()),
            ("PE_Ratio".to_string(), "P/E Ratio".to_string()),
            ("Beta".to_string(), "Beta".to_string()),
        ])
    }

    #[test]
    fn consistent_sign_scores_full_consistency() {
        let tables = BTreeMap::from([
            (Horizon::OneMonth, table(&[("ROE", 2.0), ("PE_Ratio", -1.0)])),
            (Horizon::ThreeMonths, table(&[("ROE", 4.0), ("PE_Ratio", 1.0)])),
        ]);
        let (weights, rationale) = aggregate_stability(&tables, &catalog());

        let roe = rationale.iter().find(|r| r.characteristic == "ROE").unwrap();
        assert_eq!(roe.consistency_score, 1.0);
        assert_eq!(roe.horizons_present, 2);
        assert_relative_eq!(roe.avg_sharpe_coeff, 3.0);
        assert_relative_eq!(roe.final_score, 3.0);

        let pe = rationale.iter().find(|r| r.characteristic == "PE_Ratio").unwrap();
        assert_eq!(pe.consistency_score, 0.0);
        assert_eq!(pe.final_weight, 0.0);

        assert_relative_eq!(weights["Return on Equity"], 100.0);
        assert_eq!(weights["P/E Ratio"], 0.0);
        assert_eq!(weights["Beta"], 0.0);
        assert_eq!(rationale[0].characteristic, "ROE");
    }

    #[test]
    fn weights_sum_to_one_hundred() {
        let tables = BTreeMap::from([
            (Horizon::OneMonth, table(&[("ROE", 2.0), ("Beta", -1.0)])),
            (Horizon::TwelveMonths, table(&[("ROE", 1.0), ("Beta", -3.0), ("PE_Ratio", 0.5)])),
        ]);
        let (weights, rationale) = aggregate_stability(&tables, &catalog());

        assert_relative_eq!(weights.values().sum::<f64>(), 100.0, epsilon = 1e-9);
        let pe = rationale.iter().find(|r| r.characteristic == "PE_Ratio").unwrap();
        assert_eq!(pe.horizons_present, 1);
        assert_relative_eq!(pe.consistency_score, 1.0);
    }

    #[test]
    fn zero_sharpe_never_matches_sign() {
        let tables = BTreeMap::from([
            (Horizon::OneMonth, table(&[("ROE", 0.0)])),
            (Horizon::ThreeMonths, table(&[("ROE", 2.0)])),
        ]);
        let (_, rationale) = aggregate_stability(&tables, &catalog());
        assert_relative_eq!(rationale[0].consistency_score, 0.5);
    }

    #[test]
    fn no_tables_gives_zero_weights_for_all_metrics() {
        let (weights, rationale) = aggregate_stability(&BTreeMap::new(), &catalog());
        assert!(rationale.is_empty());
        assert_eq!(weights.len(), 3);
        assert!(weights.values().all(|w| *w == 0.0));
    }

    fn asset_table(n: usize) -> DataFrame {
        let mut rng = StdRng::seed_from_u64(17);
        let roe: Vec<f64> = (0..n).map(|_| rng.gen_range(-0.1..0.3)).collect();
        let beta: Vec<f64> = (0..n).map(|_| rng.gen_range(0.5..1.5)).collect();
        let noise: Vec<f64> = (0..n).map(|_| rng.gen_range(-1.0..1.0)).collect();
        let target = |scale: f64| -> Vec<f64> {
            (0..n).map(|i| scale * (30.0 * roe[i] - 2.0 * beta[i]) + noise[i]).collect()
        };
        polars::df! {
            "ROE" => roe.clone(),
            "Beta" => beta.clone(),
            "Return_21d" => target(0.2),
            "Return_63d" => target(0.5),
            "Return_126d" => target(1.0),
            "Return_252d" => target(2.0),
        }
        .unwrap()
    }

    #[test]
    fn end_to_end_run_is_deterministic_with_seeds() {
        let aggregator = StabilityAggregator::with_parts(
            AggregatorConfig::default(),
            PureReturnsEstimator::with_config(RegressorConfig { seed: Some(1), ..RegressorConfig::default() }),
            SimulatedSnapshots::with_config(SnapshotConfig {
                noise_std: 0.01,
                seed: Some(2),
                ..SnapshotConfig::default()
            }),
        );
        let characteristics = vec!["ROE".to_string(), "Beta".to_string()];
        let first = aggregator.run(&asset_table(80), &characteristics, &catalog());
        let second = aggregator.run(&asset_table(80), &characteristics, &catalog());

        assert_eq!(first, second);
        assert_eq!(first.stability.len(), 4);
        assert_relative_eq!(first.weights.values().sum::<f64>(), 100.0, epsilon = 1e-9);
        let roe = first.rationale_for("ROE").unwrap();
        assert_eq!(roe.consistency_score, 1.0);
        assert!(roe.avg_sharpe_coeff > 0.0);
    }

    #[test]
    fn missing_targets_contribute_nothing() {
        let table = asset_table(40).drop("Return_21d").unwrap();
        let result = StabilityAggregator::new().run(&table, &["ROE".to_string()], &catalog());
        assert!(!result.stability.contains_key(&Horizon::OneMonth));
        assert!(result.coefficients[&Horizon::OneMonth].is_empty());
    }
}
