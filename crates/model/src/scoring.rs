//! Composite asset scores from aggregated characteristic weights.

use std::collections::BTreeMap;

use meridian_math::stats;
use meridian_primitives::{MetricCatalog, RationaleRow};
use meridian_utils::{pct_rank, top_n};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Rank assigned to assets with a missing characteristic.
const NEUTRAL_RANK: f64 = 0.5;

/// Configuration for [`CompositeScorer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Number of assets kept by [`CompositeScorer::top`].
    pub top_n: usize,
    /// Name of the score column added to the asset table.
    pub score_column: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { top_n: 15, score_column: "Score".to_string() }
    }
}

/// Weighted percentile-rank scoring of the asset table.
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    config: ScoringConfig,
}

impl CompositeScorer {
    /// Create a scorer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scorer with custom configuration.
    #[must_use]
    pub const fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Score every row of `table`.
    ///
    /// Each positively weighted metric that is both a column and a rationale
    /// row contributes `weight * rank`, where `rank` is its percentile rank
    /// (inverted for negative average Sharpe, 0.5 when missing). The raw sum is
    /// z-scored across rows.
    ///
    /// # Errors
    /// Returns error if a contributing column cannot be read as numeric.
    pub fn try_score(
        &self,
        table: &DataFrame,
        weights: &BTreeMap<String, f64>,
        rationale: &[RationaleRow],
        catalog: &MetricCatalog,
    ) -> Result<Vec<f64>, ModelError> {
        let mut raw = vec![0.0; table.height()];

        for (display, &weight) in weights {
            if weight <= 0.0 {
                continue;
            }
            let Some(short) = catalog.short_name(display) else { continue };
            let Some(row) = rationale.iter().find(|r| r.characteristic == short) else { continue };
            if table.column(short).is_err() {
                continue;
            }

            let invert = row.avg_sharpe_coeff < 0.0;
            for (score, rank) in raw.iter_mut().zip(pct_rank(table, short)?) {
                let rank = match rank {
                    Some(r) if invert => 1.0 - r,
                    Some(r) => r,
                    None => NEUTRAL_RANK,
                };
                *score += rank * weight;
            }
        }

        Ok(stats::zscore(&raw))
    }

    /// Total variant of [`Self::try_score`]: failures score every row zero.
    #[must_use]
    pub fn score(
        &self,
        table: &DataFrame,
        weights: &BTreeMap<String, f64>,
        rationale: &[RationaleRow],
        catalog: &MetricCatalog,
    ) -> Vec<f64> {
        self.try_score(table, weights, rationale, catalog).unwrap_or_else(|e| {
            tracing::warn!("composite scoring failed: {e}; scoring all assets zero");
            vec![0.0; table.height()]
        })
    }

    /// Attach `scores` as the score column and keep the best `top_n` rows.
    ///
    /// # Errors
    /// Returns error if `scores` does not match the table height.
    pub fn top(&self, table: &DataFrame, scores: &[f64]) -> Result<DataFrame, ModelError> {
        if scores.len() != table.height() {
            return Err(ModelError::DimensionMismatch(format!(
                "{} scores for {} rows",
                scores.len(),
                table.height()
            )));
        }
        let mut scored = table.clone();
        scored.with_column(Column::new(self.config.score_column.as_str().into(), scores))?;
        let n = u32::try_from(self.config.top_n).unwrap_or(u32::MAX);
        Ok(top_n(scored.lazy(), n, &self.config.score_column).collect()?)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn catalog() -> MetricCatalog {
        MetricCatalog::new([
            ("ROE".to_string(), "Return on Equity".to_string()),
            ("PE_Ratio".to_string(), "P/E".to_string()),
        ])
    }

    fn row(name: &str, avg: f64, weight: f64) -> RationaleRow {
        RationaleRow {
            characteristic: name.to_string(),
            avg_sharpe_coeff: avg,
            consistency_score: 1.0,
            horizons_present: 4,
            final_score: avg.abs(),
            final_weight: weight,
        }
    }

    fn table() -> DataFrame {
        df! {
            "Ticker" => &["A", "B", "C", "D"],
            "ROE" => &[Some(0.1), Some(0.3), Some(0.2), None],
            "PE_Ratio" => &[10.0, 40.0, 20.0, 30.0],
        }
        .unwrap()
    }

    #[test]
    fn higher_positive_metric_scores_higher() {
        let weights = BTreeMap::from([("Return on Equity".to_string(), 100.0), ("P/E".to_string(), 0.0)]);
        let rationale = vec![row("ROE", 2.0, 100.0), row("PE_Ratio", -1.0, 0.0)];
        let scores = CompositeScorer::new().try_score(&table(), &weights, &rationale, &catalog()).unwrap();

        assert!(scores[1] > scores[2] && scores[2] > scores[0]);
        // missing ROE ranks neutral: 0.5 sits between B (1.0) and A (1/3)
        assert!(scores[3] < scores[2] && scores[3] > scores[0]);
        assert_relative_eq!(stats::mean(&scores), 0.0, epsilon = 1e-12);
        assert_relative_eq!(stats::std_dev(&scores, 1), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn negative_sharpe_inverts_rank() {
        let weights = BTreeMap::from([("P/E".to_string(), 100.0)]);
        let rationale = vec![row("PE_Ratio", -1.0, 100.0)];
        let scores = CompositeScorer::new().try_score(&table(), &weights, &rationale, &catalog()).unwrap();
        assert!(scores[0] > scores[2] && scores[2] > scores[3] && scores[3] > scores[1]);
    }

    #[test]
    fn no_positive_weights_gives_zero_scores() {
        let weights = BTreeMap::from([("Return on Equity".to_string(), 0.0)]);
        let scores = CompositeScorer::new().score(&table(), &weights, &[row("ROE", 1.0, 0.0)], &catalog());
        assert_eq!(scores, vec![0.0; 4]);
    }

    #[test]
    fn top_keeps_best_rows() {
        let scorer = CompositeScorer::with_config(ScoringConfig { top_n: 2, ..ScoringConfig::default() });
        let top = scorer.top(&table(), &[0.5, 1.5, -1.0, -1.0]).unwrap();
        let tickers: Vec<&str> = top.column("Ticker").unwrap().str().unwrap().into_no_null_iter().collect();
        assert_eq!(tickers, vec!["B", "A"]);
        assert!(scorer.top(&table(), &[1.0]).is_err());
    }
}
