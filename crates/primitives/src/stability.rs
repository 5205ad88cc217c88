//! Coefficient stability and aggregation records.

use serde::{Deserialize, Serialize};

/// Stability of one characteristic's coefficient across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StabilityRecord {
    /// Characteristic (short column) name.
    pub characteristic: String,
    /// Mean coefficient.
    pub mean_coeff: f64,
    /// Sample standard deviation of the coefficient.
    pub std_coeff: f64,
    /// Fraction of snapshots with a strictly positive coefficient.
    pub pct_positive: f64,
    /// Coefficient Sharpe: `mean / (std + eps)`.
    pub sharpe_ratio_coeff: f64,
}

/// Stability records for one horizon, sorted by absolute coefficient Sharpe.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StabilityTable {
    records: Vec<StabilityRecord>,
}

impl StabilityTable {
    /// Create a table, ordering records by descending `|sharpe_ratio_coeff|`.
    #[must_use]
    pub fn new(mut records: Vec<StabilityRecord>) -> Self {
        records.sort_by(|a, b| b.sharpe_ratio_coeff.abs().total_cmp(&a.sharpe_ratio_coeff.abs()));
        Self { records }
    }

    /// Records in order.
    #[must_use]
    pub fn records(&self) -> &[StabilityRecord] {
        &self.records
    }

    /// Record for a characteristic.
    #[must_use]
    pub fn get(&self, characteristic: &str) -> Option<&StabilityRecord> {
        self.records.iter().find(|r| r.characteristic == characteristic)
    }

    /// Number of characteristics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Aggregated cross-horizon rationale for one characteristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RationaleRow {
    /// Characteristic (short column) name.
    pub characteristic: String,
    /// Mean of the per-horizon coefficient Sharpes.
    pub avg_sharpe_coeff: f64,
    /// Fraction of horizons whose Sharpe sign matches the average's sign.
    pub consistency_score: f64,
    /// Number of horizons the characteristic appeared in.
    pub horizons_present: usize,
    /// `|avg_sharpe_coeff| * consistency_score^2`.
    pub final_score: f64,
    /// Score normalised to a percentage of the total.
    pub final_weight: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, sharpe: f64) -> StabilityRecord {
        StabilityRecord {
            characteristic: name.to_string(),
            mean_coeff: sharpe,
            std_coeff: 1.0,
            pct_positive: 0.5,
            sharpe_ratio_coeff: sharpe,
        }
    }

    #[test]
    fn table_sorted_by_absolute_sharpe() {
        let table = StabilityTable::new(vec![record("a", 0.5), record("b", -2.0), record("c", 1.0)]);
        let order: Vec<&str> = table.records().iter().map(|r| r.characteristic.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(table.get("c").map(|r| r.sharpe_ratio_coeff), Some(1.0));
    }
}
