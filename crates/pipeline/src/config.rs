//! Configuration for a whole analysis run.

use std::path::Path;

use meridian_diagnostics::{HurstConfig, InformationConfig, SignalConfig};
use meridian_model::{AggregatorConfig, RegressorConfig, ScoringConfig, SnapshotConfig};
use meridian_portfolio::OptimizerConfig;
use meridian_primitives::TRADING_DAYS_PER_YEAR;
use meridian_risk::RiskConfig;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Every component configuration, plus the asset-table conventions.
///
/// Any field missing from a JSON file takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Column holding asset tickers.
    pub ticker_column: String,
    /// Columns never used as characteristics.
    pub excluded_columns: Vec<String>,
    /// Columns whose name contains this are forward returns, not characteristics.
    pub return_marker: String,
    /// Cross-sectional regression.
    pub regressor: RegressorConfig,
    /// Coefficient history simulation.
    pub snapshots: SnapshotConfig,
    /// Horizons to aggregate over.
    pub aggregator: AggregatorConfig,
    /// Composite scoring and selection.
    pub scoring: ScoringConfig,
    /// Covariance estimation.
    pub risk: RiskConfig,
    /// Allocation.
    pub optimizer: OptimizerConfig,
    /// IC/IR.
    pub information: InformationConfig,
    /// Hurst exponent.
    pub hurst: HurstConfig,
    /// Per-asset signal metrics.
    pub signals: SignalConfig,
    /// Periods per year for idiosyncratic variance.
    pub annualization: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticker_column: "Ticker".to_string(),
            excluded_columns: vec!["Ticker".to_string(), "Name".to_string(), "Score".to_string()],
            return_marker: "Return".to_string(),
            regressor: RegressorConfig::default(),
            snapshots: SnapshotConfig::default(),
            aggregator: AggregatorConfig::default(),
            scoring: ScoringConfig::default(),
            risk: RiskConfig::default(),
            optimizer: OptimizerConfig::default(),
            information: InformationConfig::default(),
            hurst: HurstConfig::default(),
            signals: SignalConfig::default(),
            annualization: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl PipelineConfig {
    /// Parse a configuration from JSON.
    ///
    /// # Errors
    /// Returns error if the JSON is malformed or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self, PipelineError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Fix every random seed, making runs reproducible.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.regressor.seed = Some(seed);
        self.snapshots.seed = Some(seed);
        self
    }
}
