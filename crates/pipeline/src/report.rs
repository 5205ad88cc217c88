//! Results of one analysis run.

use std::collections::BTreeMap;

use meridian_diagnostics::{HurstEstimate, InformationMetrics, SignalMetrics};
use meridian_primitives::{Horizon, PortfolioWeights, RationaleRow, StabilityTable, Symbol};
use meridian_risk::RiskView;
use serde::Serialize;

/// Composite score of one asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetScore {
    /// Asset ticker.
    pub symbol: Symbol,
    /// Z-scored composite score.
    pub score: f64,
}

/// Quality checks on the selected universe and the allocated portfolio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticsReport {
    /// Mahalanobis calibration variance of the aligned returns.
    pub malv: f64,
    /// Score-weighted forecast against realised portfolio returns.
    pub information: InformationMetrics,
    /// Long memory of realised portfolio returns.
    pub hurst: Option<HurstEstimate>,
    /// Annualised residual variance after the benchmark (and new factor).
    pub idiosyncratic_variance: BTreeMap<Symbol, f64>,
    /// Signal metrics of every selected asset's full history.
    pub signals: BTreeMap<Symbol, SignalMetrics>,
}

/// Everything one analysis run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PipelineReport {
    /// Scoring weight per characteristic display name (percent).
    pub weights: BTreeMap<String, f64>,
    /// Per-characteristic breakdown, best first.
    pub rationale: Vec<RationaleRow>,
    /// Per-horizon coefficient stability.
    pub stability: BTreeMap<Horizon, StabilityTable>,
    /// Composite score of every ticker in the asset table.
    pub scores: Vec<AssetScore>,
    /// Top-scoring assets, best first.
    pub selected: Vec<Symbol>,
    /// Risk view over the selection.
    pub risk: RiskView,
    /// Beta of each selected asset to the benchmark.
    pub betas: BTreeMap<Symbol, f64>,
    /// Allocation over the selection.
    pub portfolio: PortfolioWeights,
    /// Diagnostics.
    pub diagnostics: DiagnosticsReport,
}

impl PipelineReport {
    /// Rationale rows with a positive weight.
    pub fn weighted_characteristics(&self) -> impl Iterator<Item = &RationaleRow> {
        self.rationale.iter().filter(|r| r.final_weight > 0.0)
    }
}
