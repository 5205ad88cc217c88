//! Orchestration of one analysis run.

use std::collections::BTreeMap;

use meridian_diagnostics::{SignalMetrics, hurst_exponent, idiosyncratic_variance, information_metrics, mahalanobis};
use meridian_math::simple_regression;
use meridian_model::{CompositeScorer, PureReturnsEstimator, SimulatedSnapshots, StabilityAggregator};
use meridian_portfolio::{FmpBuilder, OptimizationInput, PortfolioOptimizer};
use meridian_primitives::{PortfolioWeights, ReturnPanel, ReturnSeries, Symbol};
use meridian_risk::RiskModel;
use meridian_utils::{numeric_column, string_column};
use ndarray::{Array1, Array2};
use polars::prelude::DataFrame;
use tracing::{info, warn};

use crate::{
    AssetScore, DiagnosticsReport, PipelineConfig, PipelineError, PipelineInput, PipelineReport,
    select_characteristics,
};

/// Top-N selection: every ticker's score, the selected tickers, their scores.
type Selection = (Vec<AssetScore>, Vec<Symbol>, Vec<f64>);

/// Runs characteristic analysis, allocation and diagnostics end to end.
#[derive(Debug, Clone, Default)]
pub struct AnalysisPipeline {
    config: PipelineConfig,
}

impl AnalysisPipeline {
    /// Create a pipeline with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pipeline with custom configuration.
    #[must_use]
    pub const fn with_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage. Stage failures are logged and replaced by fallbacks.
    #[must_use]
    pub fn run(&self, input: &PipelineInput) -> PipelineReport {
        let characteristics = select_characteristics(&input.assets, &self.config);
        info!(assets = input.assets.height(), characteristics = characteristics.len(), "starting analysis");

        let aggregation = StabilityAggregator::with_parts(
            self.config.aggregator.clone(),
            PureReturnsEstimator::with_config(self.config.regressor.clone()),
            SimulatedSnapshots::with_config(self.config.snapshots.clone()),
        )
        .run(&input.assets, &characteristics, &input.catalog);

        let scorer = CompositeScorer::with_config(self.config.scoring.clone());
        let scores = scorer.score(&input.assets, &aggregation.weights, &aggregation.rationale, &input.catalog);
        let (scores, selected, selected_scores) = self.select(&scorer, &input.assets, &scores);
        info!(selected = selected.len(), "selected top-scoring assets");

        let panel = ReturnPanel::outer(&input.returns);
        let risk = RiskModel::with_config(self.config.risk.clone()).estimate(&panel, &selected);
        let covariance = risk.covariance_of(&selected);
        info!(assets = selected.len(), fallback = risk.is_fallback(), "estimated risk view");

        let aligned = align(&input.returns, &selected, &input.benchmark);
        let betas = estimate_betas(&aligned, &input.benchmark);
        let portfolio = self.allocate(input, &aligned, &covariance, &betas);
        info!(periods = aligned.n_dates(), gross = portfolio.gross(), "allocated portfolio");

        let diagnostics = self.diagnose(input, &aligned, &covariance, &portfolio, &selected_scores);
        info!(malv = diagnostics.malv, ic = diagnostics.information.ic, "diagnostics complete");

        PipelineReport {
            weights: aggregation.weights,
            rationale: aggregation.rationale,
            stability: aggregation.stability,
            scores,
            betas: selected.iter().cloned().zip(betas.iter().copied()).collect(),
            selected,
            risk,
            portfolio,
            diagnostics,
        }
    }

    fn select(&self, scorer: &CompositeScorer, assets: &DataFrame, scores: &[f64]) -> Selection {
        self.try_select(scorer, assets, scores).unwrap_or_else(|e| {
            warn!("asset selection failed: {e}; selecting nothing");
            (Vec::new(), Vec::new(), Vec::new())
        })
    }

    fn try_select(
        &self,
        scorer: &CompositeScorer,
        assets: &DataFrame,
        scores: &[f64],
    ) -> Result<Selection, PipelineError> {
        let ticker = self.config.ticker_column.as_str();
        let all = string_column(assets, ticker)?
            .into_iter()
            .zip(scores)
            .filter_map(|(symbol, &score)| Some(AssetScore { symbol: Symbol::new(symbol?), score }))
            .collect();

        let top = scorer.top(assets, scores)?;
        let (selected, selected_scores) = string_column(&top, ticker)?
            .into_iter()
            .zip(numeric_column(&top, &scorer.config().score_column)?)
            .filter_map(|(symbol, score)| Some((Symbol::new(symbol?), score.unwrap_or(0.0))))
            .unzip();
        Ok((all, selected, selected_scores))
    }

    fn allocate(
        &self,
        input: &PipelineInput,
        aligned: &ReturnPanel,
        covariance: &Array2<f64>,
        betas: &Array1<f64>,
    ) -> PortfolioWeights {
        if let Some(factor) = &input.new_factor {
            info!("building factor-mimicking portfolio for the new factor");
            return FmpBuilder::with_config(self.config.optimizer.fmp.clone()).build(
                aligned,
                factor,
                covariance,
                std::slice::from_ref(&input.benchmark),
            );
        }

        info!(mode = %self.config.optimizer.mode, "optimising portfolio");
        let request = OptimizationInput::new(aligned)
            .with_covariance(covariance)
            .with_factor(&input.benchmark, &[])
            .with_betas(betas);
        PortfolioOptimizer::with_config(self.config.optimizer.clone()).optimize(&request)
    }

    fn diagnose(
        &self,
        input: &PipelineInput,
        aligned: &ReturnPanel,
        covariance: &Array2<f64>,
        portfolio: &PortfolioWeights,
        scores: &[f64],
    ) -> DiagnosticsReport {
        let malv = mahalanobis(aligned.values(), covariance).malv;

        let holdings: Array1<f64> =
            aligned.symbols().iter().map(|s| portfolio.get(s.as_str()).unwrap_or(0.0)).collect();
        let realized = ReturnSeries::new(aligned.dates().to_vec(), aligned.values().dot(&holdings).to_vec());
        let forecast = ReturnSeries::new(
            aligned.dates().to_vec(),
            aligned.values().dot(&score_weights(scores)).to_vec(),
        )
        .lag(1);
        let information = information_metrics(&forecast, &realized, &self.config.information);
        let hurst = hurst_exponent(realized.values(), &self.config.hurst);

        let factors: Vec<ReturnSeries> =
            std::iter::once(&input.benchmark).chain(&input.new_factor).cloned().collect();
        let idiosyncratic_variance = idiosyncratic_variance(aligned, &factors, self.config.annualization);

        let signals = aligned
            .symbols()
            .iter()
            .map(|symbol| {
                let history = input.returns.iter().find(|(s, _)| s == symbol).map_or(&[][..], |(_, r)| r.values());
                (symbol.clone(), SignalMetrics::compute(history, &self.config.signals))
            })
            .collect::<BTreeMap<_, _>>();

        DiagnosticsReport { malv, information, hurst, idiosyncratic_variance, signals }
    }
}

/// Selected assets' returns on the dates they share with the benchmark, zero-filled.
fn align(returns: &[(Symbol, ReturnSeries)], selected: &[Symbol], benchmark: &ReturnSeries) -> ReturnPanel {
    let series: Vec<(Symbol, ReturnSeries)> = selected
        .iter()
        .map(|symbol| {
            let history =
                returns.iter().find(|(s, _)| s == symbol).map(|(_, r)| r.clone()).unwrap_or_default();
            (symbol.clone(), history)
        })
        .collect();
    ReturnPanel::outer(&series).restrict_to(benchmark.dates()).fill_missing(0.0)
}

/// Slope of each column on the benchmark; 1.0 where it cannot be estimated.
fn estimate_betas(aligned: &ReturnPanel, benchmark: &ReturnSeries) -> Array1<f64> {
    let market: Vec<f64> = aligned
        .dates()
        .iter()
        .map(|d| benchmark.get(*d).filter(|v| v.is_finite()).unwrap_or(0.0))
        .collect();
    aligned
        .values()
        .columns()
        .into_iter()
        .map(|column| match simple_regression(&market, &column.to_vec()) {
            Ok((beta, _)) if beta.is_finite() => beta,
            _ => 1.0,
        })
        .collect()
}

/// Scores normalised to sum to one; equal weights when they sum to zero.
fn score_weights(scores: &[f64]) -> Array1<f64> {
    let n = scores.len();
    let total: f64 = scores.iter().sum();
    if n == 0 {
        Array1::zeros(0)
    } else if total == 0.0 || !total.is_finite() {
        Array1::from_elem(n, 1.0 / n as f64)
    } else {
        scores.iter().map(|s| s / total).collect()
    }
}
