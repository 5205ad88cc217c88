//! Multi-mode portfolio allocation.

use std::fmt;

use meridian_math::{stats, try_nearest_psd};
use meridian_primitives::{PortfolioWeights, ReturnPanel, ReturnSeries, Symbol, TRADING_DAYS_PER_YEAR};
use meridian_traits::{ConvexSolver, QuadraticProgram};
use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::{FmpBuilder, FmpConfig, PortfolioError, ProjectedGradientSolver};

/// Allocation method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    /// Uniform weights.
    #[default]
    Equal,
    /// Weights proportional to inverse annualised volatility.
    #[serde(rename = "inv_vol")]
    InverseVolatility,
    /// Maximise `μᵀw - γ wᵀΣw`, long-only and capped per asset.
    RiskAdjusted,
    /// Factor-mimicking portfolio of a supplied factor.
    #[serde(rename = "fmp")]
    FactorMimicking,
    /// Maximise `αᵀw`, long-only with zero beta exposure.
    AlphaOrthogonal,
}

impl OptimizationMode {
    /// Short label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Equal => "equal",
            Self::InverseVolatility => "inv_vol",
            Self::RiskAdjusted => "risk_adjusted",
            Self::FactorMimicking => "fmp",
            Self::AlphaOrthogonal => "alpha_orthogonal",
        }
    }
}

impl fmt::Display for OptimizationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Configuration for [`PortfolioOptimizer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Allocation method.
    pub mode: OptimizationMode,
    /// Risk aversion `γ` in the risk-adjusted objective.
    pub risk_aversion: f64,
    /// Per-asset cap in the risk-adjusted mode.
    pub max_weight: f64,
    /// Annualised volatility substituted for zero in the inverse-volatility mode.
    pub vol_floor: f64,
    /// Solutions whose weights sum to less than this are rejected.
    pub min_weight_sum: f64,
    /// Periods per year.
    pub annualization: f64,
    /// Eigenvalue floor for the PSD correction of the covariance.
    pub eigen_floor: f64,
    /// Factor-mimicking portfolio settings.
    pub fmp: FmpConfig,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            mode: OptimizationMode::Equal,
            risk_aversion: 0.5,
            max_weight: 0.15,
            vol_floor: 1e-6,
            min_weight_sum: 1e-6,
            annualization: TRADING_DAYS_PER_YEAR,
            eigen_floor: meridian_math::DEFAULT_EIGEN_FLOOR,
            fmp: FmpConfig::default(),
        }
    }
}

/// Inputs to one allocation. Only `returns` is required; each mode checks
/// for what it needs.
#[derive(Debug, Clone, Copy)]
pub struct OptimizationInput<'a> {
    /// Aligned asset returns; missing cells count as zero.
    pub returns: &'a ReturnPanel,
    /// Annualised covariance in `returns` column order. Sample covariance when absent.
    pub covariance: Option<&'a Array2<f64>>,
    /// Factor to mimic.
    pub factor: Option<&'a ReturnSeries>,
    /// Factors the mimicked factor is orthogonalised against.
    pub existing_factors: &'a [ReturnSeries],
    /// Exposures the alpha-orthogonal portfolio must be neutral to.
    pub betas: Option<&'a Array1<f64>>,
}

impl<'a> OptimizationInput<'a> {
    /// Input carrying only returns.
    #[must_use]
    pub const fn new(returns: &'a ReturnPanel) -> Self {
        Self { returns, covariance: None, factor: None, existing_factors: &[], betas: None }
    }

    /// Attach a covariance matrix.
    #[must_use]
    pub const fn with_covariance(mut self, covariance: &'a Array2<f64>) -> Self {
        self.covariance = Some(covariance);
        self
    }

    /// Attach a factor to mimic and the factors to orthogonalise it against.
    #[must_use]
    pub const fn with_factor(mut self, factor: &'a ReturnSeries, existing: &'a [ReturnSeries]) -> Self {
        self.factor = Some(factor);
        self.existing_factors = existing;
        self
    }

    /// Attach beta exposures.
    #[must_use]
    pub const fn with_betas(mut self, betas: &'a Array1<f64>) -> Self {
        self.betas = Some(betas);
        self
    }
}

/// Allocates across assets according to [`OptimizationMode`].
#[derive(Debug, Clone)]
pub struct PortfolioOptimizer<S = ProjectedGradientSolver> {
    config: OptimizerConfig,
    solver: S,
}

impl PortfolioOptimizer {
    /// Create an optimizer with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(OptimizerConfig::default())
    }

    /// Create an optimizer with custom configuration.
    #[must_use]
    pub fn with_config(config: OptimizerConfig) -> Self {
        Self { config, solver: ProjectedGradientSolver::default() }
    }
}

impl Default for PortfolioOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: ConvexSolver> PortfolioOptimizer<S> {
    /// Create an optimizer backed by a custom solver.
    #[must_use]
    pub const fn with_solver(config: OptimizerConfig, solver: S) -> Self {
        Self { config, solver }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    /// Allocate using the configured mode.
    ///
    /// # Errors
    /// Returns error when the mode lacks an input, history is too short, the
    /// solver fails, or the solution is degenerate.
    pub fn try_optimize(&self, input: &OptimizationInput<'_>) -> Result<PortfolioWeights, PortfolioError> {
        let panel = input.returns.fill_missing(0.0);
        let symbols = panel.symbols().to_vec();
        if symbols.is_empty() {
            return Err(PortfolioError::InsufficientData { required: 1, actual: 0 });
        }

        match self.config.mode {
            OptimizationMode::Equal => Ok(PortfolioWeights::equal(symbols)),
            OptimizationMode::InverseVolatility => self.inverse_volatility(&panel),
            OptimizationMode::RiskAdjusted => {
                let mu = self.annualized_means(&panel)?;
                let covariance = self.covariance(&panel, input.covariance)?;
                let problem = QuadraticProgram::long_only(mu)
                    .with_quadratic(covariance * self.config.risk_aversion)
                    .with_upper(self.config.max_weight);
                self.solve(symbols, &problem)
            }
            OptimizationMode::FactorMimicking => {
                let factor = input.factor.ok_or_else(|| self.missing("factor"))?;
                let covariance = match input.covariance {
                    Some(c) => c.clone(),
                    None => self.sample_covariance(&panel)?,
                };
                FmpBuilder::with_config(self.config.fmp.clone()).try_build(
                    &panel,
                    factor,
                    &covariance,
                    input.existing_factors,
                )
            }
            OptimizationMode::AlphaOrthogonal => {
                let betas = input.betas.ok_or_else(|| self.missing("betas"))?;
                if betas.len() != symbols.len() {
                    return Err(PortfolioError::DimensionMismatch { expected: symbols.len(), actual: betas.len() });
                }
                let alpha = self.annualized_means(&panel)?;
                self.solve(symbols, &QuadraticProgram::long_only(alpha).neutral_to(betas.clone()))
            }
        }
    }

    /// Total variant of [`Self::try_optimize`]: failures yield equal weights.
    #[must_use]
    pub fn optimize(&self, input: &OptimizationInput<'_>) -> PortfolioWeights {
        self.try_optimize(input).unwrap_or_else(|e| {
            tracing::warn!(mode = %self.config.mode, "portfolio optimisation failed: {e}; using equal weights");
            PortfolioWeights::equal(input.returns.symbols().to_vec())
        })
    }

    fn solve(&self, symbols: Vec<Symbol>, problem: &QuadraticProgram) -> Result<PortfolioWeights, PortfolioError> {
        let w = self.solver.solve(problem)?;
        let total = w.sum();
        if total.is_nan() || total <= self.config.min_weight_sum {
            return Err(PortfolioError::Degenerate(format!("weights sum to {total:.3e}")));
        }
        tracing::debug!(solver = self.solver.name(), objective = problem.objective(&w), "allocation solved");
        Ok(PortfolioWeights::new(symbols, w / total))
    }

    fn inverse_volatility(&self, panel: &ReturnPanel) -> Result<PortfolioWeights, PortfolioError> {
        require_history(panel, 2)?;
        let scale = self.config.annualization.sqrt();
        let inverse: Array1<f64> = panel
            .values()
            .columns()
            .into_iter()
            .map(|column| {
                let vol = stats::std_dev(&column.to_vec(), 1) * scale;
                let vol = if vol > 0.0 && vol.is_finite() { vol } else { self.config.vol_floor };
                1.0 / vol
            })
            .collect();
        let total = inverse.sum();
        Ok(PortfolioWeights::new(panel.symbols().to_vec(), inverse / total))
    }

    fn annualized_means(&self, panel: &ReturnPanel) -> Result<Array1<f64>, PortfolioError> {
        require_history(panel, 1)?;
        let means = panel.values().mean_axis(Axis(0)).ok_or(PortfolioError::InsufficientData {
            required: 1,
            actual: 0,
        })?;
        Ok(means * self.config.annualization)
    }

    fn covariance(&self, panel: &ReturnPanel, supplied: Option<&Array2<f64>>) -> Result<Array2<f64>, PortfolioError> {
        let n = panel.n_assets();
        let raw = match supplied {
            Some(c) if c.dim() == (n, n) => c.clone(),
            Some(c) => return Err(PortfolioError::DimensionMismatch { expected: n, actual: c.nrows() }),
            None => self.sample_covariance(panel)?,
        };
        Ok(try_nearest_psd(&raw, self.config.eigen_floor)?)
    }

    fn sample_covariance(&self, panel: &ReturnPanel) -> Result<Array2<f64>, PortfolioError> {
        require_history(panel, 2)?;
        let values = panel.values();
        let means = values.mean_axis(Axis(0)).ok_or(PortfolioError::InsufficientData { required: 2, actual: 0 })?;
        let centered = values - &means.insert_axis(Axis(0));
        let dof = (values.nrows() - 1) as f64;
        Ok(centered.t().dot(&centered) / dof * self.config.annualization)
    }

    fn missing(&self, input: &str) -> PortfolioError {
        PortfolioError::MissingInput { mode: self.config.mode.to_string(), input: input.to_string() }
    }
}

fn require_history(panel: &ReturnPanel, required: usize) -> Result<(), PortfolioError> {
    if panel.n_dates() < required {
        return Err(PortfolioError::InsufficientData { required, actual: panel.n_dates() });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use meridian_math::invert;
    use meridian_primitives::Date;
    use meridian_risk::{RiskConfig, RiskModel};
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};
    use rand_distr::{Distribution, StandardNormal};
    use rstest::rstest;

    use super::*;

    fn dates(n: usize) -> Vec<Date> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        (0..n).map(|i| start + chrono::Days::new(i as u64)).collect()
    }

    fn panel(values: Array2<f64>) -> ReturnPanel {
        let symbols = (0..values.ncols()).map(|j| Symbol::new(format!("S{j}"))).collect();
        ReturnPanel::new(dates(values.nrows()), symbols, values)
    }

    /// Equicorrelated draws (daily vol `vol`, correlation `rho`), recentred so
    /// column `j` has sample mean `means[j]`.
    fn correlated_panel(means: &[f64], n: usize, vol: f64, rho: f64, seed: u64) -> ReturnPanel {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut draw = || -> f64 { StandardNormal.sample(&mut rng) };
        let mut values = Array2::zeros((n, means.len()));
        for i in 0..n {
            let common = draw();
            for j in 0..means.len() {
                values[[i, j]] = vol * (rho.sqrt() * common + (1.0 - rho).sqrt() * draw());
            }
        }
        let sample_means = values.mean_axis(Axis(0)).unwrap();
        for j in 0..means.len() {
            values.column_mut(j).mapv_inplace(|v| v - sample_means[j] + means[j]);
        }
        panel(values)
    }

    fn optimizer(mode: OptimizationMode) -> PortfolioOptimizer {
        PortfolioOptimizer::with_config(OptimizerConfig { mode, ..OptimizerConfig::default() })
    }

    #[test]
    fn equal_mode() {
        let p = panel(Array2::zeros((5, 4)));
        let w = optimizer(OptimizationMode::Equal).optimize(&OptimizationInput::new(&p));
        assert_relative_eq!(w.weights(), &Array1::from_elem(4, 0.25), epsilon = 1e-12);
    }

    #[test]
    fn inverse_volatility_mode() {
        let p = panel(array![[0.01, 0.02], [-0.01, -0.02], [0.01, 0.02], [-0.01, -0.02]]);
        let w = optimizer(OptimizationMode::InverseVolatility).try_optimize(&OptimizationInput::new(&p)).unwrap();
        assert_relative_eq!(w.get("S0").unwrap(), 2.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(w.get("S1").unwrap(), 1.0 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn zero_volatility_asset_dominates_inverse_volatility() {
        let p = panel(array![[0.0, 0.02], [0.0, -0.02], [0.0, 0.02]]);
        let w = optimizer(OptimizationMode::InverseVolatility).try_optimize(&OptimizationInput::new(&p)).unwrap();
        assert!(w.get("S0").unwrap() > 0.999);
    }

    #[test]
    fn risk_adjusted_respects_cap() {
        let means: Vec<f64> = (0..10).map(|j| 1e-4 * j as f64).collect();
        let p = correlated_panel(&means, 250, 0.01, 0.3, 4);
        let w = optimizer(OptimizationMode::RiskAdjusted).try_optimize(&OptimizationInput::new(&p)).unwrap();

        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-6);
        assert!(w.weights().iter().all(|x| *x >= -1e-12 && *x <= 0.15 + 1e-9));
    }

    #[test]
    fn infeasible_cap_falls_back_to_equal() {
        let p = correlated_panel(&[0.0; 5], 100, 0.01, 0.1, 1);
        let opt = optimizer(OptimizationMode::RiskAdjusted);
        assert!(opt.try_optimize(&OptimizationInput::new(&p)).is_err());
        assert_relative_eq!(opt.optimize(&OptimizationInput::new(&p)).weights(), &Array1::from_elem(5, 0.2), epsilon = 1e-12);
    }

    #[test]
    fn alpha_orthogonal_is_beta_neutral() {
        let p = correlated_panel(&[4e-4, 1e-4, 2e-4], 120, 0.01, 0.2, 6);
        let betas = array![1.0, -1.0, 0.0];
        let input = OptimizationInput::new(&p).with_betas(&betas);
        let w = optimizer(OptimizationMode::AlphaOrthogonal).try_optimize(&input).unwrap();

        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(w.weights().dot(&betas), 0.0, epsilon = 1e-7);
        assert_relative_eq!(w.get("S0").unwrap(), 0.5, epsilon = 1e-6);
    }

    #[rstest]
    #[case::positive_betas(OptimizationMode::AlphaOrthogonal)]
    #[case::missing_factor(OptimizationMode::FactorMimicking)]
    fn unusable_inputs_fall_back_to_equal(#[case] mode: OptimizationMode) {
        let p = correlated_panel(&[1e-4, 2e-4, 3e-4, 4e-4], 60, 0.01, 0.2, 2);
        let betas = array![0.8, 1.0, 1.2, 1.1];
        let input = OptimizationInput::new(&p).with_betas(&betas);
        let opt = optimizer(mode);

        assert!(opt.try_optimize(&input).is_err());
        assert_relative_eq!(opt.optimize(&input).weights(), &Array1::from_elem(4, 0.25), epsilon = 1e-12);
    }

    #[test]
    fn factor_mimicking_delegates_to_fmp() {
        let p = correlated_panel(&[0.0; 3], 200, 0.01, 0.5, 12);
        let factor = ReturnSeries::new(
            p.dates().to_vec(),
            p.values().rows().into_iter().map(|r| r.sum() / 3.0).collect(),
        );
        let input = OptimizationInput::new(&p).with_factor(&factor, &[]);
        let w = optimizer(OptimizationMode::FactorMimicking).try_optimize(&input).unwrap();
        assert_relative_eq!(w.gross(), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn mismatched_covariance_is_rejected() {
        let p = correlated_panel(&[0.0; 3], 30, 0.01, 0.2, 3);
        let cov = Array2::eye(2);
        let input = OptimizationInput::new(&p).with_covariance(&cov);
        let err = optimizer(OptimizationMode::RiskAdjusted).try_optimize(&input).unwrap_err();
        assert!(matches!(err, PortfolioError::DimensionMismatch { expected: 3, actual: 2 }));
    }

    #[test]
    fn shrinkage_covariance_then_risk_adjusted_matches_closed_form() {
        let means: Vec<f64> = (1..=5).map(|j| 2e-6 * j as f64).collect();
        let p = correlated_panel(&means, 300, 0.01, 0.2, 2024);

        let view = RiskModel::with_config(RiskConfig { window: 300, ..RiskConfig::default() })
            .try_estimate(&p, p.symbols())
            .unwrap();
        let covariance = view.covariance().clone();

        let gamma = 0.5;
        let config = OptimizerConfig {
            mode: OptimizationMode::RiskAdjusted,
            risk_aversion: gamma,
            max_weight: 0.30,
            ..OptimizerConfig::default()
        };
        let input = OptimizationInput::new(&p).with_covariance(&covariance);
        let w = PortfolioOptimizer::with_config(config).try_optimize(&input).unwrap();

        // unconstrained optimum of μᵀw - γwᵀΣw subject to Σw = 1
        let mu = p.values().mean_axis(Axis(0)).unwrap() * TRADING_DAYS_PER_YEAR;
        let precision = invert(&covariance).unwrap();
        let ones = Array1::ones(5);
        let p_mu = precision.dot(&mu);
        let p_one = precision.dot(&ones);
        let nu = (p_mu.sum() - 2.0 * gamma) / p_one.sum();
        let expected = (&p_mu - &(p_one * nu)) / (2.0 * gamma);

        assert!(expected.iter().all(|x| *x > 0.0 && *x < 0.30), "cap binds: {expected}");
        assert_relative_eq!(w.weights(), &expected, epsilon = 1e-6);
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-9);
    }
}
