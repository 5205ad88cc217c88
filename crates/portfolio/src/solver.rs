//! Projected-gradient solver for box-bounded budget programs.

use meridian_traits::{ConvexSolver, QuadraticProgram, SolverError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Configuration for [`ProjectedGradientSolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Gradient iterations before giving up.
    pub max_iterations: usize,
    /// Converged once no weight moves by more than this in one iteration.
    pub tolerance: f64,
    /// Bisection steps per dual variable in the projection.
    pub bisection_iterations: usize,
    /// Largest residual exposure accepted for neutrality constraints.
    pub neutrality_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self { max_iterations: 20_000, tolerance: 1e-11, bisection_iterations: 200, neutrality_tolerance: 1e-8 }
    }
}

/// Projected gradient ascent with an exact Euclidean projection onto
/// `{Σw = budget, lower ≤ w ≤ upper}`, intersected with `{bᵀw = 0}` when the
/// program carries a neutrality constraint.
///
/// The projection is solved through its duals: the budget multiplier by
/// bisection on the clipped sum, and the neutrality multiplier by an outer
/// bisection on the (monotone) residual exposure.
#[derive(Debug, Clone, Default)]
pub struct ProjectedGradientSolver {
    config: SolverConfig,
}

impl ProjectedGradientSolver {
    /// Create a solver with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with custom configuration.
    #[must_use]
    pub const fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Euclidean projection of `v` onto the feasible set of `problem`.
    ///
    /// # Errors
    /// Returns `SolverError::Infeasible` if the neutrality constraint cannot be met.
    pub fn project(&self, v: &Array1<f64>, problem: &QuadraticProgram) -> Result<Array1<f64>, SolverError> {
        let Some(b) = &problem.neutral_to else {
            return Ok(self.project_budget(v, problem));
        };

        let at = |mu: f64| {
            let w = self.project_budget(&(v - &(b * mu)), problem);
            (b.dot(&w), w)
        };

        // exposure is non-increasing in the multiplier
        let (mut lo, mut hi) = (-1.0_f64, 1.0_f64);
        let mut doublings = 0;
        while at(lo).0 < 0.0 || at(hi).0 > 0.0 {
            if doublings == 64 {
                return Err(SolverError::Infeasible(
                    "no feasible point has zero exposure".to_string(),
                ));
            }
            lo *= 2.0;
            hi *= 2.0;
            doublings += 1;
        }

        for _ in 0..self.config.bisection_iterations {
            let mid = 0.5 * (lo + hi);
            if at(mid).0 > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * mid.abs().max(1.0) {
                break;
            }
        }

        let (exposure, w) = at(0.5 * (lo + hi));
        let scale = b.iter().fold(1.0_f64, |acc, x| acc.max(x.abs()));
        if exposure.abs() > self.config.neutrality_tolerance * scale {
            return Err(SolverError::Infeasible(format!("residual exposure {exposure:.3e}")));
        }
        Ok(w)
    }

    fn project_budget(&self, v: &Array1<f64>, problem: &QuadraticProgram) -> Array1<f64> {
        let (lower, upper) = (problem.lower, problem.upper);
        let clipped_sum = |lambda: f64| v.iter().map(|x| (x - lambda).clamp(lower, upper)).sum::<f64>();

        let v_min = v.iter().copied().fold(f64::INFINITY, f64::min);
        let v_max = v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let (mut lo, mut hi) = (v_min - upper, v_max - lower);

        for _ in 0..self.config.bisection_iterations {
            let mid = 0.5 * (lo + hi);
            if clipped_sum(mid) > problem.budget {
                lo = mid;
            } else {
                hi = mid;
            }
            if hi - lo <= f64::EPSILON * mid.abs().max(1.0) {
                break;
            }
        }

        let lambda = 0.5 * (lo + hi);
        v.mapv(|x| (x - lambda).clamp(lower, upper))
    }
}

impl ConvexSolver for ProjectedGradientSolver {
    fn solve(&self, problem: &QuadraticProgram) -> Result<Array1<f64>, SolverError> {
        problem.validate()?;
        let n = problem.dim();

        let curvature = problem.quadratic.as_ref().map_or(0.0, |q| 2.0 * gershgorin_bound(q));
        let step = if curvature > f64::EPSILON {
            1.0 / curvature
        } else {
            1.0 / problem.linear.iter().fold(f64::EPSILON, |acc, c| acc.max(c.abs()))
        };

        let mut w = self.project(&Array1::from_elem(n, problem.budget / n as f64), problem)?;
        let mut change = f64::INFINITY;
        for iteration in 0..self.config.max_iterations {
            let next = self.project(&(&w + &(gradient(problem, &w) * step)), problem)?;
            change = (&next - &w).iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));
            w = next;
            if change <= self.config.tolerance {
                tracing::debug!(
                    iterations = iteration + 1,
                    objective = problem.objective(&w),
                    "projected gradient converged"
                );
                return Ok(w);
            }
        }

        Err(SolverError::NotConverged { iterations: self.config.max_iterations, step: change })
    }

    fn name(&self) -> &str {
        "ProjectedGradient"
    }
}

/// Gradient of `cᵀw - wᵀQw`.
fn gradient(problem: &QuadraticProgram, w: &Array1<f64>) -> Array1<f64> {
    match &problem.quadratic {
        Some(q) => &problem.linear - &(q.dot(w) * 2.0),
        None => problem.linear.clone(),
    }
}

/// Upper bound on the largest eigenvalue: the maximum absolute row sum.
fn gershgorin_bound(q: &Array2<f64>) -> f64 {
    q.rows().into_iter().map(|row| row.iter().map(|x| x.abs()).sum::<f64>()).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn linear_program_picks_best_asset() {
        let qp = QuadraticProgram::long_only(array![0.1, 0.3, 0.2]);
        let w = ProjectedGradientSolver::new().solve(&qp).unwrap();
        assert_relative_eq!(w, array![0.0, 1.0, 0.0], epsilon = 1e-9);
    }

    #[test]
    fn cap_spreads_weight() {
        let qp = QuadraticProgram::long_only(array![0.1, 0.3, 0.2]).with_upper(0.5);
        let w = ProjectedGradientSolver::new().solve(&qp).unwrap();
        assert_relative_eq!(w, array![0.0, 0.5, 0.5], epsilon = 1e-9);
    }

    #[test]
    fn pure_risk_minimisation_is_equal_weight() {
        let qp = QuadraticProgram::long_only(Array1::zeros(4)).with_quadratic(Array2::eye(4));
        let w = ProjectedGradientSolver::new().solve(&qp).unwrap();
        assert_relative_eq!(w, Array1::from_elem(4, 0.25), epsilon = 1e-9);
    }

    #[test]
    fn mean_variance_matches_closed_form() {
        // interior optimum of cᵀw - wᵀw with Σw = 1: w = (c - ν) / 2
        let c = array![0.5, 0.4, 0.3];
        let qp = QuadraticProgram::long_only(c.clone()).with_quadratic(Array2::eye(3));
        let w = ProjectedGradientSolver::new().solve(&qp).unwrap();
        let nu = (c.sum() - 2.0) / 3.0;
        assert_relative_eq!(w, (&c - nu) / 2.0, epsilon = 1e-8);
    }

    #[test]
    fn neutrality_is_enforced() {
        let qp = QuadraticProgram::long_only(array![0.4, 0.1, 0.2])
            .with_upper(0.4)
            .neutral_to(array![1.0, -1.0, 0.0]);
        let w = ProjectedGradientSolver::new().solve(&qp).unwrap();
        assert_relative_eq!(w, array![0.4, 0.4, 0.2], epsilon = 1e-7);
    }

    #[rstest]
    #[case::all_positive(array![1.0, 0.5, 2.0])]
    #[case::all_negative(array![-1.0, -0.5, -2.0])]
    fn one_signed_exposure_cannot_be_neutralised(#[case] betas: Array1<f64>) {
        let qp = QuadraticProgram::long_only(array![0.1, 0.2, 0.3]).neutral_to(betas);
        assert!(matches!(ProjectedGradientSolver::new().solve(&qp), Err(SolverError::Infeasible(_))));
    }

    #[test]
    fn projection_respects_box_and_budget() {
        let qp = QuadraticProgram::long_only(Array1::zeros(4)).with_upper(0.4);
        let w = ProjectedGradientSolver::new().project(&array![2.0, -1.0, 0.3, 0.35], &qp).unwrap();
        assert_relative_eq!(w.sum(), 1.0, epsilon = 1e-12);
        assert!(w.iter().all(|x| (0.0..=0.4).contains(x)));
        assert_relative_eq!(w[0], 0.4, epsilon = 1e-12);
        assert_relative_eq!(w[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn iteration_limit_is_reported() {
        let solver = ProjectedGradientSolver::with_config(SolverConfig { max_iterations: 1, ..SolverConfig::default() });
        let qp = QuadraticProgram::long_only(array![0.5, 0.4, 0.3]).with_quadratic(Array2::eye(3));
        assert!(matches!(solver.solve(&qp), Err(SolverError::NotConverged { iterations: 1, .. })));
    }
}
