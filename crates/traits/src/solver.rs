//! Convex solver interface for long-only allocation problems.

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Errors reported by a convex solver.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// No point satisfies the constraints.
    #[error("infeasible problem: {0}")]
    Infeasible(String),

    /// Iteration limit reached before convergence.
    #[error("solver did not converge after {iterations} iterations (last step {step:.3e})")]
    NotConverged {
        /// Iterations performed.
        iterations: usize,
        /// Size of the last update.
        step: f64,
    },

    /// Problem data is malformed.
    #[error("invalid problem: {0}")]
    InvalidProblem(String),
}

/// A concave quadratic maximisation over a box-bounded budget set.
///
/// maximise `cᵀw - wᵀQw`
/// subject to `Σw = budget`, `lower ≤ w ≤ upper`, and optionally `bᵀw = 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadraticProgram {
    /// Linear reward `c`.
    pub linear: Array1<f64>,
    /// Positive semi-definite penalty `Q` (already scaled by risk aversion).
    pub quadratic: Option<Array2<f64>>,
    /// Required sum of weights.
    pub budget: f64,
    /// Per-asset lower bound.
    pub lower: f64,
    /// Per-asset upper bound.
    pub upper: f64,
    /// Exposure vector `b` that the solution must be neutral to.
    pub neutral_to: Option<Array1<f64>>,
}

impl QuadraticProgram {
    /// Fully invested, long-only linear program over `linear`.
    #[must_use]
    pub fn long_only(linear: Array1<f64>) -> Self {
        Self { linear, quadratic: None, budget: 1.0, lower: 0.0, upper: 1.0, neutral_to: None }
    }

    /// Add a quadratic penalty.
    #[must_use]
    pub fn with_quadratic(mut self, quadratic: Array2<f64>) -> Self {
        self.quadratic = Some(quadratic);
        self
    }

    /// Cap every weight at `upper`.
    #[must_use]
    pub const fn with_upper(mut self, upper: f64) -> Self {
        self.upper = upper;
        self
    }

    /// Require zero exposure to `exposures`.
    #[must_use]
    pub fn neutral_to(mut self, exposures: Array1<f64>) -> Self {
        self.neutral_to = Some(exposures);
        self
    }

    /// Number of decision variables.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.linear.len()
    }

    /// Objective value at `w`.
    #[must_use]
    pub fn objective(&self, w: &Array1<f64>) -> f64 {
        let reward = self.linear.dot(w);
        let penalty = self.quadratic.as_ref().map_or(0.0, |q| w.dot(&q.dot(w)));
        reward - penalty
    }

    /// Check shapes and that the box admits the budget.
    ///
    /// # Errors
    /// Returns `SolverError::InvalidProblem` or `SolverError::Infeasible`.
    pub fn validate(&self) -> Result<(), SolverError> {
        let n = self.dim();
        if n == 0 {
            return Err(SolverError::InvalidProblem("no decision variables".to_string()));
        }
        if let Some(q) = &self.quadratic {
            if q.dim() != (n, n) {
                return Err(SolverError::InvalidProblem(format!(
                    "quadratic term is {:?}, expected ({n}, {n})",
                    q.dim()
                )));
            }
        }
        if let Some(b) = &self.neutral_to {
            if b.len() != n {
                return Err(SolverError::InvalidProblem(format!(
                    "exposure vector has {} entries, expected {n}",
                    b.len()
                )));
            }
        }
        if self.lower > self.upper {
            return Err(SolverError::Infeasible("lower bound exceeds upper bound".to_string()));
        }
        let n = n as f64;
        if n * self.upper < self.budget - 1e-12 || n * self.lower > self.budget + 1e-12 {
            return Err(SolverError::Infeasible(format!(
                "bounds [{}, {}] cannot reach budget {} with {n} assets",
                self.lower, self.upper, self.budget
            )));
        }
        if self.linear.iter().any(|v| !v.is_finite()) {
            return Err(SolverError::InvalidProblem("non-finite linear term".to_string()));
        }
        Ok(())
    }
}

/// Solves [`QuadraticProgram`]s.
pub trait ConvexSolver: Send + Sync {
    /// Solve the program, returning the optimal weights.
    ///
    /// # Errors
    /// Returns `SolverError` if the problem is infeasible or the solver does not converge.
    fn solve(&self, problem: &QuadraticProgram) -> Result<Array1<f64>, SolverError>;

    /// Returns the name of this solver.
    fn name(&self) -> &str;
}
