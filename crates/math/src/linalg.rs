//! Linear algebra: dense solves, inversion, and least-squares fits.

use ndarray::{Array1, Array2, Axis, s};

use crate::MathError;

/// Pivot magnitude below which a system is treated as singular.
const PIVOT_TOLERANCE: f64 = 1e-14;

/// Result of a least-squares regression.
#[derive(Debug, Clone)]
pub struct WlsResult {
    /// Estimated coefficients.
    pub coefficients: Array1<f64>,
    /// Residuals.
    pub residuals: Array1<f64>,
    /// R-squared.
    pub r_squared: f64,
}

/// Result of an ordinary least-squares fit with intercept.
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Intercept term.
    pub intercept: f64,
    /// Slope coefficients, one per regressor column.
    pub coefficients: Array1<f64>,
    /// In-sample residuals.
    pub residuals: Array1<f64>,
}

impl OlsFit {
    /// Fitted values for a new design matrix.
    #[must_use]
    pub fn predict(&self, x: &Array2<f64>) -> Array1<f64> {
        x.dot(&self.coefficients) + self.intercept
    }
}

/// Perform weighted least squares regression.
///
/// Solves: argmin_beta sum(w_i * (y_i - X_i * beta)^2)
///
/// # Arguments
/// * `y` - Response vector (n,)
/// * `x` - Design matrix (n x p)
/// * `weights` - Weight vector (n,), applied as multipliers on rows
///
/// # Returns
/// WLS result with coefficients and residuals.
///
/// # Errors
/// Returns error if dimensions mismatch or matrix is singular.
pub fn weighted_least_squares(
    y: &Array1<f64>,
    x: &Array2<f64>,
    weights: &Array1<f64>,
) -> Result<WlsResult, MathError> {
    let n = y.len();

    if x.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: x.nrows() });
    }
    if weights.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: weights.len() });
    }
    if n == 0 {
        return Err(MathError::EmptyData);
    }

    let y_weighted = y * weights;
    let x_weighted = x * &weights.view().insert_axis(Axis(1));

    let xtx = x_weighted.t().dot(&x_weighted);
    let xty = x_weighted.t().dot(&y_weighted);
    let coefficients = solve_linear_system(&xtx, &xty)?;

    let fitted = x.dot(&coefficients);
    let residuals = y - &fitted;

    let y_mean = y.mean().unwrap_or(0.0);
    let ss_tot: f64 = y.iter().map(|yi| (yi - y_mean).powi(2)).sum();
    let ss_res: f64 = residuals.iter().map(|r| r.powi(2)).sum();
    let r_squared = if ss_tot > 0.0 { 1.0 - ss_res / ss_tot } else { 0.0 };

    Ok(WlsResult { coefficients, residuals, r_squared })
}

/// Ordinary least squares of `y` on the columns of `x` plus an intercept.
///
/// # Errors
/// Returns error if dimensions mismatch, there are fewer rows than unknowns,
/// or the design is rank deficient.
pub fn ols(y: &Array1<f64>, x: &Array2<f64>) -> Result<OlsFit, MathError> {
    let (n, p) = x.dim();
    if y.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: y.len() });
    }
    if n < p + 1 {
        return Err(MathError::InsufficientData { required: p + 1, actual: n });
    }

    let mut design = Array2::ones((n, p + 1));
    design.slice_mut(s![.., 1..]).assign(x);
    let fit = weighted_least_squares(y, &design, &Array1::ones(n))?;

    Ok(OlsFit {
        intercept: fit.coefficients[0],
        coefficients: fit.coefficients.slice(s![1..]).to_owned(),
        residuals: fit.residuals,
    })
}

/// Slope and intercept of a simple linear regression of `y` on `x`.
///
/// # Errors
/// Returns error if lengths differ, fewer than two points are given, or `x` is constant.
pub fn simple_regression(x: &[f64], y: &[f64]) -> Result<(f64, f64), MathError> {
    if x.len() != y.len() {
        return Err(MathError::DimensionMismatch { expected: x.len(), actual: y.len() });
    }
    if x.len() < 2 {
        return Err(MathError::InsufficientData { required: 2, actual: x.len() });
    }
    let n = x.len() as f64;
    let mx = x.iter().sum::<f64>() / n;
    let my = y.iter().sum::<f64>() / n;
    let sxx: f64 = x.iter().map(|v| (v - mx).powi(2)).sum();
    let sxy: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    if sxx <= f64::EPSILON * n {
        return Err(MathError::Singular);
    }
    let slope = sxy / sxx;
    Ok((slope, my - slope * mx))
}

/// Ridge regression with an unpenalised intercept.
///
/// Centers `x` and `y`, solves `(XᵀX + αI)β = Xᵀy`, and recovers the
/// intercept from the means.
///
/// # Returns
/// Tuple of (coefficients, intercept).
///
/// # Errors
/// Returns error if dimensions mismatch, data is empty, or the system is singular.
pub fn ridge(y: &Array1<f64>, x: &Array2<f64>, alpha: f64) -> Result<(Array1<f64>, f64), MathError> {
    let (n, p) = x.dim();
    if y.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: y.len() });
    }
    if n == 0 || p == 0 {
        return Err(MathError::EmptyData);
    }

    let x_mean = x.mean_axis(Axis(0)).ok_or(MathError::EmptyData)?;
    let y_mean = y.mean().unwrap_or(0.0);
    let xc = x - &x_mean.view().insert_axis(Axis(0));
    let yc = y - y_mean;

    let mut gram = xc.t().dot(&xc);
    for i in 0..p {
        gram[[i, i]] += alpha;
    }
    let coefficients = solve_linear_system(&gram, &xc.t().dot(&yc))?;
    let intercept = y_mean - x_mean.dot(&coefficients);

    Ok((coefficients, intercept))
}

/// Solve a linear system Ax = b using Gaussian elimination with partial pivoting.
///
/// # Errors
/// Returns error if `a` is not square, sizes mismatch, or `a` is singular.
pub fn solve_linear_system(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, MathError> {
    let n = a.nrows();
    if b.len() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.len() });
    }
    let rhs = b.view().insert_axis(Axis(1)).to_owned();
    let solution = solve_multiple(a, &rhs)?;
    Ok(solution.column(0).to_owned())
}

/// Invert a square matrix.
///
/// # Errors
/// Returns error if the matrix is empty, not square, or singular.
pub fn invert(a: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    solve_multiple(a, &Array2::eye(a.nrows()))
}

/// Solve `A X = B` for a matrix right-hand side.
fn solve_multiple(a: &Array2<f64>, b: &Array2<f64>) -> Result<Array2<f64>, MathError> {
    let n = a.nrows();
    if n == 0 {
        return Err(MathError::EmptyData);
    }
    if a.ncols() != n {
        return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
    }
    if b.nrows() != n {
        return Err(MathError::DimensionMismatch { expected: n, actual: b.nrows() });
    }
    if a.iter().chain(b.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::NumericalInstability("non-finite entry in linear system".to_string()));
    }

    let m = b.ncols();
    let mut lhs = a.clone();
    let mut rhs = b.clone();

    for col in 0..n {
        let mut max_row = col;
        let mut max_val = lhs[[col, col]].abs();
        for row in (col + 1)..n {
            if lhs[[row, col]].abs() > max_val {
                max_val = lhs[[row, col]].abs();
                max_row = row;
            }
        }

        if max_val < PIVOT_TOLERANCE {
            return Err(MathError::Singular);
        }

        if max_row != col {
            for j in 0..n {
                lhs.swap([col, j], [max_row, j]);
            }
            for j in 0..m {
                rhs.swap([col, j], [max_row, j]);
            }
        }

        for row in (col + 1)..n {
            let factor = lhs[[row, col]] / lhs[[col, col]];
            if factor == 0.0 {
                continue;
            }
            for j in col..n {
                lhs[[row, j]] -= factor * lhs[[col, j]];
            }
            for j in 0..m {
                rhs[[row, j]] -= factor * rhs[[col, j]];
            }
        }
    }

    let mut x = Array2::zeros((n, m));
    for k in 0..m {
        for i in (0..n).rev() {
            let mut sum = rhs[[i, k]];
            for j in (i + 1)..n {
                sum -= lhs[[i, j]] * x[[j, k]];
            }
            x[[i, k]] = sum / lhs[[i, i]];
        }
    }

    Ok(x)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn wls_simple_regression() {
        let y = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let x =
            Array2::from_shape_vec((5, 2), vec![1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0, 1.0, 5.0])
                .unwrap();
        let weights = array![1.0, 1.0, 1.0, 1.0, 1.0];

        let result = weighted_least_squares(&y, &x, &weights).unwrap();

        assert_relative_eq!(result.coefficients[0], 0.0, epsilon = 1e-10);
        assert_relative_eq!(result.coefficients[1], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.r_squared, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn wls_downweights_outlier() {
        let y = array![1.0, 2.0, 3.0, 4.0, 100.0];
        let x =
            Array2::from_shape_vec((5, 2), vec![1.0, 1.0, 1.0, 2.0, 1.0, 3.0, 1.0, 4.0, 1.0, 5.0])
                .unwrap();
        let weights = array![1.0, 1.0, 1.0, 1.0, 0.001];

        let result = weighted_least_squares(&y, &x, &weights).unwrap();

        assert_relative_eq!(result.coefficients[1], 1.0, epsilon = 0.1);
    }

    #[test]
    fn ols_recovers_intercept_and_slopes() {
        let x = array![[1.0, 0.0], [2.0, 1.0], [3.0, 0.0], [4.0, 1.0], [5.0, 3.0]];
        let y = x.column(0).mapv(|v| 2.0 * v) - x.column(1).mapv(|v| 0.5 * v) + 1.0;

        let fit = ols(&y, &x).unwrap();

        assert_relative_eq!(fit.intercept, 1.0, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(fit.coefficients[1], -0.5, epsilon = 1e-10);
        assert!(fit.residuals.iter().all(|r| r.abs() < 1e-10));
        assert_relative_eq!(fit.predict(&array![[0.0, 0.0]])[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn simple_regression_rejects_constant_regressor() {
        let (slope, intercept) = simple_regression(&[1.0, 2.0, 3.0], &[3.0, 5.0, 7.0]).unwrap();
        assert_relative_eq!(slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(intercept, 1.0, epsilon = 1e-12);

        assert!(matches!(simple_regression(&[1.0, 1.0], &[0.0, 1.0]), Err(MathError::Singular)));
    }

    #[test]
    fn ridge_zero_alpha_matches_ols() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];
        let (coef, intercept) = ridge(&y, &x, 0.0).unwrap();
        assert_relative_eq!(coef[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(intercept, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn ridge_shrinks_towards_zero() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = array![3.0, 5.0, 7.0, 9.0];
        // Sxx = 5, Sxy = 10, beta = 10 / (5 + alpha)
        let (coef, _) = ridge(&y, &x, 5.0).unwrap();
        assert_relative_eq!(coef[0], 1.0, epsilon = 1e-10);
    }

    #[test]
    fn invert_round_trip() {
        let a = array![[4.0, 1.0, 0.5], [1.0, 3.0, 0.2], [0.5, 0.2, 2.0]];
        let inv = invert(&a).unwrap();
        let product = a.dot(&inv);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(product[[i, j]], if i == j { 1.0 } else { 0.0 }, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn singular_matrix_is_rejected() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(matches!(invert(&a), Err(MathError::Singular)));
    }
}
