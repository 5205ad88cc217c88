//! Symmetric eigendecomposition and positive semi-definite projection.

use ndarray::{Array1, Array2};

use crate::MathError;

/// Default floor applied to eigenvalues when projecting onto the PSD cone.
pub const DEFAULT_EIGEN_FLOOR: f64 = 1e-10;

const MAX_SWEEPS: usize = 100;

/// Eigendecomposition `A = V diag(λ) Vᵀ` of a symmetric matrix.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, sorted in descending order.
    pub values: Array1<f64>,
    /// Orthonormal eigenvectors stored as columns, matching `values`.
    pub vectors: Array2<f64>,
}

impl SymmetricEigen {
    /// Decompose a symmetric matrix with cyclic Jacobi rotations.
    ///
    /// Only the upper triangle is trusted; the input is symmetrised first.
    ///
    /// # Errors
    /// Returns error if the matrix is empty, not square, contains non-finite
    /// values, or the sweeps fail to converge.
    pub fn new(matrix: &Array2<f64>) -> Result<Self, MathError> {
        let n = matrix.nrows();
        if n == 0 {
            return Err(MathError::EmptyData);
        }
        if matrix.ncols() != n {
            return Err(MathError::LinearAlgebra("matrix must be square".to_string()));
        }
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(MathError::NumericalInstability("non-finite matrix entry".to_string()));
        }

        let mut a = symmetrize(matrix);
        let mut v = Array2::<f64>::eye(n);
        let scale = a.iter().map(|x| x * x).sum::<f64>().sqrt().max(f64::MIN_POSITIVE);

        let mut converged = n == 1;
        for _ in 0..MAX_SWEEPS {
            let off: f64 = (0..n)
                .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
                .map(|(i, j)| a[[i, j]] * a[[i, j]])
                .sum::<f64>()
                .sqrt();
            if off <= 1e-15 * scale {
                converged = true;
                break;
            }

            for p in 0..n {
                for q in (p + 1)..n {
                    let apq = a[[p, q]];
                    if apq.abs() <= f64::MIN_POSITIVE {
                        continue;
                    }
                    let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                    let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
                    let t = if theta == 0.0 { 1.0 } else { t };
                    let c = 1.0 / (t * t + 1.0).sqrt();
                    let s = t * c;

                    for k in 0..n {
                        let akp = a[[k, p]];
                        let akq = a[[k, q]];
                        a[[k, p]] = c * akp - s * akq;
                        a[[k, q]] = s * akp + c * akq;
                    }
                    for k in 0..n {
                        let apk = a[[p, k]];
                        let aqk = a[[q, k]];
                        a[[p, k]] = c * apk - s * aqk;
                        a[[q, k]] = s * apk + c * aqk;
                    }
                    for k in 0..n {
                        let vkp = v[[k, p]];
                        let vkq = v[[k, q]];
                        v[[k, p]] = c * vkp - s * vkq;
                        v[[k, q]] = s * vkp + c * vkq;
                    }
                }
            }
        }

        if !converged {
            return Err(MathError::LinearAlgebra(format!(
                "Jacobi eigendecomposition did not converge in {MAX_SWEEPS} sweeps"
            )));
        }

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| a[[j, j]].total_cmp(&a[[i, i]]));

        let values = order.iter().map(|&i| a[[i, i]]).collect();
        let mut vectors = Array2::zeros((n, n));
        for (dst, &src) in order.iter().enumerate() {
            vectors.column_mut(dst).assign(&v.column(src));
        }

        Ok(Self { values, vectors })
    }

    /// Rebuild `V diag(f(λ)) Vᵀ`.
    #[must_use]
    pub fn reconstruct_with(&self, f: impl Fn(f64) -> f64) -> Array2<f64> {
        let scaled_values = self.values.mapv(f);
        let scaled = &self.vectors * &scaled_values.view().insert_axis(ndarray::Axis(0));
        symmetrize(&scaled.dot(&self.vectors.t()))
    }

    /// Smallest eigenvalue.
    #[must_use]
    pub fn min_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest eigenvalue.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Return `(A + Aᵀ) / 2`.
#[must_use]
pub fn symmetrize(matrix: &Array2<f64>) -> Array2<f64> {
    (matrix + &matrix.t()) / 2.0
}

/// Project a symmetric matrix onto the nearest PSD matrix.
///
/// Eigenvalues below `floor` are raised to `floor` and the matrix is rebuilt
/// from its eigenvectors, then symmetrised.
///
/// # Errors
/// Returns error if the eigendecomposition fails.
pub fn try_nearest_psd(matrix: &Array2<f64>, floor: f64) -> Result<Array2<f64>, MathError> {
    let eigen = SymmetricEigen::new(matrix)?;
    Ok(eigen.reconstruct_with(|lambda| lambda.max(floor)))
}

/// Nearest PSD matrix with the default floor, falling back to identity on failure.
#[must_use]
pub fn nearest_psd(matrix: &Array2<f64>) -> Array2<f64> {
    match try_nearest_psd(matrix, DEFAULT_EIGEN_FLOOR) {
        Ok(psd) => psd,
        Err(e) => {
            tracing::warn!("PSD correction failed: {e}; falling back to identity");
            Array2::eye(matrix.nrows())
        }
    }
}

/// Smallest eigenvalue of a symmetric matrix.
///
/// # Errors
/// Returns error if the eigendecomposition fails.
pub fn min_eigenvalue(matrix: &Array2<f64>) -> Result<f64, MathError> {
    Ok(SymmetricEigen::new(matrix)?.min_value())
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use ndarray::array;
    use rstest::rstest;

    use super::*;

    #[test]
    fn diagonal_matrix_eigenvalues() {
        let a = array![[3.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 2.0]];
        let eigen = SymmetricEigen::new(&a).unwrap();
        assert_eq!(eigen.values.to_vec(), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn two_by_two_known_spectrum() {
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let eigen = SymmetricEigen::new(&a).unwrap();
        assert_relative_eq!(eigen.values[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(eigen.values[1], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn reconstruction_is_exact_for_psd_input() {
        let a = array![[4.0, 1.2, 0.3, 0.0], [1.2, 3.0, 0.5, 0.1], [0.3, 0.5, 2.0, 0.4], [0.0, 0.1, 0.4, 1.0]];
        let eigen = SymmetricEigen::new(&a).unwrap();
        let rebuilt = eigen.reconstruct_with(|l| l);
        for (x, y) in a.iter().zip(rebuilt.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-10);
        }
        let vtv = eigen.vectors.t().dot(&eigen.vectors);
        for i in 0..4 {
            assert_relative_eq!(vtv[[i, i]], 1.0, epsilon = 1e-10);
        }
    }

    #[rstest]
    #[case(array![[1.0, 2.0], [2.0, 1.0]])]
    #[case(array![[1.0, 0.9, -0.9], [0.9, 1.0, 0.9], [-0.9, 0.9, 1.0]])]
    fn nearest_psd_removes_negative_eigenvalues(#[case] a: Array2<f64>) {
        assert!(min_eigenvalue(&a).unwrap() < 0.0);
        let psd = nearest_psd(&a);
        assert!(min_eigenvalue(&psd).unwrap() >= -1e-9);
        for i in 0..psd.nrows() {
            for j in 0..psd.ncols() {
                assert_relative_eq!(psd[[i, j]], psd[[j, i]], epsilon = 1e-14);
            }
        }
    }

    #[test]
    fn non_finite_input_falls_back_to_identity() {
        let a = array![[1.0, f64::NAN], [f64::NAN, 1.0]];
        assert_eq!(nearest_psd(&a), Array2::<f64>::eye(2));
    }
}
