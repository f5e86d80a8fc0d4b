//! Direct solve, Gram-Schmidt QR and the QR eigenvalue algorithm.

use log::{debug, trace, warn};

use crate::error::MatrixError;
use crate::math::matrix::Matrix;

/// Upper bound on QR-algorithm iterations.
pub const EIGEN_MAX_ITERATIONS: usize = 2000;

/// The QR iteration stops once the change metric drops below this value.
pub const EIGEN_TOLERANCE: f64 = 1e-5;

/// Thin QR factorization `A = Q·R`.
///
/// For an `m × n` input (`m >= n`) `q` is `m × n` with orthonormal columns
/// and `r` is `n × n` upper triangular.
#[derive(Debug, Clone, PartialEq)]
pub struct Qr {
    pub q: Matrix,
    pub r: Matrix,
}

/// Result of [`Matrix::eigen_decompose`].
#[derive(Debug, Clone, PartialEq)]
pub struct Eigen {
    /// Final iterate; its diagonal holds the eigenvalues.
    pub values: Matrix,
    /// Accumulated product of the Q factors; its columns are the eigenvectors.
    pub vectors: Matrix,
    pub iterations: usize,
    pub converged: bool,
}

impl Eigen {
    /// Diagonal of `values`.
    pub fn eigenvalues(&self) -> Vec<f64> {
        (0..self.values.rows).map(|i| self.values.data[i][i]).collect()
    }
}

impl Matrix {
    /// Solves `self · x = rhs` for square `self` and a single-column `rhs`
    /// using Gaussian elimination with partial pivoting.
    ///
    /// Only an exact-zero pivot is treated as singular; near-singular systems
    /// produce whatever the arithmetic yields.
    pub fn solve(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        self.ensure_non_empty()?;
        let n = self.rows;
        if self.cols != n || rhs.rows != n || rhs.cols != 1 {
            return Err(MatrixError::Dimension {
                op: "solve",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        // Eliminate on copies; the operands stay untouched.
        let mut a = self.clone();
        let mut b = rhs.clone();

        for i in 0..n {
            let mut max = i;
            for j in (i + 1)..n {
                if a.data[j][i].abs() > a.data[max][i].abs() {
                    max = j;
                }
            }
            a.swap_rows(i, max);
            b.swap_rows(i, max);

            let pivot = a.data[i][i];
            if pivot == 0.0 {
                return Err(MatrixError::Singular { column: i });
            }

            for j in (i + 1)..n {
                let m = a.data[j][i] / pivot;
                b.data[j][0] -= b.data[i][0] * m;
                for k in (i + 1)..n {
                    a.data[j][k] -= a.data[i][k] * m;
                }
                a.data[j][i] = 0.0;
            }
        }

        let mut x = Matrix::zeros(n, 1);
        for j in (0..n).rev() {
            let t: f64 = ((j + 1)..n).map(|k| a.data[j][k] * x.data[k][0]).sum();
            x.data[j][0] = (b.data[j][0] - t) / a.data[j][j];
        }
        Ok(x)
    }

    /// Classical Gram-Schmidt QR factorization.
    ///
    /// Columns that are linear combinations of earlier ones leave a zero
    /// residual and yield NaN entries; rank is not checked.
    pub fn qr_decompose(&self) -> Result<Qr, MatrixError> {
        self.ensure_non_empty()?;
        if self.rows < self.cols {
            return Err(MatrixError::Dimension {
                op: "qr_decompose",
                left: self.shape(),
                right: self.shape(),
            });
        }

        let mut q = Matrix::zeros(self.rows, self.cols);
        let mut r = Matrix::zeros(self.cols, self.cols);

        for i in 0..self.cols {
            let a_i = self.column(i)?;
            let mut residual = a_i.clone();

            for j in 0..i {
                let q_j = q.column(j)?;
                let factor = q_j.dot(&a_i)?;
                r.data[j][i] = factor;
                residual = residual.sub(&q_j.scale(factor))?;
            }

            let norm = residual.norm();
            q.set_column(i, &residual.scale(1.0 / norm))?;
            r.data[i][i] = norm;
        }

        Ok(Qr { q, r })
    }

    /// Eigen-decomposition of a square (expected symmetric) matrix by the
    /// unshifted QR algorithm: `A_{k+1} = R_k · Q_k`, `S_{k+1} = S_k · Q_k`.
    ///
    /// Convergence is measured as `100 · Σ|Q_k − Q_{k-1}| / n²`, the mean
    /// percentage change between successive Q factors.
    pub fn eigen_decompose(&self) -> Result<Eigen, MatrixError> {
        self.ensure_non_empty()?;
        if self.rows != self.cols {
            return Err(MatrixError::Dimension {
                op: "eigen_decompose",
                left: self.shape(),
                right: self.shape(),
            });
        }

        let n = self.rows;
        let mut ap = self.clone();
        let mut s = Matrix::identity(n);
        let mut previous_q = Matrix::zeros(n, n);
        let mut change = f64::INFINITY;
        let mut iterations = 0;

        while change > EIGEN_TOLERANCE && iterations < EIGEN_MAX_ITERATIONS {
            let Qr { q, r } = ap.qr_decompose()?;
            s = s.matmul(&q)?;
            change = q
                .sub(&previous_q)?
                .data
                .iter()
                .flatten()
                .map(|x| x.abs())
                .sum::<f64>()
                * 100.0
                / (n * n) as f64;
            ap = r.matmul(&q)?;
            previous_q = q;
            iterations += 1;
            trace!("eigen iteration {iterations}: change {change:e}");
        }

        // NaN compares false against the tolerance too, so test for success.
        let converged = change <= EIGEN_TOLERANCE;
        if converged {
            debug!("eigen decomposition converged after {iterations} iterations");
        } else {
            warn!("eigen decomposition stopped after {iterations} iterations, last change {change:e}");
        }

        Ok(Eigen {
            values: ap,
            vectors: s,
            iterations,
            converged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(data: Vec<Vec<f64>>) -> Matrix {
        Matrix::from_data(data).unwrap()
    }

    #[test]
    fn solve_recovers_known_solution() {
        let a = m(vec![
            vec![2.0, 1.0, -1.0],
            vec![-3.0, -1.0, 2.0],
            vec![-2.0, 1.0, 2.0],
        ]);
        let b = Matrix::column_vector(&[8.0, -11.0, -3.0]);
        let x = a.solve(&b).unwrap();
        assert!(x.approx_eq(&Matrix::column_vector(&[2.0, 3.0, -1.0]), 1e-12));
        assert!(a.matmul(&x).unwrap().approx_eq(&b, 1e-12));
    }

    #[test]
    fn solve_pivots_past_leading_zero() {
        let a = m(vec![vec![0.0, 1.0], vec![1.0, 0.0]]);
        let b = Matrix::column_vector(&[3.0, 4.0]);
        assert_eq!(a.solve(&b).unwrap(), Matrix::column_vector(&[4.0, 3.0]));
    }

    #[test]
    fn solve_reports_singular_without_touching_operands() {
        let a = m(vec![vec![0.0, 0.0], vec![0.0, 1.0]]);
        let b = Matrix::column_vector(&[1.0, 1.0]);
        let before = (a.clone(), b.clone());
        assert_eq!(a.solve(&b), Err(MatrixError::Singular { column: 0 }));
        assert_eq!((a, b), before);
    }

    #[test]
    fn solve_rejects_non_square_or_wide_rhs() {
        let a = Matrix::zeros(2, 3);
        assert!(matches!(
            a.solve(&Matrix::zeros(2, 1)),
            Err(MatrixError::Dimension { op: "solve", .. })
        ));
        let sq = Matrix::identity(2);
        assert!(sq.solve(&Matrix::zeros(2, 2)).is_err());
    }

    #[test]
    fn qr_reconstructs_input_with_orthonormal_q() {
        let a = m(vec![
            vec![12.0, -51.0, 4.0],
            vec![6.0, 167.0, -68.0],
            vec![-4.0, 24.0, -41.0],
        ]);
        let Qr { q, r } = a.qr_decompose().unwrap();
        assert!(q.matmul(&r).unwrap().approx_eq(&a, 1e-9));
        assert!(q.transpose().matmul(&q).unwrap().approx_eq(&Matrix::identity(3), 1e-10));
        for i in 0..3 {
            for j in 0..i {
                assert_eq!(r.get(i, j).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn qr_of_tall_matrix_is_thin() {
        let a = m(vec![vec![1.0, 0.0], vec![1.0, 1.0], vec![0.0, 1.0]]);
        let Qr { q, r } = a.qr_decompose().unwrap();
        assert_eq!(q.shape(), (3, 2));
        assert_eq!(r.shape(), (2, 2));
        assert!(q.matmul(&r).unwrap().approx_eq(&a, 1e-12));
    }

    #[test]
    fn qr_of_rank_deficient_matrix_yields_nan() {
        let a = m(vec![vec![1.0, 0.0], vec![2.0, 0.0]]);
        let Qr { q, .. } = a.qr_decompose().unwrap();
        assert!(q.get(0, 1).unwrap().is_nan());
    }

    #[test]
    fn eigen_of_symmetric_2x2() {
        let a = m(vec![vec![2.0, 1.0], vec![1.0, 2.0]]);
        let eigen = a.eigen_decompose().unwrap();
        assert!(eigen.converged);
        assert!(eigen.iterations <= EIGEN_MAX_ITERATIONS);

        let mut values = eigen.eigenvalues();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert!((values[0] - 1.0).abs() < 1e-3);
        assert!((values[1] - 3.0).abs() < 1e-3);

        // A·v = λ·v for every column of the eigenvector matrix.
        for (i, lambda) in eigen.eigenvalues().into_iter().enumerate() {
            let v = eigen.vectors.column(i).unwrap();
            let av = a.matmul(&v).unwrap();
            assert!(av.approx_eq(&v.scale(lambda), 1e-3));
        }
    }

    #[test]
    fn eigen_requires_square_input() {
        assert!(matches!(
            Matrix::zeros(2, 3).eigen_decompose(),
            Err(MatrixError::Dimension { op: "eigen_decompose", .. })
        ));
    }

    #[test]
    fn decompositions_reject_empty_matrices() {
        let empty = Matrix::zeros(0, 0);
        assert!(empty.is_empty());
        assert_eq!(empty.eigen_decompose(), Err(MatrixError::Empty));
        assert_eq!(empty.qr_decompose(), Err(MatrixError::Empty));
        assert_eq!(
            empty.solve(&Matrix::column_vector(&[])),
            Err(MatrixError::Empty)
        );
        assert_eq!(Matrix::zeros(3, 0).qr_decompose(), Err(MatrixError::Empty));
    }
}
