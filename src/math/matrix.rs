use rand::Rng;
use std::f64::consts::PI;
use std::fmt;

use crate::error::MatrixError;

/// Dense row-major matrix of `f64`.
///
/// The shape is fixed at construction and every row holds exactly `cols`
/// values. A column vector is a matrix with `cols == 1`; the vector helpers
/// (`norm`, `dot`, `to_column_vec`) read the first column only.
///
/// Indices are 0-based and bounds-checked by `get`/`set`.
///
/// `from_data` rejects empty input. The sized constructors (`zeros`,
/// `identity`, `random`, `column_vector`, ...) take their extents on trust,
/// so a zero extent gives an empty matrix; element-wise arithmetic on it is
/// well defined, while `solve`, `qr_decompose` and `eigen_decompose` refuse
/// it with [`MatrixError::Empty`].
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    pub(crate) rows: usize,
    pub(crate) cols: usize,
    pub(crate) data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    pub fn identity(n: usize) -> Matrix {
        let mut res = Matrix::zeros(n, n);
        for i in 0..n {
            res.data[i][i] = 1.0;
        }
        res
    }

    /// Uniform samples in `[-0.5, 0.5)`.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = rng.gen::<f64>() - 0.5;
            }
        }
        res
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms in (0, 1] so ln never sees zero.
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn normal_scaled<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for x in row.iter_mut() {
                *x = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// Samples from N(0, 1).
    pub fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        Matrix::normal_scaled(rows, cols, 1.0, rng)
    }

    /// Xavier (Glorot) initialization: samples from N(0, sqrt(1 / cols)).
    ///
    /// `cols` is the fan-in: a weight matrix maps `cols` inputs to `rows`
    /// neurons.
    pub fn xavier<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (1.0 / cols as f64).sqrt();
        Matrix::normal_scaled(rows, cols, std_dev, rng)
    }

    /// He initialization: samples from N(0, sqrt(2 / cols)).
    ///
    /// Recommended before ReLU layers. The variance 2/fan_in accounts for
    /// the fact that ReLU zeroes half of its inputs on average.
    pub fn he<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / cols as f64).sqrt();
        Matrix::normal_scaled(rows, cols, std_dev, rng)
    }

    /// Builds a matrix from row data, rejecting empty or ragged input.
    pub fn from_data(data: Vec<Vec<f64>>) -> Result<Matrix, MatrixError> {
        let cols = data.first().map(Vec::len).unwrap_or(0);
        if cols == 0 {
            return Err(MatrixError::Empty);
        }
        if let Some((row, r)) = data.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(MatrixError::Ragged {
                row,
                found: r.len(),
                expected: cols,
            });
        }
        Ok(Matrix {
            rows: data.len(),
            cols,
            data,
        })
    }

    /// Column vector holding `values`.
    pub fn column_vector(values: &[f64]) -> Matrix {
        Matrix {
            rows: values.len(),
            cols: 1,
            data: values.iter().map(|&x| vec![x]).collect(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True when either extent is zero.
    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    pub(crate) fn ensure_non_empty(&self) -> Result<(), MatrixError> {
        if self.is_empty() {
            return Err(MatrixError::Empty);
        }
        Ok(())
    }

    pub fn is_vector(&self) -> bool {
        self.cols == 1
    }

    /// Borrow the row-major backing grid.
    pub fn data(&self) -> &[Vec<f64>] {
        &self.data
    }

    fn check_index(&self, row: usize, col: usize) -> Result<(), MatrixError> {
        if row >= self.rows || col >= self.cols {
            return Err(MatrixError::IndexOutOfBounds {
                row,
                col,
                shape: self.shape(),
            });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<f64, MatrixError> {
        self.check_index(row, col)?;
        Ok(self.data[row][col])
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<(), MatrixError> {
        self.check_index(row, col)?;
        self.data[row][col] = value;
        Ok(())
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: f64) {
        for row in self.data.iter_mut() {
            row.iter_mut().for_each(|x| *x = value);
        }
    }

    /// Copies column `col` out as a column vector.
    pub fn column(&self, col: usize) -> Result<Matrix, MatrixError> {
        self.check_index(0, col)?;
        Ok(Matrix {
            rows: self.rows,
            cols: 1,
            data: self.data.iter().map(|r| vec![r[col]]).collect(),
        })
    }

    /// Overwrites column `col` with the column vector `vector`.
    pub fn set_column(&mut self, col: usize, vector: &Matrix) -> Result<(), MatrixError> {
        self.check_index(0, col)?;
        if vector.rows != self.rows || vector.cols != 1 {
            return Err(MatrixError::Dimension {
                op: "set_column",
                left: self.shape(),
                right: vector.shape(),
            });
        }
        for (row, v) in self.data.iter_mut().zip(vector.data.iter()) {
            row[col] = v[0];
        }
        Ok(())
    }

    /// First column as a flat `Vec`.
    pub fn to_column_vec(&self) -> Vec<f64> {
        self.data.iter().filter_map(|r| r.first().copied()).collect()
    }

    /// Euclidean length of a column vector.
    pub fn norm(&self) -> f64 {
        self.data
            .iter()
            .filter_map(|r| r.first())
            .map(|x| x * x)
            .sum::<f64>()
            .sqrt()
    }

    /// Dot product of two column vectors of equal length.
    pub fn dot(&self, other: &Matrix) -> Result<f64, MatrixError> {
        if self.rows != other.rows || self.cols != 1 || other.cols != 1 {
            return Err(MatrixError::Dimension {
                op: "dot",
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(a, b)| a[0] * b[0])
            .sum())
    }

    /// Sum of every element.
    pub fn sum(&self) -> f64 {
        self.data.iter().flatten().sum()
    }

    pub fn transpose(&self) -> Matrix {
        let mut res = Matrix::zeros(self.cols, self.rows);

        for i in 0..res.rows {
            for j in 0..res.cols {
                res.data[i][j] = self.data[j][i];
            }
        }

        res
    }

    pub fn map<F>(&self, functor: F) -> Matrix
    where
        F: Fn(f64) -> f64,
    {
        Matrix {
            rows: self.rows,
            cols: self.cols,
            data: self
                .data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    /// Returns a new matrix with every element multiplied by `factor`.
    /// The receiver is left untouched.
    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    pub(crate) fn zip_with<F>(&self, rhs: &Matrix, op: &'static str, f: F) -> Result<Matrix, MatrixError>
    where
        F: Fn(f64, f64) -> f64,
    {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            return Err(MatrixError::Dimension {
                op,
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let data = self
            .data
            .iter()
            .zip(rhs.data.iter())
            .map(|(row_a, row_b)| row_a.iter().zip(row_b.iter()).map(|(&a, &b)| f(a, b)).collect())
            .collect();

        Ok(Matrix {
            rows: self.rows,
            cols: self.cols,
            data,
        })
    }

    pub fn add(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(rhs, "add", |a, b| a + b)
    }

    pub fn sub(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(rhs, "sub", |a, b| a - b)
    }

    /// Element-wise (Hadamard) product of two same-shape matrices.
    pub fn hadamard(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        self.zip_with(rhs, "hadamard", |a, b| a * b)
    }

    pub fn matmul(&self, rhs: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != rhs.rows {
            return Err(MatrixError::Dimension {
                op: "matmul",
                left: self.shape(),
                right: rhs.shape(),
            });
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for j in 0..res.cols {
                let mut sum = 0.0;

                for k in 0..self.cols {
                    sum += self.data[i][k] * rhs.data[k][j];
                }

                res.data[i][j] = sum;
            }
        }

        Ok(res)
    }

    /// Exact element-wise equality; shapes must match.
    pub fn equals(&self, rhs: &Matrix) -> Result<bool, MatrixError> {
        if self.shape() != rhs.shape() {
            return Err(MatrixError::Dimension {
                op: "equals",
                left: self.shape(),
                right: rhs.shape(),
            });
        }
        Ok(self.data == rhs.data)
    }

    /// Same shape and every element within `tol` of its counterpart.
    pub fn approx_eq(&self, rhs: &Matrix, tol: f64) -> bool {
        self.shape() == rhs.shape()
            && self
                .data
                .iter()
                .flatten()
                .zip(rhs.data.iter().flatten())
                .all(|(a, b)| (a - b).abs() <= tol)
    }

    pub(crate) fn swap_rows(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.data {
            for x in row {
                write!(f, "{x:9.4} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
