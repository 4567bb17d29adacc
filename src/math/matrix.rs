use rand::Rng;
use std::f64::consts::PI;
use std::ops::{Add, Sub, Mul};

use crate::error::{Result, SoftmaxError};

/// Dense row-major matrix of `f64`.
///
/// Rows are stored as individual `Vec<f64>`; every constructor guarantees
/// that all rows have exactly `cols` entries.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Builds a matrix from raw rows.
    ///
    /// Fails with `EmptyInput` when `rows` is empty and with `ShapeMismatch`
    /// when the rows do not all share the first row's width.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Matrix> {
        let first = rows.first().ok_or(SoftmaxError::EmptyInput("matrix rows"))?;
        let cols = first.len();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != cols) {
            return Err(SoftmaxError::shape(format!(
                "row {} has {} columns, expected {}",
                i,
                row.len(),
                cols
            )));
        }
        Ok(Matrix { rows: rows.len(), cols, data: rows })
    }

    /// Builds a `(rows, cols)` matrix from a row-major flat buffer.
    pub fn from_flat(rows: usize, cols: usize, flat: &[f64]) -> Result<Matrix> {
        let expected = rows.checked_mul(cols)
            .ok_or_else(|| SoftmaxError::shape("matrix shape overflow"))?;
        if flat.len() != expected {
            return Err(SoftmaxError::LengthMismatch {
                what: "row-major matrix data",
                expected,
                actual: flat.len(),
            });
        }
        let data = if cols == 0 {
            vec![Vec::new(); rows]
        } else {
            flat.chunks(cols).map(|c| c.to_vec()).collect()
        };
        Ok(Matrix { rows, cols, data })
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    fn sample_standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
        // Both uniforms in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Samples every entry from N(0, std_dev²).
    pub fn gaussian<R: Rng + ?Sized>(rows: usize, cols: usize, std_dev: f64, rng: &mut R) -> Matrix {
        let mut res = Matrix::zeros(rows, cols);
        for row in res.data.iter_mut() {
            for v in row.iter_mut() {
                *v = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row][col]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i]
    }

    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.iter().map(|r| r.as_slice())
    }

    /// Row-major copy of every entry.
    pub fn to_flat(&self) -> Vec<f64> {
        self.data.iter().flat_map(|r| r.iter().copied()).collect()
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
            data: self.data
                .iter()
                .map(|row| row.iter().map(|&x| functor(x)).collect())
                .collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Matrix {
        self.map(|x| x * factor)
    }

    /// Adds `row` to every row of the matrix.
    pub fn add_row_broadcast(&mut self, row: &[f64]) {
        assert_eq!(row.len(), self.cols, "broadcast row has the wrong width");
        for r in self.data.iter_mut() {
            for (v, b) in r.iter_mut().zip(row) {
                *v += b;
            }
        }
    }

    /// Column-wise sum, one entry per column.
    pub fn sum_columns(&self) -> Vec<f64> {
        let mut sums = vec![0.0; self.cols];
        for row in &self.data {
            for (s, v) in sums.iter_mut().zip(row) {
                *s += v;
            }
        }
        sums
    }

    /// Sum of squared entries.
    pub fn sum_squares(&self) -> f64 {
        self.data.iter().flat_map(|r| r.iter()).map(|v| v * v).sum()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Matrix { rows: 0, cols: 0, data: vec![] }
    }
}

impl Add for &Matrix {
    type Output = Matrix;

    fn add(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] + rhs.data[i][j];
            }
        }

        res
    }
}

impl Sub for &Matrix {
    type Output = Matrix;

    fn sub(self, rhs: Self) -> Self::Output {
        if self.rows != rhs.rows || self.cols != rhs.cols {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, self.cols);

        for i in 0..self.rows {
            for j in 0..self.cols {
                res.data[i][j] = self.data[i][j] - rhs.data[i][j];
            }
        }

        res
    }
}

impl Mul for &Matrix {
    type Output = Matrix;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.cols != rhs.rows {
            panic!("Matrices are of incorrect sizes")
        }

        let mut res = Matrix::zeros(self.rows, rhs.cols);

        for i in 0..res.rows {
            for k in 0..self.cols {
                let a = self.data[i][k];
                for j in 0..res.cols {
                    res.data[i][j] += a * rhs.data[k][j];
                }
            }
        }

        res
    }
}
