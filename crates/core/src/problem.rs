use crate::math::{all_finite, RealNumber};
use crate::traits::LinearOperator;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProblemError {
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),
    #[error("invalid structure: {0}")]
    InvalidStructure(String),
    #[error("negative right-hand side {value} in row {row}; the all-slack basis is infeasible")]
    NegativeRhs { row: usize, value: f64 },
}

pub type ProblemResult<T> = Result<T, ProblemError>;

/// Row-major dense matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseMatrix<T> {
    pub nrows: usize,
    pub ncols: usize,
    pub data: Vec<T>,
}

impl<T> DenseMatrix<T>
where
    T: RealNumber,
{
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self {
            nrows,
            ncols,
            data: vec![T::zero(); nrows * ncols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut matrix = Self::zeros(n, n);
        for i in 0..n {
            matrix.data[i * n + i] = T::one();
        }
        matrix
    }

    pub fn from_rows(rows: &[Vec<T>]) -> ProblemResult<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(nrows * ncols);
        for (idx, row) in rows.iter().enumerate() {
            if row.len() != ncols {
                return Err(ProblemError::DimensionMismatch(format!(
                    "row {idx} has {} entries, expected {ncols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self { nrows, ncols, data })
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[row * self.ncols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.ncols + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        let start = row * self.ncols;
        &self.data[start..start + self.ncols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [T] {
        let start = row * self.ncols;
        &mut self.data[start..start + self.ncols]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        // `chunks` panics on a zero chunk size
        self.data.chunks(self.ncols.max(1)).take(self.nrows)
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if self.data.len() != self.nrows * self.ncols {
            return Err(ProblemError::DimensionMismatch(format!(
                "data length {} != nrows * ncols ({} * {})",
                self.data.len(),
                self.nrows,
                self.ncols
            )));
        }
        Ok(())
    }

    /// Returns `self * diag(scale)`.
    pub fn scale_columns(&self, scale: &[T]) -> Self {
        assert_eq!(scale.len(), self.ncols, "column scaling dimension mismatch");
        let mut scaled = self.clone();
        for row in 0..self.nrows {
            for (value, factor) in scaled.row_mut(row).iter_mut().zip(scale.iter()) {
                *value *= *factor;
            }
        }
        scaled
    }

    /// Returns `[self | I]`, the matrix extended with one slack column per row.
    pub fn with_identity_block(&self) -> Self {
        let ncols = self.ncols + self.nrows;
        let mut augmented = Self::zeros(self.nrows, ncols);
        for row in 0..self.nrows {
            augmented.row_mut(row)[..self.ncols].copy_from_slice(self.row(row));
            augmented.set(row, self.ncols + row, T::one());
        }
        augmented
    }

    /// Dense `self * self^T`, symmetric and `nrows x nrows`.
    pub fn gram(&self) -> Self {
        let m = self.nrows;
        let mut out = Self::zeros(m, m);
        for i in 0..m {
            for j in i..m {
                let value = crate::math::dot(self.row(i), self.row(j));
                out.set(i, j, value);
                out.set(j, i, value);
            }
        }
        out
    }
}

impl<T> LinearOperator<T> for DenseMatrix<T>
where
    T: RealNumber,
{
    fn dim(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    fn apply(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.ncols);
        assert_eq!(y.len(), self.nrows);
        for (out, row) in y.iter_mut().zip(self.rows()) {
            *out = crate::math::dot(row, x);
        }
    }

    fn apply_transpose(&self, x: &[T], y: &mut [T]) {
        assert_eq!(x.len(), self.nrows);
        assert_eq!(y.len(), self.ncols);
        y.iter_mut().for_each(|v| *v = T::zero());
        for (row, &weight) in self.rows().zip(x.iter()) {
            crate::math::axpy(weight, row, y);
        }
    }
}

/// `maximize c^T x  subject to  A x <= b, x >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemLP<T> {
    pub cost: Vec<T>,
    pub constraints: DenseMatrix<T>,
    pub rhs: Vec<T>,
}

impl<T> ProblemLP<T>
where
    T: RealNumber,
{
    pub fn new(cost: Vec<T>, constraints: DenseMatrix<T>, rhs: Vec<T>) -> ProblemResult<Self> {
        let problem = Self {
            cost,
            constraints,
            rhs,
        };
        problem.validate()?;
        Ok(problem)
    }

    pub fn nvars(&self) -> usize {
        self.cost.len()
    }

    pub fn ncons(&self) -> usize {
        self.rhs.len()
    }

    pub fn objective(&self, x: &[T]) -> T {
        crate::math::dot(&self.cost, &x[..self.nvars()])
    }

    pub fn validate(&self) -> ProblemResult<()> {
        let n = self.nvars();
        if n == 0 {
            return Err(ProblemError::InvalidStructure(
                "objective vector is empty".into(),
            ));
        }
        self.constraints.validate()?;
        if self.constraints.ncols != n {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint matrix columns {} != nvars {n}",
                self.constraints.ncols
            )));
        }
        if self.constraints.nrows != self.rhs.len() {
            return Err(ProblemError::DimensionMismatch(format!(
                "constraint rows {} != rhs len {}",
                self.constraints.nrows,
                self.rhs.len()
            )));
        }
        if !all_finite(&self.cost) || !all_finite(&self.constraints.data) || !all_finite(&self.rhs)
        {
            return Err(ProblemError::InvalidStructure(
                "problem data contains non-finite values".into(),
            ));
        }
        Ok(())
    }

    /// Checks that a point has one entry per decision variable.
    pub fn validate_point(&self, point: &[T]) -> ProblemResult<()> {
        if point.len() != self.nvars() {
            return Err(ProblemError::DimensionMismatch(format!(
                "starting point length {} != nvars {}",
                point.len(),
                self.nvars()
            )));
        }
        if !all_finite(point) {
            return Err(ProblemError::InvalidStructure(
                "starting point contains non-finite values".into(),
            ));
        }
        Ok(())
    }
}
