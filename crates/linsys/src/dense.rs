use lpkit_core::math::{constant, RealNumber};
use lpkit_core::problem::DenseMatrix;
use lpkit_core::traits::SymmetricSolver;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LinsysError {
    #[error("matrix dimension {found} does not match analysed dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("matrix is not square ({nrows} x {ncols})")]
    NotSquare { nrows: usize, ncols: usize },
    #[error("near-singular pivot encountered at column {column} (|d_j| = {magnitude:.3e})")]
    Singular { column: usize, magnitude: f64 },
    #[error("solve called before a successful factorization")]
    NotFactored,
}

#[derive(Debug, Clone)]
pub struct DensePattern {
    dimension: usize,
}

impl DensePattern {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

/// LDL^T factorization of a dense symmetric positive definite matrix.
///
/// A pivot is singular once elimination has cancelled it down to a
/// `relative_tolerance` fraction of the original diagonal entry.
pub struct DenseLdlSolver<T: RealNumber> {
    dimension: usize,
    l: Vec<T>,
    d: Vec<T>,
    relative_tolerance: T,
    analyzed: bool,
    factored: bool,
    factorizations: usize,
}

impl<T> DenseLdlSolver<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self::with_tolerance(constant(1e-12))
    }

    pub fn with_tolerance(relative_tolerance: T) -> Self {
        Self {
            dimension: 0,
            l: Vec::new(),
            d: Vec::new(),
            relative_tolerance,
            analyzed: false,
            factored: false,
            factorizations: 0,
        }
    }

    pub fn factorizations(&self) -> usize {
        self.factorizations
    }

    fn l(&self, row: usize, col: usize) -> T {
        self.l[row * self.dimension + col]
    }

    fn l_mut(&mut self, row: usize, col: usize) -> &mut T {
        let idx = row * self.dimension + col;
        &mut self.l[idx]
    }
}

impl<T> Default for DenseLdlSolver<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SymmetricSolver<T> for DenseLdlSolver<T>
where
    T: RealNumber,
{
    type Pattern = DensePattern;
    type Matrix = DenseMatrix<T>;
    type Error = LinsysError;

    fn analyze_pattern(&mut self, pattern: &Self::Pattern) -> Result<(), LinsysError> {
        self.dimension = pattern.dimension();
        self.l = vec![T::zero(); self.dimension * self.dimension];
        self.d = vec![T::zero(); self.dimension];
        self.analyzed = true;
        self.factored = false;
        Ok(())
    }

    fn factor(&mut self, matrix: &DenseMatrix<T>) -> Result<(), LinsysError> {
        if matrix.nrows != matrix.ncols {
            return Err(LinsysError::NotSquare {
                nrows: matrix.nrows,
                ncols: matrix.ncols,
            });
        }
        if !self.analyzed {
            self.analyze_pattern(&DensePattern::new(matrix.nrows))?;
        }
        if matrix.nrows != self.dimension {
            return Err(LinsysError::DimensionMismatch {
                expected: self.dimension,
                found: matrix.nrows,
            });
        }
        self.factored = false;
        for i in 0..self.dimension {
            for j in 0..self.dimension {
                *self.l_mut(i, j) = if i == j { T::one() } else { T::zero() };
            }
        }

        for j in 0..self.dimension {
            let mut d_j = matrix.get(j, j);
            for k in 0..j {
                let l_jk = self.l(j, k);
                d_j -= l_jk * l_jk * self.d[k];
            }
            if !(d_j.abs() > self.relative_tolerance * matrix.get(j, j).abs()) {
                let magnitude = d_j.abs().to_f64().unwrap_or(f64::NAN);
                tracing::debug!(column = j, magnitude, "ldl factorization hit a singular pivot");
                return Err(LinsysError::Singular {
                    column: j,
                    magnitude,
                });
            }
            self.d[j] = d_j;

            for i in (j + 1)..self.dimension {
                let mut lij = matrix.get(i, j);
                for k in 0..j {
                    lij -= self.l(i, k) * self.l(j, k) * self.d[k];
                }
                *self.l_mut(i, j) = lij / d_j;
            }
        }
        self.factored = true;
        self.factorizations += 1;
        Ok(())
    }

    fn solve(&self, rhs: &mut [T]) -> Result<(), LinsysError> {
        if !self.factored {
            return Err(LinsysError::NotFactored);
        }
        if rhs.len() != self.dimension {
            return Err(LinsysError::DimensionMismatch {
                expected: self.dimension,
                found: rhs.len(),
            });
        }
        for i in 0..self.dimension {
            for j in 0..i {
                rhs[i] = rhs[i] - self.l(i, j) * rhs[j];
            }
        }
        for i in 0..self.dimension {
            rhs[i] = rhs[i] / self.d[i];
        }
        for i in (0..self.dimension).rev() {
            for j in (i + 1)..self.dimension {
                rhs[i] = rhs[i] - self.l(j, i) * rhs[j];
            }
        }
        Ok(())
    }
}
