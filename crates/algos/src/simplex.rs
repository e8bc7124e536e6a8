//! Dense tableau primal simplex method.
//!
//! Starts from the all-slack basis, so the right-hand side must be
//! non-negative; there is no phase one. Entering columns follow the most
//! negative objective-row entry and leaving rows the minimum ratio test,
//! both breaking ties towards the lowest index.

use anyhow::Result;
use lpkit_core::math::{RealNumber, Timer};
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::{DenseMatrix, ProblemError, ProblemLP, ProblemResult};
use lpkit_core::solution::{Solution, Status};
use lpkit_core::stats::{IterationRecord, SolveStats};

/// `(m + 1) x (n + m + 1)` simplex tableau.
///
/// Columns `0..n` hold the decision variables, `n..n + m` the slacks and the
/// last column the right-hand side. Row `m` is the objective row, which starts
/// as `-c` so that maximisation becomes minimisation of the negated cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Tableau<T: RealNumber> {
    matrix: DenseMatrix<T>,
    nvars: usize,
    ncons: usize,
    basis: Vec<usize>,
}

impl<T> Tableau<T>
where
    T: RealNumber,
{
    pub fn new(problem: &ProblemLP<T>) -> ProblemResult<Self> {
        problem.validate()?;
        if let Some((row, value)) = problem
            .rhs
            .iter()
            .enumerate()
            .find(|(_, value)| **value < T::zero())
        {
            return Err(ProblemError::NegativeRhs {
                row,
                value: value.to_f64().unwrap_or(f64::NAN),
            });
        }

        let n = problem.nvars();
        let m = problem.ncons();
        let mut matrix = DenseMatrix::zeros(m + 1, n + m + 1);
        for row in 0..m {
            let target = matrix.row_mut(row);
            target[..n].copy_from_slice(problem.constraints.row(row));
            target[n + row] = T::one();
            target[n + m] = problem.rhs[row];
        }
        for (target, &cost) in matrix.row_mut(m)[..n].iter_mut().zip(problem.cost.iter()) {
            *target = -cost;
        }
        Ok(Self {
            matrix,
            nvars: n,
            ncons: m,
            basis: (n..n + m).collect(),
        })
    }

    pub fn nvars(&self) -> usize {
        self.nvars
    }

    pub fn ncons(&self) -> usize {
        self.ncons
    }

    pub fn get(&self, row: usize, col: usize) -> T {
        self.matrix.get(row, col)
    }

    pub fn matrix(&self) -> &DenseMatrix<T> {
        &self.matrix
    }

    /// Basic column of each constraint row.
    pub fn basis(&self) -> &[usize] {
        &self.basis
    }

    pub fn rhs(&self, row: usize) -> T {
        self.matrix.get(row, self.nvars + self.ncons)
    }

    /// Current objective value, read from the objective row's right-hand side.
    pub fn objective(&self) -> T {
        self.rhs(self.ncons)
    }

    fn objective_row(&self) -> &[T] {
        &self.matrix.row(self.ncons)[..self.nvars + self.ncons]
    }

    /// Most negative objective-row entry, `None` once the tableau is optimal.
    pub fn entering_column(&self, zero_tolerance: T) -> Option<usize> {
        let mut best: Option<(usize, T)> = None;
        for (col, &value) in self.objective_row().iter().enumerate() {
            if value >= -zero_tolerance {
                continue;
            }
            match best {
                Some((_, current)) if value >= current => {}
                _ => best = Some((col, value)),
            }
        }
        best.map(|(col, _)| col)
    }

    /// Minimum ratio test over rows with a positive entry in `column`.
    /// `None` means the column is unbounded.
    pub fn leaving_row(&self, column: usize, zero_tolerance: T) -> Option<usize> {
        let mut best: Option<(usize, T)> = None;
        for row in 0..self.ncons {
            let entry = self.matrix.get(row, column);
            if entry <= zero_tolerance {
                continue;
            }
            let ratio = self.rhs(row) / entry;
            match best {
                Some((_, current)) if ratio >= current => {}
                _ => best = Some((row, ratio)),
            }
        }
        best.map(|(row, _)| row)
    }

    /// Gauss-Jordan elimination on `(row, column)`; every other row,
    /// the objective row included, gets a zero in `column`.
    pub fn pivot(&mut self, row: usize, column: usize) {
        let width = self.matrix.ncols;
        let pivot = self.matrix.get(row, column);
        for value in self.matrix.row_mut(row).iter_mut() {
            *value = *value / pivot;
        }
        self.matrix.set(row, column, T::one());

        let pivot_row = self.matrix.row(row).to_vec();
        for other in 0..=self.ncons {
            if other == row {
                continue;
            }
            let factor = self.matrix.get(other, column);
            if factor == T::zero() {
                continue;
            }
            let target = self.matrix.row_mut(other);
            for col in 0..width {
                target[col] -= factor * pivot_row[col];
            }
            target[column] = T::zero();
        }
        self.basis[row] = column;
    }

    /// Row holding the 1 of a unit column. A column counts as basic when
    /// exactly one entry equals 1, all others are 0 and the basis agrees.
    pub fn basic_row(&self, column: usize, zero_tolerance: T) -> Option<usize> {
        let mut unit_row = None;
        for row in 0..=self.ncons {
            let value = self.matrix.get(row, column);
            if (value - T::one()).abs() <= zero_tolerance {
                if unit_row.is_some() {
                    return None;
                }
                unit_row = Some(row);
            } else if value.abs() > zero_tolerance {
                return None;
            }
        }
        unit_row.filter(|&row| row < self.ncons && self.basis[row] == column)
    }

    fn column_values(&self, columns: std::ops::Range<usize>, zero_tolerance: T) -> Vec<T> {
        columns
            .map(|col| {
                self.basic_row(col, zero_tolerance)
                    .map(|row| self.rhs(row))
                    .unwrap_or_else(T::zero)
            })
            .collect()
    }

    pub fn primal(&self, zero_tolerance: T) -> Vec<T> {
        self.column_values(0..self.nvars, zero_tolerance)
    }

    pub fn slack(&self, zero_tolerance: T) -> Vec<T> {
        self.column_values(self.nvars..self.nvars + self.ncons, zero_tolerance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotOutcome {
    Pivoted { row: usize, column: usize },
    Optimal,
    Unbounded { column: usize },
}

pub struct SimplexSolver<T: RealNumber> {
    options: SolveOptions<T>,
}

impl<T> SimplexSolver<T>
where
    T: RealNumber,
{
    pub fn new(options: SolveOptions<T>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SolveOptions<T> {
        &self.options
    }

    /// Performs at most one pivot.
    pub fn step(&self, tableau: &mut Tableau<T>) -> PivotOutcome {
        let tol = self.options.zero_tolerance;
        let Some(column) = tableau.entering_column(tol) else {
            return PivotOutcome::Optimal;
        };
        let Some(row) = tableau.leaving_row(column, tol) else {
            return PivotOutcome::Unbounded { column };
        };
        tableau.pivot(row, column);
        PivotOutcome::Pivoted { row, column }
    }

    /// Pivots `tableau` until it is optimal, unbounded or the pivot budget
    /// is spent. An already optimal tableau is left untouched.
    pub fn run(&self, tableau: &mut Tableau<T>) -> Solution<T> {
        let n = tableau.nvars();
        let m = tableau.ncons();
        let mut stats = SolveStats::new();
        let timer = Timer::start();
        let mut status = Status::MaxIterations;

        for _ in 0..self.options.max_iterations {
            match self.step(tableau) {
                PivotOutcome::Pivoted { row, column } => {
                    stats.pivots += 1;
                    tracing::debug!(
                        pivot = stats.pivots,
                        row,
                        column,
                        objective = %tableau.objective(),
                        "simplex pivot"
                    );
                    stats.push(IterationRecord::pivot(
                        stats.pivots,
                        tableau.objective(),
                        row,
                        column,
                        timer.elapsed(),
                    ));
                }
                PivotOutcome::Optimal => {
                    status = Status::Optimal;
                    break;
                }
                PivotOutcome::Unbounded { column } => {
                    tracing::warn!(column, "ratio test found no leaving row; problem is unbounded");
                    status = Status::Unbounded;
                    break;
                }
            }
        }
        // the budget may run out exactly on an optimal tableau
        if status == Status::MaxIterations
            && tableau.entering_column(self.options.zero_tolerance).is_none()
        {
            status = Status::Optimal;
        }

        stats.solve_time = timer.elapsed();
        let iterations = stats.pivots;
        match status {
            Status::Optimal => {
                let tol = self.options.zero_tolerance;
                tracing::info!(
                    pivots = iterations,
                    objective = %tableau.objective(),
                    "simplex reached an optimal basis"
                );
                Solution {
                    primal: tableau.primal(tol),
                    slack: tableau.slack(tol),
                    status,
                    objective_value: tableau.objective(),
                    iterations,
                    stats,
                }
            }
            _ => {
                if status == Status::MaxIterations {
                    tracing::warn!(pivots = iterations, "simplex pivot budget exhausted");
                }
                Solution {
                    iterations,
                    stats,
                    ..Solution::terminated(status, n, m)
                }
            }
        }
    }

    pub fn solve(&self, problem: &ProblemLP<T>) -> Result<Solution<T>> {
        self.options.validate()?;
        let mut tableau = Tableau::new(problem)?;
        Ok(self.run(&mut tableau))
    }
}
