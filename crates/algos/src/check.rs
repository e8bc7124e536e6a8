use lpkit_core::math::RealNumber;
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::{DenseMatrix, ProblemError, ProblemLP};
use lpkit_core::solution::{Applicability, Status};
use lpkit_core::traits::LinearOperator;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicabilityError {
    #[error("constraint row {row} has no positive coefficient; the problem has no solution")]
    NoSolution { row: usize },
    #[error("starting point violates constraint row {row}: {lhs} > {rhs}")]
    InfeasibleStart { row: usize, lhs: f64, rhs: f64 },
    #[error("starting point is not strictly interior at coordinate {index} (value {value})")]
    NotInterior { index: usize, value: f64 },
    #[error(transparent)]
    Problem(#[from] ProblemError),
}

impl ApplicabilityError {
    /// Terminal status reported to callers, `None` for malformed input.
    pub fn status(&self) -> Option<Status> {
        match self {
            ApplicabilityError::NoSolution { .. } => Some(Status::NoSolution),
            ApplicabilityError::InfeasibleStart { .. } | ApplicabilityError::NotInterior { .. } => {
                Some(Status::NotApplicable(Applicability::InitialPoint))
            }
            ApplicabilityError::Problem(_) => None,
        }
    }
}

/// Pre-flight validation shared by the interior-point entry points.
#[derive(Debug, Clone)]
pub struct ApplicabilityChecker<T: RealNumber> {
    feasibility_tolerance: T,
}

impl<T> ApplicabilityChecker<T>
where
    T: RealNumber,
{
    pub fn new(feasibility_tolerance: T) -> Self {
        Self {
            feasibility_tolerance,
        }
    }

    pub fn from_options(options: &SolveOptions<T>) -> Self {
        Self::new(options.feasibility_tolerance)
    }

    pub fn check(&self, problem: &ProblemLP<T>, start: &[T]) -> Result<(), ApplicabilityError> {
        problem.validate()?;
        problem.validate_point(start)?;
        self.check_rows(&problem.constraints)?;
        self.check_start(problem, start)
    }

    /// Every constraint row needs at least one strictly positive coefficient.
    pub fn check_rows(&self, constraints: &DenseMatrix<T>) -> Result<(), ApplicabilityError> {
        match constraints
            .rows()
            .position(|row| row.iter().all(|&value| value <= T::zero()))
        {
            Some(row) => {
                tracing::debug!(row, "constraint row has no positive coefficient");
                Err(ApplicabilityError::NoSolution { row })
            }
            None => Ok(()),
        }
    }

    /// `A x0 <= b` up to the feasibility tolerance.
    pub fn check_start(&self, problem: &ProblemLP<T>, start: &[T]) -> Result<(), ApplicabilityError> {
        let mut lhs = vec![T::zero(); problem.ncons()];
        problem.constraints.apply(start, &mut lhs);
        for (row, (&value, &bound)) in lhs.iter().zip(problem.rhs.iter()).enumerate() {
            if value > bound + self.feasibility_tolerance {
                tracing::debug!(row, "starting point violates a constraint");
                return Err(ApplicabilityError::InfeasibleStart {
                    row,
                    lhs: value.to_f64().unwrap_or(f64::NAN),
                    rhs: bound.to_f64().unwrap_or(f64::NAN),
                });
            }
        }
        Ok(())
    }
}

impl<T> Default for ApplicabilityChecker<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::from_options(&SolveOptions::default())
    }
}
