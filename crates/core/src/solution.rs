use crate::math::RealNumber;
use crate::stats::SolveStats;
use serde::{Deserialize, Serialize};

/// Why the affine-scaling method refused to produce a solution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Applicability {
    /// The starting point violates `A x0 <= b` or is not strictly interior.
    InitialPoint,
    /// The smallest projected cost reached the configured threshold.
    StopCriterion,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Status {
    Optimal,
    NoSolution,
    NotApplicable(Applicability),
    Unbounded,
    MaxIterations,
    MaxTime,
    NumericalFailure,
}

impl Status {
    pub fn is_optimal(self) -> bool {
        matches!(self, Status::Optimal)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Solution<T: RealNumber> {
    pub primal: Vec<T>,
    pub slack: Vec<T>,
    pub status: Status,
    pub objective_value: T,
    pub iterations: usize,
    pub stats: SolveStats<T>,
}

impl<T> Solution<T>
where
    T: RealNumber,
{
    pub fn with_capacity(n: usize, m: usize) -> Self {
        Self {
            primal: vec![T::zero(); n],
            slack: vec![T::zero(); m],
            status: Status::NumericalFailure,
            objective_value: T::zero(),
            iterations: 0,
            stats: SolveStats::new(),
        }
    }

    /// A solution that carries only a terminal status.
    pub fn terminated(status: Status, n: usize, m: usize) -> Self {
        Self {
            status,
            ..Self::with_capacity(n, m)
        }
    }
}
