use crate::math::RealNumber;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One iteration of either solver. Affine-scaling records carry a step norm
/// and the smallest projected cost; simplex records carry the pivot position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord<T: RealNumber> {
    pub iteration: usize,
    pub objective: T,
    pub step_norm: Option<T>,
    pub min_reduced_cost: Option<T>,
    pub pivot: Option<(usize, usize)>,
    pub elapsed: Duration,
}

impl<T> IterationRecord<T>
where
    T: RealNumber,
{
    pub fn affine(
        iteration: usize,
        objective: T,
        step_norm: T,
        min_reduced_cost: T,
        elapsed: Duration,
    ) -> Self {
        Self {
            iteration,
            objective,
            step_norm: Some(step_norm),
            min_reduced_cost: Some(min_reduced_cost),
            pivot: None,
            elapsed,
        }
    }

    pub fn pivot(
        iteration: usize,
        objective: T,
        row: usize,
        column: usize,
        elapsed: Duration,
    ) -> Self {
        Self {
            iteration,
            objective,
            step_norm: None,
            min_reduced_cost: None,
            pivot: Some((row, column)),
            elapsed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveStats<T: RealNumber> {
    pub history: Vec<IterationRecord<T>>,
    pub solve_time: Duration,
    pub factorizations: usize,
    pub linear_solves: usize,
    pub pivots: usize,
}

impl<T> SolveStats<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self {
            history: Vec::new(),
            solve_time: Duration::ZERO,
            factorizations: 0,
            linear_solves: 0,
            pivots: 0,
        }
    }

    pub fn push(&mut self, record: IterationRecord<T>) {
        self.history.push(record);
    }

    pub fn last(&self) -> Option<&IterationRecord<T>> {
        self.history.last()
    }
}
