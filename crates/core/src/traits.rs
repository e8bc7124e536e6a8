use crate::math::RealNumber;
use crate::options::SolveOptions;
use crate::stats::IterationRecord;

pub trait LinearOperator<T: RealNumber>: Send + Sync {
    fn dim(&self) -> (usize, usize);

    fn apply(&self, x: &[T], y: &mut [T]);

    fn apply_transpose(&self, x: &[T], y: &mut [T]) {
        let _ = (x, y);
        panic!("transpose not implemented for this operator");
    }
}

/// Factor-then-solve backend for symmetric positive definite systems.
pub trait SymmetricSolver<T: RealNumber>: Send {
    type Pattern;
    type Matrix;
    type Error: std::error::Error + Send + Sync + 'static;

    fn analyze_pattern(&mut self, pattern: &Self::Pattern) -> Result<(), Self::Error>;

    fn factor(&mut self, matrix: &Self::Matrix) -> Result<(), Self::Error>;

    fn solve(&self, rhs: &mut [T]) -> Result<(), Self::Error>;
}

pub trait StoppingCriterion<T: RealNumber> {
    fn is_converged(&self, record: &IterationRecord<T>, options: &SolveOptions<T>) -> bool;
}

/// Stops once the distance between consecutive iterates falls to the
/// configured tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepNorm;

impl<T> StoppingCriterion<T> for StepNorm
where
    T: RealNumber,
{
    fn is_converged(&self, record: &IterationRecord<T>, options: &SolveOptions<T>) -> bool {
        record
            .step_norm
            .map(|norm| norm <= options.tolerance)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn step_norm_uses_tolerance() {
        let options = SolveOptions::<f64>::with_tolerance(1e-3);
        let close = IterationRecord::affine(3, 1.0, 5e-4, -1.0, Duration::ZERO);
        let far = IterationRecord::affine(3, 1.0, 5e-2, -1.0, Duration::ZERO);
        assert!(StepNorm.is_converged(&close, &options));
        assert!(!StepNorm.is_converged(&far, &options));
        let pivot = IterationRecord::pivot(1, 1.0, 0, 0, Duration::ZERO);
        assert!(!StepNorm.is_converged(&pivot, &options));
    }
}
