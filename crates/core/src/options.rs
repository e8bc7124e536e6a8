use crate::math::{constant, RealNumber};
use crate::problem::{ProblemError, ProblemResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Method {
    AffineScaling,
    Simplex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions<T: RealNumber> {
    /// Convergence tolerance on the affine-scaling step norm.
    pub tolerance: T,
    /// Iteration cap shared by both solvers (pivots for the simplex method).
    pub max_iterations: usize,
    pub max_time: Option<Duration>,
    /// Affine-scaling step size, strictly between 0 and 1.
    pub affine_step: T,
    /// Affine scaling stops as not applicable once the smallest projected
    /// cost reaches this value.
    pub reduced_cost_threshold: T,
    /// Slack allowed when checking `A x0 <= b`.
    pub feasibility_tolerance: T,
    /// Entries at or below this magnitude count as zero when choosing
    /// pivots and reading basic columns.
    pub zero_tolerance: T,
    /// Relative pivot threshold below which the normal matrix is singular.
    pub singular_tolerance: T,
}

impl<T> SolveOptions<T>
where
    T: RealNumber,
{
    pub fn with_tolerance(tolerance: T) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn with_step(mut self, affine_step: T) -> Self {
        self.affine_step = affine_step;
        self
    }

    pub fn validate(&self) -> ProblemResult<()> {
        if !(self.affine_step > T::zero() && self.affine_step < T::one()) {
            return Err(ProblemError::InvalidStructure(format!(
                "affine step {} must lie in (0, 1)",
                self.affine_step
            )));
        }
        if !(self.tolerance > T::zero()) {
            return Err(ProblemError::InvalidStructure(format!(
                "tolerance {} must be positive",
                self.tolerance
            )));
        }
        let tolerances = [
            ("zero_tolerance", self.zero_tolerance),
            ("feasibility_tolerance", self.feasibility_tolerance),
            ("singular_tolerance", self.singular_tolerance),
        ];
        for (name, value) in tolerances {
            if !(value >= T::zero() && value.is_finite()) {
                return Err(ProblemError::InvalidStructure(format!(
                    "{name} {value} must be finite and non-negative"
                )));
            }
        }
        if !self.reduced_cost_threshold.is_finite() {
            return Err(ProblemError::InvalidStructure(format!(
                "reduced cost threshold {} must be finite",
                self.reduced_cost_threshold
            )));
        }
        if self.max_iterations == 0 {
            return Err(ProblemError::InvalidStructure(
                "max_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

impl<T> Default for SolveOptions<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            tolerance: constant(1e-6),
            max_iterations: 10_000,
            max_time: None,
            affine_step: constant(0.5),
            reduced_cost_threshold: constant(0.1),
            feasibility_tolerance: constant(1e-9),
            zero_tolerance: constant(1e-9),
            singular_tolerance: constant(1e-12),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = SolveOptions::<f64>::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.reduced_cost_threshold, 0.1);
    }

    #[test]
    fn step_outside_unit_interval_is_rejected() {
        assert!(SolveOptions::<f64>::default().with_step(1.0).validate().is_err());
        assert!(SolveOptions::<f64>::default().with_step(0.0).validate().is_err());
        assert!(SolveOptions::<f64>::default().with_step(0.9).validate().is_ok());
    }

    #[test]
    fn tolerances_must_be_finite_and_non_negative() {
        let negative_singular = SolveOptions::<f64> {
            singular_tolerance: -1e-12,
            ..SolveOptions::default()
        };
        assert!(negative_singular.validate().is_err());
        let nan_zero = SolveOptions::<f64> {
            zero_tolerance: f64::NAN,
            ..SolveOptions::default()
        };
        assert!(nan_zero.validate().is_err());
        for threshold in [f64::INFINITY, f64::NAN] {
            let options = SolveOptions::<f64> {
                reduced_cost_threshold: threshold,
                ..SolveOptions::default()
            };
            assert!(options.validate().is_err());
        }
    }

    #[test]
    fn partial_json_uses_defaults() {
        let options: SolveOptions<f64> =
            serde_json::from_str(r#"{"tolerance": 1e-8, "affine_step": 0.9}"#).unwrap();
        assert_eq!(options.tolerance, 1e-8);
        assert_eq!(options.affine_step, 0.9);
        assert_eq!(options.max_iterations, 10_000);
    }
}
