//! Primal affine-scaling interior-point method.
//!
//! The inequality system `A x <= b` is carried in standard form
//! `[A | I] (x, s) = b` with `s = b - A x`, so every iterate holds the
//! decision variables followed by one slack per constraint. Each iteration
//! rescales by `D = diag(x)`, projects the scaled cost onto the null space of
//! the scaled constraints and moves a fraction `alpha` of the way to the
//! boundary along the projected direction.
//!
//! The projection is refined once against its own residual, and every new
//! iterate must satisfy `[A | I] x = b` to within `feasibility_tolerance`
//! relative to `1 + max|b|`; otherwise the solve stops with
//! `Status::NumericalFailure`.

use crate::check::{ApplicabilityChecker, ApplicabilityError};
use anyhow::Result;
use itertools::izip;
use lpkit_core::math::{all_finite, argmin, distance2, norm_inf, RealNumber, Timer};
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::{DenseMatrix, ProblemLP};
use lpkit_core::solution::{Applicability, Solution, Status};
use lpkit_core::stats::{IterationRecord, SolveStats};
use lpkit_core::traits::{LinearOperator, StepNorm, StoppingCriterion, SymmetricSolver};
use lpkit_linsys::dense::{DenseLdlSolver, DensePattern, LinsysError};
use std::time::Duration;

/// Iterate of the affine-scaling method, replaced wholesale by each step.
#[derive(Debug, Clone, PartialEq)]
pub struct InteriorPointState<T: RealNumber> {
    pub x: Vec<T>,
    pub nvars: usize,
    pub iteration: usize,
}

impl<T> InteriorPointState<T>
where
    T: RealNumber,
{
    /// Lifts a starting point into standard form. Every coordinate, slacks
    /// included, must be strictly positive.
    pub fn initial(problem: &ProblemLP<T>, start: &[T]) -> Result<Self, ApplicabilityError> {
        problem.validate_point(start)?;
        let mut slack = vec![T::zero(); problem.ncons()];
        problem.constraints.apply(start, &mut slack);
        for (s, &b) in slack.iter_mut().zip(problem.rhs.iter()) {
            *s = b - *s;
        }
        let x: Vec<T> = start.iter().chain(slack.iter()).copied().collect();
        if let Some(index) = x.iter().position(|&value| !(value > T::zero())) {
            return Err(ApplicabilityError::NotInterior {
                index,
                value: x[index].to_f64().unwrap_or(f64::NAN),
            });
        }
        Ok(Self {
            x,
            nvars: problem.nvars(),
            iteration: 0,
        })
    }

    pub fn primal(&self) -> &[T] {
        &self.x[..self.nvars]
    }

    pub fn slack(&self) -> &[T] {
        &self.x[self.nvars..]
    }
}

/// Standard-form data shared by every iteration of one solve.
#[derive(Debug, Clone)]
pub struct AffineWorkspace<T: RealNumber> {
    augmented: DenseMatrix<T>,
    cost: Vec<T>,
    rhs: Vec<T>,
    nvars: usize,
}

impl<T> AffineWorkspace<T>
where
    T: RealNumber,
{
    pub fn new(problem: &ProblemLP<T>) -> Self {
        let mut cost = problem.cost.clone();
        cost.resize(problem.nvars() + problem.ncons(), T::zero());
        Self {
            augmented: problem.constraints.with_identity_block(),
            cost,
            rhs: problem.rhs.clone(),
            nvars: problem.nvars(),
        }
    }

    pub fn ncons(&self) -> usize {
        self.augmented.nrows
    }

    pub fn objective(&self, x: &[T]) -> T {
        lpkit_core::math::dot(&self.cost[..self.nvars], &x[..self.nvars])
    }

    /// `max_i |([A | I] x - b)_i|`.
    pub fn residual(&self, x: &[T]) -> T {
        let mut lhs = vec![T::zero(); self.ncons()];
        self.augmented.apply(x, &mut lhs);
        lhs.iter()
            .zip(self.rhs.iter())
            .fold(T::zero(), |acc, (l, b)| acc.max((*l - *b).abs()))
    }

    /// Residual bound an accepted iterate has to meet.
    pub fn residual_bound(&self, feasibility_tolerance: T) -> T {
        feasibility_tolerance * (T::one() + norm_inf(&self.rhs))
    }

    /// Largest entry of `D c` in magnitude.
    pub fn scaled_cost_norm(&self, x: &[T]) -> T {
        self.cost
            .iter()
            .zip(x.iter())
            .fold(T::zero(), |acc, (c, d)| acc.max((*c * *d).abs()))
    }

    /// Returns `P D c` where `P = I - Ã^T (Ã Ã^T)^{-1} Ã` and `Ã = Â D`.
    /// `P` itself is never formed: the normal system `(Ã Ã^T) w = Ã c̃` is
    /// factored and `c̃ - Ã^T w` is projected once more through the same
    /// factorization to pull it back into the null space of `Ã`.
    pub fn projected_cost(
        &self,
        x: &[T],
        solver: &mut DenseLdlSolver<T>,
        stats: &mut SolveStats<T>,
    ) -> Result<Vec<T>, LinsysError> {
        let a_tilde = self.augmented.scale_columns(x);
        let c_tilde: Vec<T> = self.cost.iter().zip(x.iter()).map(|(c, d)| *c * *d).collect();

        solver.factor(&a_tilde.gram())?;
        stats.factorizations += 1;
        let mut projected = c_tilde;
        for _ in 0..2 {
            let mut w = vec![T::zero(); self.ncons()];
            a_tilde.apply(&projected, &mut w);
            solver.solve(&mut w)?;
            stats.linear_solves += 1;

            let mut correction = vec![T::zero(); x.len()];
            a_tilde.apply_transpose(&w, &mut correction);
            for (p, r) in projected.iter_mut().zip(correction.iter()) {
                *p -= *r;
            }
        }
        Ok(projected)
    }
}

/// Iterate produced by one accepted step.
#[derive(Debug, Clone)]
pub struct AffineStep<T: RealNumber> {
    pub state: InteriorPointState<T>,
    pub record: IterationRecord<T>,
}

#[derive(Debug, Clone)]
pub enum StepOutcome<T: RealNumber> {
    Advanced(AffineStep<T>),
    Converged(AffineStep<T>),
    NotApplicable { min_reduced_cost: T },
    NumericalFailure { reason: String },
}

pub struct AffineScalingSolver<T: RealNumber, C = StepNorm> {
    options: SolveOptions<T>,
    criterion: C,
}

impl<T> AffineScalingSolver<T, StepNorm>
where
    T: RealNumber,
{
    pub fn new(options: SolveOptions<T>) -> Self {
        Self {
            options,
            criterion: StepNorm,
        }
    }
}

impl<T, C> AffineScalingSolver<T, C>
where
    T: RealNumber,
    C: StoppingCriterion<T>,
{
    pub fn with_criterion<D: StoppingCriterion<T>>(self, criterion: D) -> AffineScalingSolver<T, D> {
        AffineScalingSolver {
            options: self.options,
            criterion,
        }
    }

    pub fn options(&self) -> &SolveOptions<T> {
        &self.options
    }

    /// Runs a single iteration from `state`, counting the factorization and
    /// solves it performs in `stats`.
    pub fn step(
        &self,
        workspace: &AffineWorkspace<T>,
        state: &InteriorPointState<T>,
        stats: &mut SolveStats<T>,
    ) -> StepOutcome<T> {
        let mut solver = DenseLdlSolver::with_tolerance(self.options.singular_tolerance);
        if let Err(err) = solver.analyze_pattern(&DensePattern::new(workspace.ncons())) {
            return StepOutcome::NumericalFailure {
                reason: err.to_string(),
            };
        }
        let projected = match workspace.projected_cost(&state.x, &mut solver, stats) {
            Ok(projected) => projected,
            Err(err) => {
                return StepOutcome::NumericalFailure {
                    reason: err.to_string(),
                }
            }
        };
        let Some((_, min_reduced_cost)) = argmin(&projected) else {
            return StepOutcome::NumericalFailure {
                reason: "projected cost has no finite entry".into(),
            };
        };
        if min_reduced_cost >= self.options.reduced_cost_threshold {
            return StepOutcome::NotApplicable { min_reduced_cost };
        }

        let scale = min_reduced_cost.abs();
        let cost_scale = workspace.scaled_cost_norm(&state.x);
        let next: Vec<T> = if norm_inf(&projected) <= T::epsilon() * cost_scale {
            // projected cost vanished; the iterate is stationary
            state.x.clone()
        } else {
            let alpha = self.options.affine_step;
            izip!(state.x.iter(), projected.iter())
                .map(|(&x, &cp)| x * (T::one() + alpha * cp / scale))
                .collect()
        };
        if !all_finite(&next) {
            return StepOutcome::NumericalFailure {
                reason: format!("iterate became non-finite at iteration {}", state.iteration + 1),
            };
        }
        let residual = workspace.residual(&next);
        if !(residual <= workspace.residual_bound(self.options.feasibility_tolerance)) {
            return StepOutcome::NumericalFailure {
                reason: format!(
                    "iterate left the feasible region at iteration {} (residual {})",
                    state.iteration + 1,
                    residual
                ),
            };
        }

        let step_norm = distance2(&next, &state.x);
        let state = InteriorPointState {
            x: next,
            nvars: state.nvars,
            iteration: state.iteration + 1,
        };
        let record = IterationRecord::affine(
            state.iteration,
            workspace.objective(&state.x),
            step_norm,
            min_reduced_cost,
            Duration::ZERO,
        );
        let step = AffineStep { state, record };
        if self.criterion.is_converged(&step.record, &self.options) {
            StepOutcome::Converged(step)
        } else {
            StepOutcome::Advanced(step)
        }
    }

    pub fn solve(&self, problem: &ProblemLP<T>, start: &[T]) -> Result<Solution<T>> {
        problem.validate()?;
        self.options.validate()?;
        let n = problem.nvars();
        let m = problem.ncons();

        let checker = ApplicabilityChecker::from_options(&self.options);
        let initial = checker
            .check(problem, start)
            .and_then(|_| InteriorPointState::initial(problem, start));
        let mut state = match initial {
            Ok(state) => state,
            Err(err) => match err.status() {
                Some(status) => {
                    tracing::warn!(%err, "affine scaling rejected the problem");
                    return Ok(Solution::terminated(status, n, m));
                }
                None => return Err(err.into()),
            },
        };

        let workspace = AffineWorkspace::new(problem);
        let mut stats = SolveStats::new();
        let timer = Timer::start();
        let mut status = Status::MaxIterations;

        for _ in 0..self.options.max_iterations {
            let (mut step, converged) = match self.step(&workspace, &state, &mut stats) {
                StepOutcome::Advanced(step) => (step, false),
                StepOutcome::Converged(step) => (step, true),
                StepOutcome::NotApplicable { min_reduced_cost } => {
                    tracing::warn!(
                        iteration = state.iteration,
                        min_reduced_cost = %min_reduced_cost,
                        "projected cost is not improving; affine scaling is not applicable"
                    );
                    status = Status::NotApplicable(Applicability::StopCriterion);
                    break;
                }
                StepOutcome::NumericalFailure { reason } => {
                    tracing::warn!(iteration = state.iteration, %reason, "affine scaling failed");
                    status = Status::NumericalFailure;
                    break;
                }
            };
            step.record.elapsed = timer.elapsed();
            tracing::debug!(
                iteration = step.record.iteration,
                objective = %step.record.objective,
                step_norm = ?step.record.step_norm,
                min_reduced_cost = ?step.record.min_reduced_cost,
                "affine scaling iteration"
            );
            stats.push(step.record);
            state = step.state;
            if converged {
                status = Status::Optimal;
                break;
            }

            if let Some(limit) = self.options.max_time {
                if timer.elapsed() > limit {
                    status = Status::MaxTime;
                    break;
                }
            }
        }

        stats.solve_time = timer.elapsed();
        let objective_value = workspace.objective(&state.x);
        match status {
            Status::Optimal => tracing::info!(
                iterations = stats.history.len(),
                objective = %objective_value,
                "affine scaling converged"
            ),
            Status::MaxIterations | Status::MaxTime => tracing::warn!(
                iterations = stats.history.len(),
                ?status,
                "affine scaling stopped before converging"
            ),
            _ => {}
        }
        // the last iterate stays meaningful when a budget ran out
        let keeps_iterate = matches!(
            status,
            Status::Optimal | Status::MaxIterations | Status::MaxTime
        );
        let iterations = stats.history.len();
        let solution = if keeps_iterate {
            Solution {
                primal: state.primal().to_vec(),
                slack: state.slack().to_vec(),
                status,
                objective_value,
                iterations,
                stats,
            }
        } else {
            Solution {
                iterations,
                stats,
                ..Solution::terminated(status, n, m)
            }
        };
        Ok(solution)
    }
}
