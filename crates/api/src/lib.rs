#![forbid(unsafe_code)]

use lpkit_algos::{AffineScalingSolver, ApplicabilityChecker, ApplicabilityError, SimplexSolver};
use lpkit_core::math::RealNumber;
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::{DenseMatrix, ProblemLP};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use lpkit_core::options::Method;
pub use lpkit_core::solution::{Applicability, Solution, Status};
pub use lpkit_core::stats::SolveStats;

/// Step sizes used by the reference driver for its two interior-point runs.
pub const REFERENCE_STEPS: [f64; 2] = [0.5, 0.9];

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("problem validation failed: {0}")]
    InvalidProblem(String),
    #[error("{0:?} needs a strictly interior starting point")]
    MissingStart(Method),
    #[error("solver failed: {0}")]
    Backend(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LpBuilder<T: RealNumber> {
    cost: Option<Vec<T>>,
    constraints: Option<DenseMatrix<T>>,
    rhs: Option<Vec<T>>,
}

impl<T> Default for LpBuilder<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self {
            cost: None,
            constraints: None,
            rhs: None,
        }
    }
}

impl<T> LpBuilder<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn c(mut self, cost: Vec<T>) -> Self {
        self.cost = Some(cost);
        self
    }

    pub fn a(mut self, matrix: DenseMatrix<T>, rhs: Vec<T>) -> Self {
        self.constraints = Some(matrix);
        self.rhs = Some(rhs);
        self
    }

    pub fn a_rows(self, rows: &[Vec<T>], rhs: Vec<T>) -> Result<Self, SolverError> {
        let matrix =
            DenseMatrix::from_rows(rows).map_err(|err| SolverError::InvalidProblem(err.to_string()))?;
        Ok(self.a(matrix, rhs))
    }

    pub fn build(self) -> Result<ProblemLP<T>, SolverError> {
        let cost = self
            .cost
            .ok_or_else(|| SolverError::InvalidProblem("objective vector missing".into()))?;
        let constraints = self
            .constraints
            .ok_or_else(|| SolverError::InvalidProblem("constraint matrix missing".into()))?;
        let rhs = self
            .rhs
            .ok_or_else(|| SolverError::InvalidProblem("right-hand side missing".into()))?;
        ProblemLP::new(cost, constraints, rhs)
            .map_err(|err| SolverError::InvalidProblem(err.to_string()))
    }
}

pub struct Solver<T: RealNumber> {
    method: Method,
    options: SolveOptions<T>,
    start: Option<Vec<T>>,
}

impl<T> Solver<T>
where
    T: RealNumber,
{
    pub fn new() -> Self {
        Self {
            method: Method::Simplex,
            options: SolveOptions::default(),
            start: None,
        }
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn options(mut self, options: SolveOptions<T>) -> Self {
        self.options = options;
        self
    }

    pub fn start(mut self, start: Vec<T>) -> Self {
        self.start = Some(start);
        self
    }

    pub fn solve_lp(&self, problem: &ProblemLP<T>) -> Result<Solution<T>, SolverError> {
        tracing::debug!(
            method = ?self.method,
            nvars = problem.nvars(),
            ncons = problem.ncons(),
            "solving linear program"
        );
        match self.method {
            Method::AffineScaling => {
                let start = self
                    .start
                    .as_deref()
                    .ok_or(SolverError::MissingStart(Method::AffineScaling))?;
                AffineScalingSolver::new(self.options.clone())
                    .solve(problem, start)
                    .map_err(backend_error)
            }
            Method::Simplex => SimplexSolver::new(self.options.clone())
                .solve(problem)
                .map_err(backend_error),
        }
    }

    /// Runs the applicability checks without solving.
    pub fn check(&self, problem: &ProblemLP<T>) -> Result<(), ApplicabilityError> {
        let checker = ApplicabilityChecker::from_options(&self.options);
        match &self.start {
            Some(start) => checker.check(problem, start),
            None => {
                problem.validate()?;
                checker.check_rows(&problem.constraints)
            }
        }
    }
}

impl<T> Default for Solver<T>
where
    T: RealNumber,
{
    fn default() -> Self {
        Self::new()
    }
}

fn backend_error(err: anyhow::Error) -> SolverError {
    match err.downcast::<lpkit_core::problem::ProblemError>() {
        Ok(problem) => SolverError::InvalidProblem(problem.to_string()),
        Err(other) => SolverError::Backend(format!("{other:#}")),
    }
}

/// One interior-point run of the reference suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffineRun<T: RealNumber> {
    pub step: T,
    pub solution: Solution<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport<T: RealNumber> {
    pub affine: Vec<AffineRun<T>>,
    pub simplex: Solution<T>,
}

/// Solves `problem` the way the reference driver does: two independent
/// affine-scaling runs at the [`REFERENCE_STEPS`] followed by the simplex
/// method. `options.affine_step` is overridden for each interior-point run.
pub fn run_reference_suite<T: RealNumber>(
    problem: &ProblemLP<T>,
    start: &[T],
    options: SolveOptions<T>,
) -> Result<SuiteReport<T>, SolverError> {
    let mut affine = Vec::with_capacity(REFERENCE_STEPS.len());
    for step in REFERENCE_STEPS {
        let step = T::from_f64(step)
            .ok_or_else(|| SolverError::Backend("step size is not representable".into()))?;
        let solution = Solver::new()
            .method(Method::AffineScaling)
            .options(options.clone().with_step(step))
            .start(start.to_vec())
            .solve_lp(problem)?;
        tracing::info!(step = %step, status = ?solution.status, "affine scaling run finished");
        affine.push(AffineRun { step, solution });
    }
    let simplex = Solver::new()
        .method(Method::Simplex)
        .options(options)
        .solve_lp(problem)?;
    tracing::info!(status = ?simplex.status, "simplex run finished");
    Ok(SuiteReport { affine, simplex })
}

pub fn solve_lp<T: RealNumber>(
    problem: &ProblemLP<T>,
    options: SolveOptions<T>,
) -> Result<Solution<T>, SolverError> {
    Solver::new().options(options).solve_lp(problem)
}
