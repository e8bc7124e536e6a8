#![forbid(unsafe_code)]

pub mod affine;
pub mod check;
pub mod simplex;

pub use affine::{AffineScalingSolver, AffineStep, AffineWorkspace, InteriorPointState, StepOutcome};
pub use check::{ApplicabilityChecker, ApplicabilityError};
pub use simplex::{PivotOutcome, SimplexSolver, Tableau};
