#![forbid(unsafe_code)]

pub mod dense;

pub use dense::{DenseLdlSolver, DensePattern, LinsysError};
