use lpkit_core::math::Scalar;
use lpkit_core::problem::{DenseMatrix, ProblemLP};
use rand::{rngs::SmallRng, Rng};

/// A random feasible bounded instance with strictly positive constraint
/// entries, paired with the interior start `x0 = min(b) / (5 n)`.
pub fn random_problem(n: usize, m: usize, rng: &mut SmallRng) -> (ProblemLP<Scalar>, Vec<Scalar>) {
    let cost = (0..n)
        .map(|_| 1.0 + rng.gen::<Scalar>() * 4.0)
        .collect::<Vec<_>>();
    let mut constraints = DenseMatrix::zeros(m, n);
    for row in 0..m {
        for col in 0..n {
            constraints.set(row, col, 0.5 + rng.gen::<Scalar>() * 2.0);
        }
    }
    let rhs = (0..m)
        .map(|_| 5.0 + rng.gen::<Scalar>() * 10.0)
        .collect::<Vec<_>>();
    // every entry is at most 2.5, so this keeps A x0 well below b
    let smallest = rhs.iter().cloned().fold(Scalar::INFINITY, Scalar::min);
    let start = vec![smallest / (5.0 * n as Scalar); n];
    let problem = ProblemLP {
        cost,
        constraints,
        rhs,
    };
    (problem, start)
}
