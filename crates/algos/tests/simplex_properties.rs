use approx::assert_abs_diff_eq;
use itertools::Itertools;
use lpkit_algos::{PivotOutcome, SimplexSolver, Tableau};
use lpkit_core::math::Scalar;
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::{DenseMatrix, ProblemLP};
use lpkit_core::solution::Status;
use lpkit_core::traits::LinearOperator;
use nalgebra::{DMatrix, DVector};
use rand::{rngs::SmallRng, Rng, SeedableRng};

/// Bounded instance: strictly positive constraint coefficients and rhs.
fn random_problem(rng: &mut SmallRng) -> ProblemLP<Scalar> {
    let n = rng.gen_range(2..=4);
    let m = rng.gen_range(2..=4);
    let data = (0..m * n).map(|_| rng.gen_range(0.1..2.0)).collect();
    let constraints = DenseMatrix {
        nrows: m,
        ncols: n,
        data,
    };
    let cost = (0..n).map(|_| rng.gen_range(0.5..5.0)).collect();
    let rhs = (0..m).map(|_| rng.gen_range(1.0..10.0)).collect();
    ProblemLP::new(cost, constraints, rhs).expect("valid problem")
}

/// Best objective over every basic feasible solution of `[A | I] z = b`.
fn enumerate_vertices(problem: &ProblemLP<Scalar>) -> Scalar {
    let n = problem.nvars();
    let m = problem.ncons();
    let augmented = problem.constraints.with_identity_block();
    let rhs = DVector::from_column_slice(&problem.rhs);
    let mut best = Scalar::NEG_INFINITY;
    for columns in (0..n + m).combinations(m) {
        let basis = DMatrix::from_fn(m, m, |row, k| augmented.get(row, columns[k]));
        let Some(values) = basis.lu().solve(&rhs) else {
            continue;
        };
        if values.iter().any(|&v| v < -1e-9 || !v.is_finite()) {
            continue;
        }
        let objective: Scalar = columns
            .iter()
            .zip(values.iter())
            .filter(|(col, _)| **col < n)
            .map(|(&col, &value)| problem.cost[col] * value)
            .sum();
        best = best.max(objective);
    }
    best
}

fn example() -> ProblemLP<Scalar> {
    let a = DenseMatrix::from_rows(&[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]]).unwrap();
    ProblemLP::new(vec![3.0, 2.0], a, vec![4.0, 4.0, 5.0]).unwrap()
}

#[test]
fn simplex_matches_vertex_enumeration() {
    let mut rng = SmallRng::seed_from_u64(42);
    let solver = SimplexSolver::new(SolveOptions::default());
    for _ in 0..50 {
        let problem = random_problem(&mut rng);
        let solution = solver.solve(&problem).expect("solve");
        assert_eq!(solution.status, Status::Optimal);
        let reference = enumerate_vertices(&problem);
        assert_abs_diff_eq!(solution.objective_value, reference, epsilon = 1e-7);
        assert_abs_diff_eq!(
            problem.objective(&solution.primal),
            solution.objective_value,
            epsilon = 1e-7
        );
    }
}

#[test]
fn rerunning_an_optimal_tableau_is_idempotent() {
    let solver = SimplexSolver::new(SolveOptions::default());
    let mut tableau = Tableau::new(&example()).unwrap();
    let first = solver.run(&mut tableau);
    assert_eq!(first.status, Status::Optimal);
    assert!(first.stats.pivots > 0);

    let snapshot = tableau.clone();
    let second = solver.run(&mut tableau);
    assert_eq!(second.status, Status::Optimal);
    assert_eq!(second.stats.pivots, 0);
    assert_eq!(second.primal, first.primal);
    assert_eq!(second.objective_value, first.objective_value);
    assert_eq!(tableau, snapshot);
}

#[test]
fn basic_values_satisfy_constraints_after_every_pivot() {
    let tol = 1e-9;
    let solver = SimplexSolver::new(SolveOptions::default());
    let mut rng = SmallRng::seed_from_u64(7);
    let mut problems = vec![example()];
    problems.extend((0..20).map(|_| random_problem(&mut rng)));

    for problem in problems {
        let n = problem.nvars();
        let mut tableau = Tableau::new(&problem).unwrap();
        while let PivotOutcome::Pivoted { .. } = solver.step(&mut tableau) {
            for (row, &column) in tableau.basis().iter().enumerate() {
                assert_eq!(tableau.basic_row(column, tol), Some(row));
            }
            let x = tableau.primal(tol);
            let s = tableau.slack(tol);
            let mut ax = vec![0.0; problem.ncons()];
            problem.constraints.apply(&x, &mut ax);
            for i in 0..problem.ncons() {
                assert_abs_diff_eq!(ax[i] + s[i], problem.rhs[i], epsilon = 1e-9);
                assert!(s[i] >= -tol);
            }
            assert!(x.iter().all(|&v| v >= -tol));
            assert_eq!(x.len(), n);
        }
    }
}

#[test]
fn unbounded_direction_is_reported() {
    let a = DenseMatrix::from_rows(&[vec![1.0, -1.0], vec![-1.0, 0.5]]).unwrap();
    let problem = ProblemLP::new(vec![1.0, 1.0], a, vec![2.0, 1.0]).unwrap();
    let solution = SimplexSolver::new(SolveOptions::default())
        .solve(&problem)
        .expect("solve");
    assert_eq!(solution.status, Status::Unbounded);
}
