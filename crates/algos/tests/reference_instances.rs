use approx::assert_abs_diff_eq;
use lpkit_algos::{AffineScalingSolver, ApplicabilityChecker, ApplicabilityError, SimplexSolver};
use lpkit_core::math::{norm2, Scalar};
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::{DenseMatrix, ProblemLP};
use lpkit_core::solution::{Applicability, Solution, Status};
use lpkit_core::traits::LinearOperator;

fn problem(cost: Vec<Scalar>, rows: &[Vec<Scalar>], rhs: Vec<Scalar>) -> ProblemLP<Scalar> {
    let a = DenseMatrix::from_rows(rows).expect("rectangular rows");
    ProblemLP::new(cost, a, rhs).expect("valid problem")
}

/// Well-conditioned instances with a strictly interior starting point.
fn instances() -> Vec<(ProblemLP<Scalar>, Vec<Scalar>)> {
    vec![
        (
            problem(
                vec![3.0, 2.0],
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
                vec![4.0, 4.0, 5.0],
            ),
            vec![1.0, 1.0],
        ),
        (
            problem(
                vec![5.0, 4.0, 3.0],
                &[vec![2.0, 3.0, 1.0], vec![4.0, 1.0, 2.0], vec![3.0, 4.0, 2.0]],
                vec![5.0, 11.0, 8.0],
            ),
            vec![0.5, 0.5, 0.5],
        ),
        (
            problem(vec![1.0, 2.0], &[vec![1.0, 1.0], vec![1.0, 3.0]], vec![4.0, 6.0]),
            vec![0.5, 0.5],
        ),
        (
            problem(
                vec![2.0, 3.0, 4.0],
                &[vec![3.0, 2.0, 1.0], vec![2.0, 5.0, 3.0]],
                vec![10.0, 15.0],
            ),
            vec![1.0, 1.0, 1.0],
        ),
    ]
}

#[test]
fn checker_flags_rows_without_positive_entries() {
    let lp = problem(vec![1.0, 1.0], &[vec![-1.0, -2.0]], vec![1.0]);
    let err = ApplicabilityChecker::default()
        .check(&lp, &[1.0, 1.0])
        .unwrap_err();
    assert_eq!(err.status(), Some(Status::NoSolution));
}

#[test]
fn checker_flags_infeasible_start() {
    let lp = problem(
        vec![1.0, 1.0],
        &[vec![1.0, 0.0], vec![0.0, 1.0]],
        vec![4.0, 4.0],
    );
    let err = ApplicabilityChecker::default()
        .check(&lp, &[10.0, 10.0])
        .unwrap_err();
    assert!(matches!(err, ApplicabilityError::InfeasibleStart { .. }));
    assert_eq!(
        err.status(),
        Some(Status::NotApplicable(Applicability::InitialPoint))
    );
}

#[test]
fn simplex_solves_reference_instance() {
    let (lp, _) = instances().remove(0);
    let solution = SimplexSolver::new(SolveOptions::default())
        .solve(&lp)
        .expect("solve");
    assert_eq!(solution.status, Status::Optimal);
    assert_abs_diff_eq!(solution.primal[0], 4.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.primal[1], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.objective_value, 14.0, epsilon = 1e-9);
}

#[test]
fn affine_scaling_solves_reference_instance() {
    let (lp, start) = instances().remove(0);
    let options = SolveOptions::with_tolerance(1e-6).with_step(0.5);
    let solution = AffineScalingSolver::new(options)
        .solve(&lp, &start)
        .expect("solve");
    assert_eq!(solution.status, Status::Optimal);
    assert_abs_diff_eq!(solution.objective_value, 14.0, epsilon = 1e-3);
}

#[test]
fn affine_scaling_matches_simplex_within_tolerance() {
    let eps = 1e-6;
    for (lp, start) in instances() {
        let exact = SimplexSolver::new(SolveOptions::default())
            .solve(&lp)
            .expect("simplex");
        assert_eq!(exact.status, Status::Optimal);
        for alpha in [0.5, 0.9] {
            let options = SolveOptions::with_tolerance(eps).with_step(alpha);
            let approx = AffineScalingSolver::new(options)
                .solve(&lp, &start)
                .expect("affine scaling");
            assert_eq!(approx.status, Status::Optimal);
            let gap = (approx.objective_value - exact.objective_value).abs();
            assert!(
                gap <= eps * norm2(&lp.cost),
                "alpha {alpha}: affine {} vs simplex {}",
                approx.objective_value,
                exact.objective_value
            );
        }
    }
}

#[test]
fn both_solvers_agree_on_textbook_optimum() {
    let (lp, _) = instances().remove(1);
    let solution = SimplexSolver::new(SolveOptions::default())
        .solve(&lp)
        .expect("solve");
    assert_abs_diff_eq!(solution.objective_value, 13.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.primal[0], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.primal[1], 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(solution.primal[2], 1.0, epsilon = 1e-9);
}

/// Instances on which an unrefined projection drifts off `A x + s = b` late
/// in the run and stops at an infeasible point.
fn ill_conditioned_instances() -> Vec<(ProblemLP<Scalar>, Vec<Scalar>)> {
    vec![
        (
            problem(
                vec![2.8, 1.3, 1.5, 3.4],
                &[
                    vec![0.18, 0.34, 1.5, 0.18],
                    vec![0.28, 1.58, 1.46, 0.67],
                    vec![0.42, 1.78, 0.2, 0.51],
                ],
                vec![4.4, 7.1, 9.1],
            ),
            vec![0.89; 4],
        ),
        (
            problem(
                vec![0.7, 2.5, 3.2, 0.5],
                &[
                    vec![0.56, 1.09, 0.89, 1.89],
                    vec![1.25, 0.46, 0.19, 1.92],
                    vec![1.67, 1.31, 1.68, 1.09],
                ],
                vec![6.2, 5.8, 6.3],
            ),
            vec![0.55; 4],
        ),
    ]
}

fn assert_feasible(lp: &ProblemLP<Scalar>, solution: &Solution<Scalar>) {
    let mut ax = vec![0.0; lp.ncons()];
    lp.constraints.apply(&solution.primal, &mut ax);
    for (row, ((lhs, slack), rhs)) in ax.iter().zip(&solution.slack).zip(&lp.rhs).enumerate() {
        assert!(*lhs <= rhs + 1e-8, "row {row}: {lhs} > {rhs}");
        assert!((lhs + slack - rhs).abs() <= 1e-8, "row {row}: slack {slack} off");
    }
    assert!(solution.primal.iter().all(|&v| v > 0.0));
}

#[test]
fn affine_scaling_stays_feasible_on_ill_conditioned_instances() {
    let eps = 1e-6;
    for (lp, start) in ill_conditioned_instances() {
        let exact = SimplexSolver::new(SolveOptions::default())
            .solve(&lp)
            .expect("simplex");
        for alpha in [0.5, 0.9] {
            let options = SolveOptions::with_tolerance(eps).with_step(alpha);
            let approx = AffineScalingSolver::new(options)
                .solve(&lp, &start)
                .expect("affine scaling");
            assert_eq!(approx.status, Status::Optimal, "alpha {alpha}");
            assert_feasible(&lp, &approx);
            let gap = (approx.objective_value - exact.objective_value).abs();
            assert!(
                gap <= eps * norm2(&lp.cost),
                "alpha {alpha}: affine {} vs simplex {}",
                approx.objective_value,
                exact.objective_value
            );
        }
    }
}
