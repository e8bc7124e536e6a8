use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use lpkit_api::{Method, Solver};
use lpkit_benches::random_problem;
use lpkit_core::math::Scalar;
use lpkit_core::options::SolveOptions;
use rand::{rngs::SmallRng, SeedableRng};

fn simplex_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("simplex_lp_solve");
    let mut rng = SmallRng::seed_from_u64(42);
    group.bench_function("n=40_m=30", |b| {
        b.iter_batched(
            || random_problem(40, 30, &mut rng).0,
            |problem| {
                let solver = Solver::<Scalar>::new()
                    .method(Method::Simplex)
                    .options(SolveOptions::default());
                let _ = solver.solve_lp(&problem).unwrap();
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

fn affine_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("affine_scaling_lp_solve");
    let mut rng = SmallRng::seed_from_u64(7);
    for step in [0.5, 0.9] {
        group.bench_function(format!("n=20_m=15_alpha={step}"), |b| {
            b.iter_batched(
                || random_problem(20, 15, &mut rng),
                |(problem, start)| {
                    let solver = Solver::<Scalar>::new()
                        .method(Method::AffineScaling)
                        .options(SolveOptions::default().with_step(step))
                        .start(start);
                    let _ = solver.solve_lp(&problem).unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, simplex_benchmark, affine_benchmark);
criterion_main!(benches);
