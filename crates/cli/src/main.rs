#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use lpkit_api::{run_reference_suite, Method, Solver, SuiteReport};
use lpkit_core::math::Scalar;
use lpkit_core::options::SolveOptions;
use lpkit_core::solution::Solution;
use lpkit_io::{read_json_problem, read_options, write_solution};
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lpkit")]
#[command(version, about = "Affine scaling and simplex solvers for dense linear programs")]
struct Cli {
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem with a single method.
    Solve {
        #[arg(long)]
        problem: PathBuf,
        #[arg(long, default_value = "simplex")]
        method: MethodArg,
        /// Affine scaling step size in (0, 1).
        #[arg(long)]
        alpha: Option<f64>,
        #[command(flatten)]
        overrides: Overrides,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Validate a problem and run the applicability checks.
    Check {
        #[arg(long)]
        problem: PathBuf,
    },
    /// Run both affine scaling step sizes and the simplex method.
    Compare {
        #[arg(long)]
        problem: PathBuf,
        #[command(flatten)]
        overrides: Overrides,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Affine,
    Simplex,
}

impl From<MethodArg> for Method {
    fn from(arg: MethodArg) -> Method {
        match arg {
            MethodArg::Affine => Method::AffineScaling,
            MethodArg::Simplex => Method::Simplex,
        }
    }
}

/// Solver settings shared by `solve` and `compare`.
#[derive(Args)]
struct Overrides {
    #[arg(long)]
    tol: Option<f64>,
    #[arg(long)]
    max_iters: Option<usize>,
    /// Wall-clock limit in seconds.
    #[arg(long)]
    time_limit: Option<u64>,
    /// JSON file with solver options; flags take precedence.
    #[arg(long)]
    options: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_json)?;
    match cli.command {
        Commands::Solve {
            problem,
            method,
            alpha,
            overrides,
            output,
            json,
        } => {
            let mut options = build_options(&overrides)?;
            if let Some(alpha) = alpha {
                options.affine_step = alpha as Scalar;
            }
            options.validate().context("invalid solver options")?;
            solve_command(problem, method.into(), options, output, json)
        }
        Commands::Check { problem } => check_command(problem),
        Commands::Compare {
            problem,
            overrides,
            json,
        } => {
            let options = build_options(&overrides)?;
            options.validate().context("invalid solver options")?;
            compare_command(problem, options, json)
        }
    }
}

fn initialize_tracing(log_json: bool) -> Result<()> {
    if log_json {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .try_init()
            .ok();
    }
    Ok(())
}

fn build_options(overrides: &Overrides) -> Result<SolveOptions<Scalar>> {
    let mut options = match &overrides.options {
        Some(path) => read_options(path)?,
        None => SolveOptions::<Scalar>::default(),
    };
    if let Some(tolerance) = overrides.tol {
        options.tolerance = tolerance as Scalar;
    }
    if let Some(iters) = overrides.max_iters {
        options.max_iterations = iters;
    }
    if let Some(limit) = overrides.time_limit {
        options.max_time = Some(Duration::from_secs(limit));
    }
    Ok(options)
}

fn solve_command(
    path: PathBuf,
    method: Method,
    options: SolveOptions<Scalar>,
    output: Option<PathBuf>,
    output_json: bool,
) -> Result<()> {
    let file = read_json_problem(&path)?;
    let mut solver = Solver::<Scalar>::new().method(method).options(options);
    if let Some(start) = file.start {
        solver = solver.start(start);
    }
    let solution = solver
        .solve_lp(&file.problem)
        .with_context(|| format!("failed to solve {:?}", path))?;
    if output_json {
        print_json(&solution)?;
    } else {
        print_solution(&format!("{:?}", method), &solution);
    }
    if let Some(path) = output {
        write_solution(path, &solution)?;
    }
    Ok(())
}

fn check_command(path: PathBuf) -> Result<()> {
    let file = read_json_problem(&path)?;
    let mut solver = Solver::<Scalar>::new();
    if let Some(start) = file.start.clone() {
        solver = solver.start(start);
    }
    match solver.check(&file.problem) {
        Ok(()) => {
            println!(
                "problem with {} variables and {} constraints is applicable",
                file.problem.nvars(),
                file.problem.ncons()
            );
            if file.start.is_none() {
                println!("no starting point given; only the constraint rows were checked");
            }
        }
        Err(err) => match err.status() {
            Some(status) => println!("status: {:?}\nreason: {}", status, err),
            None => return Err(err).context("problem validation failed"),
        },
    }
    Ok(())
}

fn compare_command(
    path: PathBuf,
    options: SolveOptions<Scalar>,
    output_json: bool,
) -> Result<()> {
    let file = read_json_problem(&path)?;
    let start = file
        .start
        .context("compare needs a starting point in the problem file")?;
    let report = run_reference_suite(&file.problem, &start, options)?;
    if output_json {
        print_json(&report)?;
    } else {
        print_report(&report);
    }
    Ok(())
}

fn print_json<S: serde::Serialize>(value: &S) -> Result<()> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    handle.write_all(b"\n")?;
    handle.flush()?;
    Ok(())
}

fn print_solution(label: &str, solution: &Solution<Scalar>) {
    println!(
        "{label}\n  status: {:?}\n  objective: {:.6}\n  iters: {}\n  x: [{}]",
        solution.status,
        solution.objective_value,
        solution.iterations,
        solution.primal.iter().map(|v| format!("{v:.6}")).join(", ")
    );
}

fn print_report(report: &SuiteReport<Scalar>) {
    for run in &report.affine {
        print_solution(&format!("affine scaling (alpha = {})", run.step), &run.solution);
    }
    print_solution("simplex", &report.simplex);
}
