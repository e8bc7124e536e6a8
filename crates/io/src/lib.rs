#![forbid(unsafe_code)]

use anyhow::{anyhow, Context, Result};
use lpkit_core::math::Scalar;
use lpkit_core::options::SolveOptions;
use lpkit_core::problem::ProblemLP;
use lpkit_core::solution::Solution;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// A problem together with the optional interior starting point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProblemFile {
    pub problem: ProblemLP<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Vec<Scalar>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader
        .read_to_string(&mut contents)
        .with_context(|| format!("failed to read {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {:?}", path))
}

fn write_json<T: Serialize, P: AsRef<Path>>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create parent directory {:?}", parent))?;
        }
    }
    let file = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .with_context(|| format!("failed to serialise into {:?}", path))?;
    writer
        .flush()
        .with_context(|| format!("failed to write {:?}", path))?;
    Ok(())
}

pub fn read_json_problem<P: AsRef<Path>>(path: P) -> Result<ProblemFile> {
    let path = path.as_ref();
    let contents: serde_json::Value = read_json(path)?;
    if contents.get("problem").is_none() && contents.get("status").is_some() {
        return Err(anyhow!(
            "{:?} contains a solver solution, expected a problem with a 'problem' field",
            path
        ));
    }
    let file: ProblemFile =
        serde_json::from_value(contents).context("failed to parse JSON problem")?;
    file.problem
        .validate()
        .with_context(|| format!("invalid problem in {:?}", path))?;
    Ok(file)
}

pub fn write_json_problem<P: AsRef<Path>>(path: P, problem: &ProblemFile) -> Result<()> {
    write_json(path, problem)
}

pub fn write_solution<P: AsRef<Path>>(path: P, solution: &Solution<Scalar>) -> Result<()> {
    write_json(path, solution)
}

/// Loads solver options; omitted fields keep their defaults.
pub fn read_options<P: AsRef<Path>>(path: P) -> Result<SolveOptions<Scalar>> {
    let options: SolveOptions<Scalar> = read_json(path.as_ref())?;
    options
        .validate()
        .with_context(|| format!("invalid options in {:?}", path.as_ref()))?;
    Ok(options)
}
