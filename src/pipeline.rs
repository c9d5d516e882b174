// SPDX-License-Identifier: AGPL-3.0-only

//! Orchestration: hierarchy → coupling → reduction → artifacts.
//!
//! One run builds a model from the HK hierarchy, derives its quadratic
//! coupling structure, reduces the monomial basis, and writes four
//! artifacts under the configured output directory:
//!
//!   - `fQ_<model>.txt` — serialized coupling structure, one term per line
//!   - `Monoms_<model>_deg_<D>.csv` — reduced basis rows, then the
//!     monomials removed by cancellation (so either basis can be read back)
//!   - `MonomStats.csv` — appended row of per-stage counts and timing
//!   - `summary_<model>.json` — machine-readable run summary
//!
//! All paths and the model naming template come from [`RunConfig`]; the
//! core modules stay free of I/O. Failures before the artifact phase leave
//! the output directory untouched.

use crate::coupling::{Coupling, CouplingConstructor, GalerkinCoupling, LORENZ_WAVENUMBER};
use crate::error::MonomError;
use crate::modes::ModeSystem;
use crate::reduce::{reduce_monomials, LeadingTermRule, Reduction};
use crate::symmetry::hk_symmetry_group;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Model number in the HK hierarchy (>= 1)
    pub hierarchy_level: i64,
    /// Maximum degree of the auxiliary-function ansatz (typically even)
    pub max_degree: i64,
    /// Fundamental horizontal wavenumber k
    pub wavenumber: f64,
    /// Directory receiving all artifacts (created if missing)
    pub out_dir: PathBuf,
    /// Model name override; defaults to "HK<num_vars>"
    pub model_name: Option<String>,
}

impl RunConfig {
    /// Configuration with the default wavenumber (critical Lorenz k = π/√2)
    /// and default model naming.
    #[must_use]
    pub fn new(hierarchy_level: i64, max_degree: i64, out_dir: PathBuf) -> Self {
        Self {
            hierarchy_level,
            max_degree,
            wavenumber: LORENZ_WAVENUMBER,
            out_dir,
            model_name: None,
        }
    }
}

/// Summary of a completed run, also written as `summary_<model>.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    /// Resolved model name
    pub model_name: String,
    /// Hierarchy level the model was generated from
    pub hierarchy_level: i64,
    /// Total variable count
    pub num_vars: usize,
    /// Number of quadratic coupling terms
    pub num_quad_terms: usize,
    /// Requested maximum ansatz degree
    pub max_degree: i64,
    /// Monomial counts after each reduction stage
    pub stage_counts: Vec<usize>,
    /// Size of the final reduced basis
    pub reduced_count: usize,
    /// Wall-clock time for the whole run, seconds
    pub elapsed_s: f64,
}

/// Execute the full pipeline for one model.
///
/// # Errors
///
/// Returns `MonomError::InvalidArgument` for a bad hierarchy level or
/// degree (fail fast, nothing written), or `MonomError::ArtifactWrite` if
/// an output file cannot be produced.
pub fn run(cfg: &RunConfig) -> Result<RunSummary, MonomError> {
    let start = Instant::now();

    let sys = ModeSystem::from_level(cfg.hierarchy_level)?;
    let model_name = cfg
        .model_name
        .clone()
        .unwrap_or_else(|| sys.model_name());
    let num_vars = sys.num_vars();
    println!("  Model {model_name}: level {}, n = {num_vars}", cfg.hierarchy_level);

    let coupling = GalerkinCoupling::new(cfg.wavenumber).couple(&sys);
    println!("  Quadratic terms: {}", coupling.len());

    let group = hk_symmetry_group(&sys);
    let top = cfg.max_degree.max(0) as u32;
    let rule = LeadingTermRule::new(&coupling, num_vars, top);
    let reduction = reduce_monomials(num_vars as i64, cfg.max_degree, &group, &rule)?;
    println!(
        "  Monomials: {} enumerated -> {} symmetric -> {} reduced",
        reduction.stage_counts[0],
        reduction.stage_counts[1],
        reduction.reduced.len()
    );

    fs::create_dir_all(&cfg.out_dir)
        .map_err(|e| artifact_err(&cfg.out_dir, &e))?;
    write_coupling(&cfg.out_dir.join(format!("fQ_{model_name}.txt")), &coupling)?;
    write_monoms(
        &cfg
            .out_dir
            .join(format!("Monoms_{model_name}_deg_{}.csv", cfg.max_degree)),
        &reduction,
    )?;

    let elapsed_s = start.elapsed().as_secs_f64();
    let summary = RunSummary {
        model_name: model_name.clone(),
        hierarchy_level: cfg.hierarchy_level,
        num_vars,
        num_quad_terms: coupling.len(),
        max_degree: cfg.max_degree,
        stage_counts: reduction.stage_counts.clone(),
        reduced_count: reduction.reduced.len(),
        elapsed_s,
    };
    append_stats(&cfg.out_dir.join("MonomStats.csv"), &summary)?;
    write_summary(
        &cfg.out_dir.join(format!("summary_{model_name}.json")),
        &summary,
    )?;
    println!("  Time = {elapsed_s:.3} s");

    Ok(summary)
}

fn artifact_err(path: &Path, err: &dyn std::fmt::Display) -> MonomError {
    MonomError::ArtifactWrite(format!("{}: {err}", path.display()))
}

/// One coupling term per line: `target a b coeff`.
fn write_coupling(path: &Path, coupling: &Coupling) -> Result<(), MonomError> {
    let mut text = String::from("# target a b coeff\n");
    for (term, c) in coupling.terms.iter().zip(&coupling.coeffs) {
        let _ = writeln!(text, "{} {} {} {c:.15e}", term.target, term.a, term.b);
    }
    fs::write(path, text).map_err(|e| artifact_err(path, &e))
}

/// Reduced basis rows first, then the cancelled remainder of the seed.
fn write_monoms(path: &Path, reduction: &Reduction) -> Result<(), MonomError> {
    let mut text = String::new();
    for row in &reduction.reduced {
        let _ = writeln!(text, "{}", join_row(row));
    }
    for row in &reduction.seed {
        if !reduction.reduced.contains(row) {
            let _ = writeln!(text, "{}", join_row(row));
        }
    }
    fs::write(path, text).map_err(|e| artifact_err(path, &e))
}

fn join_row(row: &[u32]) -> String {
    row.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Append one stats row: num_vars, max_degree, stage counts, elapsed.
fn append_stats(path: &Path, summary: &RunSummary) -> Result<(), MonomError> {
    let mut row = vec![
        summary.num_vars.to_string(),
        summary.max_degree.to_string(),
    ];
    row.extend(summary.stage_counts.iter().map(ToString::to_string));
    row.push(format!("{:.3}", summary.elapsed_s));

    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| artifact_err(path, &e))?;
    writeln!(file, "{}", row.join(",")).map_err(|e| artifact_err(path, &e))
}

fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), MonomError> {
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| artifact_err(path, &e))?;
    fs::write(path, json).map_err(|e| artifact_err(path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_row_is_plain_csv() {
        assert_eq!(join_row(&[0, 2, 0, 1]), "0,2,0,1");
        assert_eq!(join_row(&[3]), "3");
    }

    #[test]
    fn invalid_level_fails_before_touching_disk() {
        let dir = std::env::temp_dir().join("rbc_monoms_no_write");
        let cfg = RunConfig::new(0, 4, dir.clone());
        assert!(run(&cfg).is_err());
        assert!(!dir.exists(), "failed run must not create artifacts");
    }
}
