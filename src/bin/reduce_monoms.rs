// SPDX-License-Identifier: AGPL-3.0-only

//! Generate a truncated Rayleigh–Bénard model and its reduced monomial
//! basis, writing all artifacts to the output directory.
//!
//! Run: cargo run --release --bin `reduce_monoms` [--hier=1] [--deg=6]
//!      [--out=Monoms] [--wavenumber=2.2214] [--name=HK4]

use rbc_monoms::pipeline::{run, RunConfig};
use std::path::PathBuf;
use std::process;

struct CliArgs {
    hier: i64,
    deg: i64,
    out: PathBuf,
    wavenumber: Option<f64>,
    name: Option<String>,
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let get = |prefix: &str| -> Option<String> {
        args.iter()
            .find(|a| a.starts_with(prefix))
            .map(|a| a[prefix.len()..].to_string())
    };

    CliArgs {
        hier: get("--hier=").and_then(|s| s.parse().ok()).unwrap_or(1),
        deg: get("--deg=").and_then(|s| s.parse().ok()).unwrap_or(6),
        out: PathBuf::from(get("--out=").unwrap_or_else(|| "Monoms".to_string())),
        wavenumber: get("--wavenumber=").and_then(|s| s.parse().ok()),
        name: get("--name="),
    }
}

fn main() {
    let args = parse_args();

    let mut cfg = RunConfig::new(args.hier, args.deg, args.out);
    if let Some(k) = args.wavenumber {
        cfg.wavenumber = k;
    }
    cfg.model_name = args.name;

    match run(&cfg) {
        Ok(summary) => {
            println!(
                "  {}: {} monomials written to {}",
                summary.model_name,
                summary.reduced_count,
                cfg.out_dir.display()
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
