use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Handover workspace automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the list and lock benchmarks against their std baselines
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Also enable the `tracing` feature while benchmarking
        #[arg(long, default_value_t = false)]
        tracing: bool,
    },
    /// Run the test suite with and without the `tracing` feature
    Test,
}

const BENCHES: &[&str] = &["coupled_list_benchmark", "sync_benchmark"];

/// Functions whose name starts with this prefix are the comparison baseline.
const BASELINE_PREFIX: &str = "std_";

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            tracing,
        } => {
            if !report_only {
                run_benchmarks(quick, tracing)?;
            }
            generate_report()?;
        }
        Commands::Test => run_tests()?,
    }

    Ok(())
}

/// Feature sets the library must build and pass its tests under.
const FEATURE_SETS: &[&[&str]] = &[&[], &["tracing"]];

fn run_tests() -> Result<()> {
    for features in FEATURE_SETS {
        let label = if features.is_empty() { "default".to_string() } else { features.join(",") };
        println!("\n>>> cargo test ({label})");

        let mut cmd = Command::new("cargo");
        cmd.arg("test").arg("-p").arg("handover");
        if !features.is_empty() {
            cmd.arg("--features").arg(features.join(","));
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run tests ({label})"))?;
        if !status.success() {
            anyhow::bail!("tests failed with features: {label}");
        }
    }

    Ok(())
}

fn run_benchmarks(quick: bool, tracing: bool) -> Result<()> {
    println!("Running benchmarks...");

    for bench in BENCHES {
        println!("\n>>> {bench}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0");
        cmd.arg("bench").arg("--bench").arg(bench);
        if tracing {
            cmd.arg("--features").arg("tracing");
        }

        // Args for the test runner (Criterion) go after --
        cmd.arg("--");
        if quick {
            cmd.arg("--measurement-time").arg("0.1");
            cmd.arg("--noplot");
            cmd.arg("--sample-size").arg("10");
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench {bench}"))?;

        if status.success() {
            println!("Finished {bench} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark {bench} failed");
        }
    }

    Ok(())
}

/// The parts of criterion's `benchmark.json` the report needs.
#[derive(Deserialize)]
struct BenchmarkMeta {
    group_id: String,
    function_id: Option<String>,
    value_str: Option<String>,
    throughput: Option<Throughput>,
}

#[derive(Deserialize)]
enum Throughput {
    Elements(u64),
    Bytes(u64),
    BytesDecimal(u64),
}

#[derive(Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Deserialize)]
struct Estimate {
    point_estimate: f64,
}

struct Measurement {
    function: String,
    parameter: String,
    time_ns: f64,
    elements: Option<u64>,
}

fn generate_report() -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new("target/criterion");
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut results: BTreeMap<String, Vec<Measurement>> = BTreeMap::new();
    collect_results(criterion_dir, &mut results)?;

    let report_path = Path::new("benchmark_results/report.md");
    if let Some(parent) = report_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = fs::File::create(report_path)
        .with_context(|| format!("Failed to create {}", report_path.display()))?;

    writeln!(file, "# Benchmark Report")?;

    for (group, measurements) in &mut results {
        measurements.sort_by(|a, b| (&a.parameter, &a.function).cmp(&(&b.parameter, &b.function)));

        writeln!(file, "\n## {group}\n")?;
        writeln!(file, "| Benchmark | Parameter | Mean | Throughput | vs std |")?;
        writeln!(file, "|---|---|---|---|---|")?;

        for m in measurements.iter() {
            let baseline = measurements
                .iter()
                .find(|b| b.parameter == m.parameter && b.function.starts_with(BASELINE_PREFIX))
                .map(|b| b.time_ns);
            let rel = match baseline {
                Some(base) if m.time_ns > 0.0 => format!("**{:.2}x**", base / m.time_ns),
                _ => "-".to_string(),
            };
            let throughput = m
                .elements
                .map_or_else(|| "-".to_string(), |e| format_ops(e as f64 * 1e9 / m.time_ns));

            writeln!(
                file,
                "| {} | {} | {} | {} | {} |",
                m.function,
                if m.parameter.is_empty() { "-" } else { m.parameter.as_str() },
                format_time(m.time_ns),
                throughput,
                rel
            )?;
        }
    }

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M elem/s", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K elem/s", ops / 1_000.0)
    } else {
        format!("{ops:.0} elem/s")
    }
}

fn format_time(ns: f64) -> String {
    if ns > 1_000_000.0 {
        format!("{:.2} ms", ns / 1_000_000.0)
    } else if ns > 1_000.0 {
        format!("{:.2} µs", ns / 1_000.0)
    } else {
        format!("{ns:.1} ns")
    }
}

/// Walks `target/criterion` for `new/` result directories.
fn collect_results(dir: &Path, results: &mut BTreeMap<String, Vec<Measurement>>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return Ok(()),
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        if path.file_name().and_then(|s| s.to_str()) != Some("new") {
            collect_results(&path, results)?;
            continue;
        }

        let meta_path = path.join("benchmark.json");
        let estimates_path = path.join("estimates.json");
        if !meta_path.exists() || !estimates_path.exists() {
            continue;
        }

        let meta: BenchmarkMeta = serde_json::from_str(&fs::read_to_string(&meta_path)?)
            .with_context(|| format!("Malformed {}", meta_path.display()))?;
        let estimates: Estimates = serde_json::from_str(&fs::read_to_string(&estimates_path)?)
            .with_context(|| format!("Malformed {}", estimates_path.display()))?;

        let elements = match meta.throughput {
            Some(Throughput::Elements(n)) => Some(n),
            Some(Throughput::Bytes(_) | Throughput::BytesDecimal(_)) | None => None,
        };

        results.entry(meta.group_id).or_default().push(Measurement {
            function: meta.function_id.unwrap_or_default(),
            parameter: meta.value_str.unwrap_or_default(),
            time_ns: estimates.mean.point_estimate,
            elements,
        });
    }

    Ok(())
}
