//! Command-line harness: resolves a partial JSON config, runs the pipeline on
//! a synthetic grid and prints a JSON summary of the run.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use mapgen_core::{resolve_with_report, ConfigValidationError, MapGenerator, MemoryGrid};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mapgen", about = "Story-driven map generation on a synthetic grid")]
struct Args {
    /// Partial JSON config; missing groups fall back to defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for every stage.
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    #[arg(long, default_value_t = 84)]
    width: usize,

    #[arg(long, default_value_t = 54)]
    height: usize,

    /// Print the resolved config and exit.
    #[arg(long)]
    print_config: bool,

    /// Write the summary here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Debug-level logging regardless of RUST_LOG.
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read_config(path: Option<&PathBuf>) -> Result<Value> {
    let Some(path) = path else {
        return Ok(Value::Object(Default::default()));
    };
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn emit(text: &str, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let raw = read_config(args.config.as_ref())?;
    let resolution = resolve_with_report(&raw)?;
    if !resolution.clamped.is_empty() {
        tracing::info!(adjusted = resolution.clamped.len(), "config values clamped or defaulted");
    }

    if args.print_config {
        let text = serde_json::to_string_pretty(&resolution.config)?;
        return emit(&text, args.output.as_ref());
    }

    let mut grid = MemoryGrid::synthetic(args.seed, args.width, args.height);
    let generator = MapGenerator::new(resolution.config, args.seed);
    let result = generator.generate(&mut grid)?;
    let text = serde_json::to_string_pretty(&result.summary())?;
    emit(&text, args.output.as_ref())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(invalid) = e.downcast_ref::<ConfigValidationError>() {
                eprintln!("invalid config: {invalid}");
            } else {
                eprintln!("error: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
