use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use solvebatch::config::Config;
use solvebatch::{Harness, SystemClock};

/// Diagnostic log location: `<data_local_dir>/solvebatch/logs/solvebatch.log`.
fn diagnostics_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("solvebatch")
        .join("logs")
        .join("solvebatch.log")
}

/// Route `log` output to the diagnostics file. Stdout carries progress
/// markers and solver output, so nothing from the logger goes there.
fn setup_logging() -> Result<()> {
    let log_path = diagnostics_log_path();
    if let Some(dir) = log_path.parent() {
        fs::create_dir_all(dir)
            .context(format!("Failed to create {}", dir.display()))?;
    }

    let sink = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .context(format!("Failed to open {}", log_path.display()))?;

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(sink)))
        .init();

    info!("solvebatch {} diagnostics -> {}", env!("CARGO_PKG_VERSION"), log_path.display());
    Ok(())
}

fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting run over {}", cli.root.display());

    let harness = Harness::new(config.harness_config());
    if cli.is_verbose() {
        println!("{} {}", "Solver:".cyan(), harness.config().solver.display());
        println!("{} {}", "Corpus:".cyan(), cli.root.display());
    }

    let run_dir = config
        .result_store()
        .create_run(&SystemClock)
        .context("Failed to create run directory")?;

    if cli.is_verbose() {
        println!("{} {}", "Results:".cyan(), run_dir.path().display());
    }

    let processed = harness.run(&cli.root, &run_dir);
    // End the progress line before any error report
    println!();
    let processed = processed.context(format!("Run over {} failed", cli.root.display()))?;

    println!(
        "{} {} file(s), logs in {}",
        "Processed".green(),
        processed,
        run_dir.path().display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging().context("Failed to setup logging")?;

    // Config file first, then command-line overrides
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    info!("Resolved config: {:?}", config);

    run_application(&cli, &config).context("Harness run failed")
}
