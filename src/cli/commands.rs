//! CLI definition using clap.

use clap::Parser;
use solvebatch::config::Config;
use std::path::PathBuf;

/// solvebatch - run a solver over every problem file in a corpus
#[derive(Parser, Debug)]
#[command(name = "solvebatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Corpus root: a directory to scan or a single problem file
    pub root: PathBuf,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Solver executable (overrides config)
    #[arg(short, long)]
    pub solver: Option<PathBuf>,

    /// Directory that receives run directories (overrides config)
    #[arg(short, long)]
    pub result_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Apply command-line overrides on top of the loaded config
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(solver) = &self.solver {
            config.solver = solver.clone();
        }
        if let Some(result_dir) = &self.result_dir {
            config.result_dir = result_dir.clone();
        }
    }
}
