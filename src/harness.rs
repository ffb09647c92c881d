//! Harness orchestration.
//!
//! Pulls corpus entries one at a time and runs the solver on each, strictly
//! sequentially: the next child is never started before the previous one
//! has exited. There is no timeout and no retry; the first error ends the
//! run.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::{debug, info, warn};

use crate::corpus::{CorpusEntry, enumerate};
use crate::error::{HarnessError, Result};
use crate::store::{LogLayout, RunDirectory};

/// Default solver location, relative to the working directory.
pub const DEFAULT_SOLVER: &str = "target/debug/solve_sat";

/// Default suffix of corpus input files.
pub const DEFAULT_INPUT_SUFFIX: &str = ".cnf";

/// Settings the orchestrator is constructed with.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Solver executable, spawned with no arguments
    pub solver: PathBuf,
    /// Only files with this suffix are run
    pub input_suffix: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            solver: PathBuf::from(DEFAULT_SOLVER),
            input_suffix: DEFAULT_INPUT_SUFFIX.to_string(),
        }
    }
}

impl HarnessConfig {
    /// Create a config for the given solver with the default input suffix
    pub fn new(solver: impl Into<PathBuf>) -> Self {
        Self {
            solver: solver.into(),
            ..Default::default()
        }
    }

    /// Set the input suffix
    pub fn input_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.input_suffix = suffix.into();
        self
    }
}

/// Outcome of one solver invocation. Not persisted.
#[derive(Debug, Clone)]
pub struct ExecutionRecord {
    pub entry: CorpusEntry,
    pub log_path: PathBuf,
    /// `None` when the child was terminated by a signal
    pub exit_code: Option<i32>,
}

/// Runs the solver over a corpus.
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Settings this harness was constructed with
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every matching file under `root`, writing progress markers to
    /// stdout. Returns the number of entries processed.
    pub fn run(&self, root: &Path, run_dir: &RunDirectory) -> Result<usize> {
        let stdout = io::stdout();
        let mut progress = stdout.lock();
        self.run_with_progress(root, run_dir, &mut progress)
    }

    /// Same as [`Harness::run`] with an explicit progress stream.
    pub fn run_with_progress<W: Write>(
        &self,
        root: &Path,
        run_dir: &RunDirectory,
        progress: &mut W,
    ) -> Result<usize> {
        info!(
            "Running {} over {} (suffix {})",
            self.config.solver.display(),
            root.display(),
            self.config.input_suffix
        );

        let mut processed = 0;
        for entry in enumerate(root, Some(self.config.input_suffix.as_str())) {
            let record = self.execute(&entry?, run_dir, progress)?;
            debug!(
                "{} -> {} (exit code {:?})",
                record.entry.path().display(),
                record.log_path.display(),
                record.exit_code
            );
            processed += 1;
        }

        info!("Processed {} entries into {}", processed, run_dir.path().display());
        Ok(processed)
    }

    fn execute<W: Write>(
        &self,
        entry: &CorpusEntry,
        run_dir: &RunDirectory,
        progress: &mut W,
    ) -> Result<ExecutionRecord> {
        write!(progress, "{},", entry.file_name())?;
        progress.flush()?;

        let log_path = run_dir.log_path_for(entry);
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent).map_err(|source| HarnessError::IoFailure {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        if run_dir.layout() == LogLayout::Flat && log_path.exists() {
            warn!(
                "{} overwrites an earlier log with the same name",
                entry.path().display()
            );
        }

        let log = File::create(&log_path).map_err(|source| HarnessError::IoFailure {
            path: log_path.clone(),
            source,
        })?;
        let input = File::open(entry.path()).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                HarnessError::PathNotFound(entry.path().to_path_buf())
            } else {
                HarnessError::IoFailure {
                    path: entry.path().to_path_buf(),
                    source,
                }
            }
        })?;

        let spawn_failure = |source: io::Error| HarnessError::SpawnFailure {
            solver: self.config.solver.clone(),
            source,
        };
        let mut child = Command::new(&self.config.solver)
            .stdin(Stdio::from(input))
            .stdout(Stdio::inherit())
            .stderr(Stdio::from(log))
            .spawn()
            .map_err(spawn_failure)?;
        let status = child.wait().map_err(spawn_failure)?;

        Ok(ExecutionRecord {
            entry: entry.clone(),
            log_path,
            exit_code: status.code(),
        })
    }
}
