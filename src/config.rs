//! Configuration for solvebatch.
//!
//! Loaded from an explicit path, .solvebatch.yml, or
//! ~/.config/solvebatch/solvebatch.yml, falling back to defaults.

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::harness::{DEFAULT_INPUT_SUFFIX, DEFAULT_SOLVER, HarnessConfig};
use crate::store::{DEFAULT_LOG_SUFFIX, LogLayout, ResultStore};

/// Project-local config file name.
pub const PROJECT_CONFIG: &str = ".solvebatch.yml";

/// Harness configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Solver executable to run for every entry.
    pub solver: PathBuf,

    /// Directory under which run directories are created.
    #[serde(rename = "result-dir")]
    pub result_dir: PathBuf,

    /// Suffix of corpus input files.
    #[serde(rename = "input-suffix")]
    pub input_suffix: String,

    /// Suffix of captured log files.
    #[serde(rename = "log-suffix")]
    pub log_suffix: String,

    /// Placement of log files inside the run directory.
    #[serde(rename = "log-layout")]
    pub log_layout: LogLayout,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            solver: PathBuf::from(DEFAULT_SOLVER),
            result_dir: PathBuf::from("result"),
            input_suffix: DEFAULT_INPUT_SUFFIX.to_string(),
            log_suffix: DEFAULT_LOG_SUFFIX.to_string(),
            log_layout: LogLayout::default(),
        }
    }
}

impl Config {
    /// Resolve the harness settings.
    ///
    /// An explicit `--config` file must load. Otherwise the first candidate
    /// from [`Config::search_paths`] that exists and parses wins; a broken
    /// candidate is logged and skipped. With no usable file the built-in
    /// defaults apply.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path)
                .context(format!("Failed to load config from {}", path.display())),
            None => Ok(Self::first_usable(&Self::search_paths())),
        }
    }

    /// Implicit config locations, most specific first: the working
    /// directory's `.solvebatch.yml`, then the per-user file.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_CONFIG)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("solvebatch").join("solvebatch.yml"));
        }
        paths
    }

    fn first_usable(candidates: &[PathBuf]) -> Self {
        for candidate in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(candidate) {
                Ok(config) => {
                    log::info!("Harness settings from {}", candidate.display());
                    return config;
                }
                Err(e) => log::warn!("Ignoring {}: {:#}", candidate.display(), e),
            }
        }
        log::info!("No harness config found, solver defaults to {}", DEFAULT_SOLVER);
        Self::default()
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.solver.as_os_str().is_empty() {
            eyre::bail!("solver must not be empty");
        }
        check_suffix("input-suffix", &self.input_suffix)?;
        check_suffix("log-suffix", &self.log_suffix)?;
        if self.input_suffix == self.log_suffix {
            eyre::bail!("input-suffix and log-suffix must differ");
        }
        Ok(())
    }

    /// Orchestrator settings derived from this config.
    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig::new(&self.solver).input_suffix(&self.input_suffix)
    }

    /// Result store derived from this config.
    pub fn result_store(&self) -> ResultStore {
        ResultStore::new(&self.result_dir)
            .log_suffix(&self.log_suffix)
            .layout(self.log_layout)
    }
}

fn check_suffix(key: &str, suffix: &str) -> Result<()> {
    match suffix.strip_prefix('.') {
        Some(ext) if !ext.is_empty() && !ext.contains(['.', '/', '\\']) => Ok(()),
        _ => eyre::bail!("{} must look like '.ext', got '{}'", key, suffix),
    }
}
