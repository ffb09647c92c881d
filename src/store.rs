//! Result storage.
//!
//! Each harness run gets one fresh directory named after the local start
//! time (`YYYYMMDD-HHMMSS`). The run directory also owns the mapping from a
//! corpus entry to the log file that receives the solver's stderr.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, Timelike};
use log::info;
use serde::{Deserialize, Serialize};

use crate::corpus::CorpusEntry;
use crate::error::{HarnessError, Result};

/// strftime pattern for run directory names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Default suffix for captured solver logs.
pub const DEFAULT_LOG_SUFFIX: &str = ".txt";

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Where log files land inside a run directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLayout {
    /// Every log directly under the run directory, named after the entry's
    /// base name. Entries sharing a base name overwrite each other.
    #[default]
    Flat,
    /// Logs mirror the entry's directories relative to the corpus root.
    Nested,
}

/// Creates run directories under a base directory.
#[derive(Debug, Clone)]
pub struct ResultStore {
    base_dir: PathBuf,
    log_suffix: String,
    layout: LogLayout,
}

impl ResultStore {
    /// Create a store rooted at `base_dir` with the default log naming.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            log_suffix: DEFAULT_LOG_SUFFIX.to_string(),
            layout: LogLayout::default(),
        }
    }

    /// Set the log file suffix (including the leading `.`)
    pub fn log_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.log_suffix = suffix.into();
        self
    }

    /// Set the log layout
    pub fn layout(mut self, layout: LogLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Create `base_dir/<timestamp>` for a new run.
    ///
    /// Fails with [`HarnessError::RunDirectoryCollision`] if that directory
    /// already exists; there is no retry or disambiguation.
    pub fn create_run(&self, clock: &dyn Clock) -> Result<RunDirectory> {
        let now = clock.now().naive_local();
        let timestamp = now.with_nanosecond(0).unwrap_or(now);
        let path = self
            .base_dir
            .join(timestamp.format(TIMESTAMP_FORMAT).to_string());

        fs::create_dir_all(&self.base_dir).map_err(|source| HarnessError::IoFailure {
            path: self.base_dir.clone(),
            source,
        })?;

        match fs::create_dir(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(HarnessError::RunDirectoryCollision(path));
            }
            Err(source) => return Err(HarnessError::IoFailure { path, source }),
        }

        info!("Created run directory {}", path.display());
        Ok(RunDirectory {
            timestamp,
            path,
            log_suffix: self.log_suffix.clone(),
            layout: self.layout,
        })
    }
}

/// Output directory of one harness run.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    timestamp: NaiveDateTime,
    path: PathBuf,
    log_suffix: String,
    layout: LogLayout,
}

impl RunDirectory {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Local start time, second resolution.
    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    pub fn layout(&self) -> LogLayout {
        self.layout
    }

    /// Log file location for `entry`: its base name with the final
    /// extension swapped for the log suffix. Does no I/O.
    ///
    /// Whatever the final extension is gets replaced, so this assumes the
    /// entry came from an enumeration filtered on the input suffix.
    pub fn log_path_for(&self, entry: &CorpusEntry) -> PathBuf {
        let extension = self.log_suffix.trim_start_matches('.');
        let log_name = match entry.relative().file_name() {
            Some(name) => Path::new(name).with_extension(extension),
            None => PathBuf::from(format!("{}{}", entry.file_name(), self.log_suffix)),
        };

        match (self.layout, entry.relative().parent()) {
            (LogLayout::Nested, Some(parent)) if !parent.as_os_str().is_empty() => {
                self.path.join(parent).join(log_name)
            }
            _ => self.path.join(log_name),
        }
    }
}
