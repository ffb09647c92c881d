//! Error types for solvebatch
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// All error types that can occur during a harness run
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Corpus root or an entry vanished
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    /// A corpus path exists but could not be listed or inspected
    #[error("Path not readable: {}: {source}", .path.display())]
    NotReadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A followed symbolic link points back at one of its ancestors
    #[error("Link cycle at {} (points back to {})", .path.display(), .ancestor.display())]
    TraversalLoop { path: PathBuf, ancestor: PathBuf },

    /// The timestamp-named run directory already exists
    #[error("Run directory already exists: {}", .0.display())]
    RunDirectoryCollision(PathBuf),

    /// The solver could not be started or waited on
    #[error("Failed to run solver {}: {source}", .solver.display())]
    SpawnFailure {
        solver: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input or log file could not be opened
    #[error("IO failure on {}: {source}", .path.display())]
    IoFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, HarnessError>;
