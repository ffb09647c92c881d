//! solvebatch - batch execution harness for solver binaries
//!
//! Walks a corpus of problem files in a deterministic order, runs an external
//! solver once per file with the file on stdin, and captures each run's stderr
//! into a timestamped result directory.

pub mod config;
pub mod corpus;
pub mod error;
pub mod harness;
pub mod store;

pub use corpus::{CorpusEntry, enumerate};
pub use error::{HarnessError, Result};
pub use harness::{ExecutionRecord, Harness, HarnessConfig};
pub use store::{Clock, LogLayout, ResultStore, RunDirectory, SystemClock};
