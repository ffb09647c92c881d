//! CLI module for solvebatch - command-line interface.
//!
//! Accepts the corpus root plus a few overrides for the loaded configuration.

pub mod commands;

pub use commands::Cli;
