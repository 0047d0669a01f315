// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! CLI module for running form analysis.
//!
//! This module contains the command-line interface logic, including argument parsing,
//! console logging and the subcommand implementations.

// Modules
/// CLI arguments.
pub mod args;

/// Subcommand logic.
pub mod commands;

/// Console logging macros.
pub mod logging;
