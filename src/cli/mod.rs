//! Command-line interface for tau-harness.
//!
//! Provides the benchmark invocation wrapper and the post-processing
//! commands (failure classification, trajectory judging).

mod commands;

pub use commands::{parse_cli, run, run_with_cli};
