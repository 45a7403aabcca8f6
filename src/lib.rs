//! tau-harness: operational wrapper around the tau-bench agent benchmark.
//!
//! Launches the external benchmark runner against Grok models via the xAI
//! API, then post-processes the resulting JSON logs: failure-mode
//! classification and per-trajectory scoring with a judge model.

// Core modules
pub mod bench;
pub mod classify;
pub mod cli;
pub mod error;
pub mod judge;
pub mod llm;
pub mod results;
pub mod utils;

// Re-export commonly used error types
pub use error::{BenchError, EvalError, LlmError, ResultsError};
