//! Benchmark invocation wrapper.
//!
//! Builds the external tau-bench runner command line and supervises the
//! child process. Trial orchestration, environment simulation and scoring
//! all live inside the runner itself; this module only forwards
//! configuration and reports the exit status.

mod config;
mod runner;

pub use config::{AgentStrategy, BenchEnv, BenchRunConfig, UserStrategy, DEFAULT_RUNNER_COMMAND};
pub use runner::{BenchRunner, RunOutcome};
