//! Error types for tau-harness operations.
//!
//! Defines error types for the major subsystems:
//! - Judge-model API interactions
//! - Results file loading and parsing
//! - Benchmark runner invocation
//! - Post-processing passes (classification, trajectory judging)

use thiserror::Error;

/// Errors that can occur talking to the judge-model API.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Missing API key: XAI_API_KEY environment variable not set")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse judge response: {0}")]
    ParseError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error ({code}): {message}")]
    ApiError { code: u16, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur loading a benchmark results file.
#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("Results file not found: {path}")]
    NotFound { path: String },

    #[error("Malformed record on line {line}: {message}")]
    MalformedLine { line: usize, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur launching the external benchmark runner.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("Missing credential: {0} environment variable not set")]
    MissingCredential(&'static str),

    #[error("Runner command is empty")]
    EmptyCommand,

    #[error("Failed to spawn benchmark runner '{command}': {message}")]
    Spawn { command: String, message: String },

    #[error("Benchmark runner exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during the post-processing passes.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Results(#[from] ResultsError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Failed to serialize output record: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
