//! Child-process supervision for the external benchmark runner.

use std::process::Stdio;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::config::BenchRunConfig;
use crate::error::BenchError;
use crate::llm::xai::API_KEY_ENV_VAR;

/// Outcome of one benchmark invocation.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    /// Unique identifier for this invocation.
    pub run_id: String,
    /// Full command line that was executed.
    pub command: String,
    /// Exit code reported by the runner.
    pub exit_code: i32,
    /// When the runner was launched.
    pub started_at: DateTime<Utc>,
    /// Wall-clock duration of the run.
    pub duration_secs: f64,
}

/// Launches the external benchmark runner with a forwarded configuration.
pub struct BenchRunner {
    config: BenchRunConfig,
}

impl BenchRunner {
    /// Creates a runner for the given configuration.
    pub fn new(config: BenchRunConfig) -> Self {
        Self { config }
    }

    /// Spawn the external runner and wait for it to finish.
    ///
    /// Stdio is inherited so benchmark progress streams live. Both the agent
    /// and the simulated user run on the xAI provider, so the credential is
    /// checked before anything is spawned.
    pub async fn run(&self) -> Result<RunOutcome, BenchError> {
        if std::env::var(API_KEY_ENV_VAR).is_err() {
            return Err(BenchError::MissingCredential(API_KEY_ENV_VAR));
        }

        let mut parts = self.config.runner_command.split_whitespace();
        let program = parts.next().ok_or(BenchError::EmptyCommand)?.to_string();
        let mut args: Vec<String> = parts.map(String::from).collect();
        args.extend(self.config.to_args());

        let run_id = format!("bench-{}", Uuid::new_v4());
        let command_line = format!("{} {}", program, args.join(" "));
        info!(run_id = %run_id, command = %command_line, "launching benchmark runner");

        let started_at = Utc::now();
        let start = Instant::now();

        let status = tokio::process::Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|e| BenchError::Spawn {
                command: program.clone(),
                message: e.to_string(),
            })?;

        let duration = start.elapsed();
        let exit_code = status.code().unwrap_or(-1);

        if !status.success() {
            return Err(BenchError::NonZeroExit { code: exit_code });
        }

        info!(
            run_id = %run_id,
            duration_secs = duration.as_secs_f64(),
            "benchmark runner finished"
        );

        Ok(RunOutcome {
            run_id,
            command: command_line,
            exit_code,
            started_at,
            duration_secs: duration.as_secs_f64(),
        })
    }
}
