//! Data model and loader for tau-bench results files.
//!
//! The record schema is owned by the benchmark, not by this crate: only the
//! fields the post-processing passes consume are typed, everything else rides
//! along as raw JSON. Loads both a single JSON array and JSON-lines, since
//! both shapes appear under `results/`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ResultsError;

/// Task identifier as emitted by the benchmark.
///
/// Integer in current dumps, string in some older ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Int(i64),
    Str(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Int(n) => write!(f, "{}", n),
            TaskId::Str(s) => write!(f, "{}", s),
        }
    }
}

/// One benchmark trial as recorded in a results file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialRecord {
    #[serde(default)]
    pub task_id: Option<TaskId>,

    /// Reward for the trial; a missing reward counts as a failure.
    #[serde(default)]
    pub reward: f64,

    #[serde(default)]
    pub info: TrialInfo,

    /// Transcript of agent/user/tool messages, kept loosely typed.
    #[serde(default)]
    pub traj: Vec<Value>,
}

impl TrialRecord {
    /// Trials below full reward are failures.
    pub fn is_failure(&self) -> bool {
        self.reward < 1.0
    }

    /// Printable task id, "unknown" when the record carries none.
    pub fn task_id_display(&self) -> String {
        self.task_id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// Trial metadata block.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrialInfo {
    #[serde(default)]
    pub task: TaskSpec,

    #[serde(default)]
    pub reward_info: RewardInfo,
}

/// The task as the evaluated model saw and acted on it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Instruction given to the simulated user.
    #[serde(default)]
    pub instruction: Option<String>,

    /// Tool actions the model executed.
    #[serde(default)]
    pub actions: Option<Value>,

    /// Outputs the model produced.
    #[serde(default)]
    pub outputs: Option<Value>,
}

/// Ground-truth side of the reward computation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardInfo {
    /// Ground-truth tool actions.
    #[serde(default)]
    pub actions: Option<Value>,

    #[serde(default)]
    pub info: RewardDetails,
}

/// Nested reward details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardDetails {
    /// Ground-truth outputs.
    #[serde(default)]
    pub outputs: Option<Value>,
}

/// Load all trials from a results file.
///
/// Accepts either a single JSON array or JSON-lines (one record per line,
/// blank lines skipped). Malformed JSONL lines fail the load with their line
/// number.
pub fn load_trials(path: &Path) -> Result<Vec<TrialRecord>, ResultsError> {
    if !path.exists() {
        return Err(ResultsError::NotFound {
            path: path.display().to_string(),
        });
    }

    let raw = std::fs::read_to_string(path)?;
    let trimmed = raw.trim_start();

    if trimmed.starts_with('[') {
        let trials: Vec<TrialRecord> = serde_json::from_str(trimmed)?;
        return Ok(trials);
    }

    let mut trials = Vec::new();
    for (idx, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: TrialRecord =
            serde_json::from_str(line).map_err(|e| ResultsError::MalformedLine {
                line: idx + 1,
                message: e.to_string(),
            })?;
        trials.push(record);
    }
    Ok(trials)
}
