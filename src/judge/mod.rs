//! Trajectory scoring with a judge model.
//!
//! Every episode in a results file is sent to the judge under a strict
//! policy-evaluator rubric; the verdict text lands in one file per episode
//! under the output directory.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::error::EvalError;
use crate::llm::{pricing, GenerationRequest, LlmProvider, Message};
use crate::results::{self, TrialRecord};

/// Scoring rubric for the judge.
const TRAJECTORY_JUDGE_SYSTEM_PROMPT: &str = r#"
You are a strict customer-service agent policy evaluator.

Given:
(1) the user's goal,
(2) the domain rules implicitly encoded in the actions,
(3) the executed tool actions,

evaluate the quality of the tool-use trajectory.

For each tool call, decide whether it is:
- correct (necessary and appropriate for the goal),
- unnecessary (not needed but does not break correctness),
- incorrect (violates the user intent or domain constraints).

Then provide an overall score in the range 1-5, where:
- 5 means all tool calls are correct and necessary with a near-optimal trajectory,
- lower scores penalize incorrect or unnecessary calls and overly long trajectories.

Return your answer as a short, well-structured explanation plus the final numeric score.
"#;

/// Tally of one judging pass.
#[derive(Debug, Clone, Serialize)]
pub struct JudgeSummary {
    /// Episodes scored (one verdict file each).
    pub episodes: usize,
    /// Directory the verdicts were written to.
    pub output_dir: PathBuf,
    /// Approximate input-side judge spend in dollars.
    pub approx_input_cost_usd: f64,
}

/// Scores tool-use trajectories and writes one verdict file per episode.
pub struct TrajectoryJudge {
    judge: Box<dyn LlmProvider>,
    model: String,
}

impl TrajectoryJudge {
    /// Create a trajectory judge using the given provider and model.
    pub fn new(judge: Box<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            judge,
            model: model.into(),
        }
    }

    /// Judge every episode in `input`, writing `<task_id>.txt` files under
    /// `output_dir` (created if absent). A judge failure aborts the pass.
    pub async fn judge_file(
        &self,
        input: &Path,
        output_dir: &Path,
    ) -> Result<JudgeSummary, EvalError> {
        let trials = results::load_trials(input)?;
        if trials.is_empty() {
            warn!(input = %input.display(), "results file contains no episodes");
        }

        std::fs::create_dir_all(output_dir)?;

        let mut summary = JudgeSummary {
            episodes: 0,
            output_dir: output_dir.to_path_buf(),
            approx_input_cost_usd: 0.0,
        };

        for trial in &trials {
            let task_id = trial.task_id_display();
            info!(task_id = %task_id, "scoring episode");

            let content = build_episode_content(trial)?;
            summary.approx_input_cost_usd += pricing::approx_input_cost(&self.model, &content);
            let verdict = self.score_episode(content).await?;

            let out_path = output_dir.join(format!("{task_id}.txt"));
            std::fs::write(&out_path, verdict)?;
            summary.episodes += 1;
        }

        info!(
            episodes = summary.episodes,
            output_dir = %output_dir.display(),
            approx_cost_usd = summary.approx_input_cost_usd,
            "judging pass complete"
        );
        Ok(summary)
    }

    /// Send one episode to the judge and return the verdict text.
    async fn score_episode(&self, content: String) -> Result<String, EvalError> {
        if !pricing::fits_context(&self.model, &content) {
            warn!("episode exceeds the judge context window");
        }

        let request = GenerationRequest::new(
            &self.model,
            vec![
                Message::system(TRAJECTORY_JUDGE_SYSTEM_PROMPT),
                Message::user(content),
            ],
        )
        .with_temperature(0.0);

        let response = self.judge.generate(request).await?;
        response
            .first_content()
            .map(str::to_string)
            .ok_or_else(|| {
                crate::error::LlmError::ParseError("no content in judge response".to_string())
                    .into()
            })
    }
}

/// Assemble the episode excerpt the judge sees.
fn build_episode_content(trial: &TrialRecord) -> Result<String, EvalError> {
    let user_goal = trial.info.task.instruction.as_deref().unwrap_or("");

    let model_actions = trial
        .info
        .task
        .actions
        .clone()
        .unwrap_or_else(|| serde_json::Value::Array(Vec::new()));

    Ok(format!(
        "USER GOAL:\n{}\n\nEXECUTED TOOL ACTIONS (model):\n{}\n\nFULL TRAJECTORY (if available):\n{}",
        user_goal,
        serde_json::to_string_pretty(&model_actions)?,
        serde_json::to_string_pretty(&trial.traj)?,
    ))
}
