//! Failure-mode classification for failing benchmark trials.
//!
//! Sends a compact excerpt of each failing trial to the judge model and
//! buckets the primary failure cause into one of four categories. One JSONL
//! record is appended per failing trial; records are flushed as they are
//! produced so partial output survives an interrupted pass.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::EvalError;
use crate::llm::{pricing, GenerationRequest, LlmProvider, Message};
use crate::results::{self, TaskId, TrialRecord};
use crate::utils::json_extraction::extract_json_object;

/// Number of trajectory messages included in the judge excerpt.
const TRAJECTORY_SNIPPET_LEN: usize = 8;

/// System prompt pinning the judge to strict JSON output.
const CLASSIFIER_SYSTEM_PROMPT: &str = "You are a strict evaluation assistant. \
    Always output valid JSON with keys 'category' and 'rationale'. \
    Allowed categories: partial_plan_execution, policy_constraint_violation, \
    intent_misinterpretation, overgeneralized_action_pattern.";

/// Failure-mode buckets, plus the degraded outcomes a pass can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Some steps done correctly but the workflow was never completed.
    PartialPlanExecution,
    /// Task understood but a hard domain rule or procedure was violated.
    PolicyConstraintViolation,
    /// Stated intent or a conditional preference was misread or dropped.
    IntentMisinterpretation,
    /// A memorized workflow applied where the instruction did not call for it.
    OvergeneralizedActionPattern,
    /// Judge reply could not be parsed as a known category.
    Unknown,
    /// Judge call failed outright.
    ApiError,
}

impl ErrorCategory {
    /// Categories the judge is allowed to pick from.
    pub const ALLOWED: [&'static str; 4] = [
        "partial_plan_execution",
        "policy_constraint_violation",
        "intent_misinterpretation",
        "overgeneralized_action_pattern",
    ];

    /// Map a judge-supplied category name onto a bucket.
    pub fn from_judge_label(label: &str) -> Option<Self> {
        match label.trim() {
            "partial_plan_execution" => Some(Self::PartialPlanExecution),
            "policy_constraint_violation" => Some(Self::PolicyConstraintViolation),
            "intent_misinterpretation" => Some(Self::IntentMisinterpretation),
            "overgeneralized_action_pattern" => Some(Self::OvergeneralizedActionPattern),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::PartialPlanExecution => "partial_plan_execution",
            Self::PolicyConstraintViolation => "policy_constraint_violation",
            Self::IntentMisinterpretation => "intent_misinterpretation",
            Self::OvergeneralizedActionPattern => "overgeneralized_action_pattern",
            Self::Unknown => "unknown",
            Self::ApiError => "api_error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the error-classification output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub task_id: Option<TaskId>,
    pub reward: f64,
    pub category: ErrorCategory,
    pub rationale: String,
}

/// Tally of one classification pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassifySummary {
    /// Trials seen in the input file.
    pub total_trials: usize,
    /// Trials skipped because they passed.
    pub passed: usize,
    /// Failing trials classified (one output record each).
    pub classified: usize,
    /// Record counts per category label.
    pub by_category: BTreeMap<String, usize>,
    /// Approximate input-side judge spend in dollars.
    pub approx_input_cost_usd: f64,
}

/// Classifies failing trials with a judge model.
pub struct ErrorClassifier {
    judge: Box<dyn LlmProvider>,
    model: String,
    /// Pause between judge calls, for gentle rate limiting.
    sleep_between_calls: Duration,
}

impl ErrorClassifier {
    /// Create a classifier using the given judge provider and model.
    pub fn new(judge: Box<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            judge,
            model: model.into(),
            sleep_between_calls: Duration::ZERO,
        }
    }

    /// Set the pause between judge calls.
    pub fn with_sleep(mut self, sleep: Duration) -> Self {
        self.sleep_between_calls = sleep;
        self
    }

    /// Classify every failing trial in `input`, appending JSONL to `output`.
    pub async fn classify_file(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<ClassifySummary, EvalError> {
        let trials = results::load_trials(input)?;
        if trials.is_empty() {
            warn!(input = %input.display(), "results file contains no trials");
        }

        let mut out = std::fs::File::create(output)?;
        let mut summary = ClassifySummary {
            total_trials: trials.len(),
            ..Default::default()
        };

        for trial in &trials {
            if !trial.is_failure() {
                summary.passed += 1;
                continue;
            }

            let prompt = build_classification_prompt(trial);
            summary.approx_input_cost_usd += pricing::approx_input_cost(&self.model, &prompt);
            let record = self.classify_trial(trial, prompt).await;

            serde_json::to_writer(&mut out, &record)?;
            out.write_all(b"\n")?;
            out.flush()?;

            info!(
                task_id = %trial.task_id_display(),
                category = %record.category,
                "classified trial"
            );
            *summary
                .by_category
                .entry(record.category.to_string())
                .or_insert(0) += 1;
            summary.classified += 1;

            if !self.sleep_between_calls.is_zero() {
                tokio::time::sleep(self.sleep_between_calls).await;
            }
        }

        info!(
            classified = summary.classified,
            passed = summary.passed,
            approx_cost_usd = summary.approx_input_cost_usd,
            "classification pass complete"
        );
        Ok(summary)
    }

    /// Classify one failing trial. Judge failures degrade to `api_error`
    /// records instead of aborting the pass.
    async fn classify_trial(&self, trial: &TrialRecord, prompt: String) -> ClassificationRecord {
        if !pricing::fits_context(&self.model, &prompt) {
            warn!(
                task_id = %trial.task_id_display(),
                "trial excerpt exceeds the judge context window"
            );
        }
        debug!(prompt_len = prompt.len(), "sending classification prompt");

        let request = GenerationRequest::new(
            &self.model,
            vec![
                Message::system(CLASSIFIER_SYSTEM_PROMPT),
                Message::user(prompt),
            ],
        )
        .with_temperature(0.1)
        .with_json_output();

        let (category, rationale) = match self.judge.generate(request).await {
            Ok(response) => parse_verdict(response.first_content().unwrap_or_default()),
            Err(e) => (ErrorCategory::ApiError, format!("judge call failed: {e}")),
        };

        ClassificationRecord {
            task_id: trial.task_id.clone(),
            reward: trial.reward,
            category,
            rationale,
        }
    }
}

/// Judge verdict as requested from the model.
#[derive(Debug, Deserialize)]
struct RawVerdict {
    category: String,
    #[serde(default)]
    rationale: String,
}

/// Parse a judge reply into a category and rationale.
///
/// Unparsable replies become `unknown` with the raw reply kept as the
/// rationale so nothing the judge said is lost.
fn parse_verdict(content: &str) -> (ErrorCategory, String) {
    let Some(raw) = extract_json_object(content) else {
        return (ErrorCategory::Unknown, content.to_string());
    };

    match serde_json::from_str::<RawVerdict>(&raw) {
        Ok(verdict) => match ErrorCategory::from_judge_label(&verdict.category) {
            Some(category) => (category, verdict.rationale),
            None => (ErrorCategory::Unknown, verdict.rationale),
        },
        Err(_) => (ErrorCategory::Unknown, content.to_string()),
    }
}

/// Build the compact trial excerpt sent to the judge.
fn build_classification_prompt(trial: &TrialRecord) -> String {
    let snippet: Vec<&serde_json::Value> =
        trial.traj.iter().take(TRAJECTORY_SNIPPET_LEN).collect();

    let excerpt = json!({
        "task_id": trial.task_id,
        "reward": trial.reward,
        "instruction": trial.info.task.instruction,
        "actions_ground_truth": trial.info.reward_info.actions,
        "outputs_ground_truth": trial.info.reward_info.info.outputs,
        "model_actions": trial.info.task.actions,
        "model_outputs": trial.info.task.outputs,
        "trajectory_snippet": snippet,
    });
    let excerpt_json =
        serde_json::to_string_pretty(&excerpt).unwrap_or_else(|_| excerpt.to_string());

    format!(
        r#"
You are auditing an agent's failure on a tool-using benchmark.

You must classify the **primary** reason for failure into exactly ONE of these four categories:

1) partial_plan_execution
   - The model does some steps correctly but fails to fully complete the required workflow
   - Examples: returns only some requested items; changes only one leg of a round-trip; doesn't compute or apply a refund correctly; stops early.

2) policy_constraint_violation
   - The model understands the task but violates hard domain rules or procedures
   - Examples: uses two certificates when only one is allowed; ignores an explicit business-class request; performs multiple irreversible tool calls when only one is allowed.

3) intent_misinterpretation
   - The model misreads or drops parts of the user's stated intent or conditional preferences
   - Examples: ignores a fallback condition; treats "book later" as "book now"; misses that both directions must be updated; forgets requested bags.

4) overgeneralized_action_pattern
   - The model applies a memorized workflow pattern that doesn't fit this specific instruction
   - Examples: automatically cancels and rebooks when the user only asked to cancel; modifies reservations or orders just because they exist, not because the user asked.

Given the trial excerpt below (JSON), identify which single category best explains why this trial failed (reward < 1).
Then briefly justify your choice based on the mismatch between intended behavior and the model's actions.

TASK_JSON:
{excerpt_json}

Return your answer as a JSON object with exactly these keys:
- "category": one of {allowed:?}
- "rationale": 2-4 sentences explaining why.
"#,
        excerpt_json = excerpt_json,
        allowed = ErrorCategory::ALLOWED,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmError;
    use crate::llm::{Choice, GenerationResponse, Usage};
    use async_trait::async_trait;
    use std::io::Write as _;
    use std::sync::Mutex;

    /// Judge stub that replays canned replies, or errors when exhausted.
    struct ScriptedJudge {
        replies: Mutex<Vec<String>>,
    }

    impl ScriptedJudge {
        fn new(replies: Vec<&str>) -> Self {
            let mut replies: Vec<String> = replies.into_iter().map(String::from).collect();
            replies.reverse();
            Self {
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedJudge {
        async fn generate(
            &self,
            request: GenerationRequest,
        ) -> Result<GenerationResponse, LlmError> {
            let content = self
                .replies
                .lock()
                .expect("replies lock")
                .pop()
                .ok_or_else(|| LlmError::RequestFailed("no scripted reply left".to_string()))?;
            Ok(GenerationResponse {
                id: "scripted".to_string(),
                model: request.model,
                choices: vec![Choice {
                    index: 0,
                    message: Message::assistant(content),
                    finish_reason: "stop".to_string(),
                }],
                usage: Usage::default(),
            })
        }
    }

    fn sample_results_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(
            br#"[
                {"task_id": 0, "reward": 1.0, "traj": []},
                {"task_id": 1, "reward": 0.0,
                 "info": {"task": {"instruction": "cancel the reservation only"},
                          "reward_info": {"actions": [{"name": "cancel_reservation"}]}},
                 "traj": [{"role": "user", "content": "please cancel"}]},
                {"task_id": 2, "reward": 0.5, "traj": []}
            ]"#,
        )
        .expect("write");
        file
    }

    #[tokio::test]
    async fn test_classifies_only_failing_trials() {
        let judge = ScriptedJudge::new(vec![
            r#"{"category": "overgeneralized_action_pattern", "rationale": "rebooked unasked"}"#,
            r#"{"category": "partial_plan_execution", "rationale": "stopped early"}"#,
        ]);
        let classifier = ErrorClassifier::new(Box::new(judge), "grok-4-fast-non-reasoning");

        let input = sample_results_file();
        let output = tempfile::NamedTempFile::new().expect("temp file");
        let summary = classifier
            .classify_file(input.path(), output.path())
            .await
            .expect("classification should succeed");

        assert_eq!(summary.total_trials, 3);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.classified, 2);
        assert_eq!(
            summary.by_category.get("overgeneralized_action_pattern"),
            Some(&1)
        );
        assert!(summary.approx_input_cost_usd > 0.0);

        let written = std::fs::read_to_string(output.path()).expect("read output");
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: ClassificationRecord =
            serde_json::from_str(lines[0]).expect("record should parse");
        assert_eq!(first.category, ErrorCategory::OvergeneralizedActionPattern);
        assert_eq!(first.reward, 0.0);
    }

    #[tokio::test]
    async fn test_judge_failure_degrades_to_api_error() {
        // No scripted replies: every call errors.
        let judge = ScriptedJudge::new(vec![]);
        let classifier = ErrorClassifier::new(Box::new(judge), "grok-4-fast-non-reasoning");

        let input = sample_results_file();
        let output = tempfile::NamedTempFile::new().expect("temp file");
        let summary = classifier
            .classify_file(input.path(), output.path())
            .await
            .expect("pass should not abort on judge failure");

        assert_eq!(summary.classified, 2);
        assert_eq!(summary.by_category.get("api_error"), Some(&2));

        let written = std::fs::read_to_string(output.path()).expect("read output");
        let record: ClassificationRecord =
            serde_json::from_str(written.lines().next().expect("one line"))
                .expect("record should parse");
        assert_eq!(record.category, ErrorCategory::ApiError);
        assert!(record.rationale.contains("judge call failed"));
    }

    #[test]
    fn test_parse_verdict_valid() {
        let (category, rationale) = parse_verdict(
            r#"{"category": "intent_misinterpretation", "rationale": "missed the fallback"}"#,
        );
        assert_eq!(category, ErrorCategory::IntentMisinterpretation);
        assert_eq!(rationale, "missed the fallback");
    }

    #[test]
    fn test_parse_verdict_fenced() {
        let (category, _) = parse_verdict(
            "```json\n{\"category\": \"policy_constraint_violation\", \"rationale\": \"two certificates\"}\n```",
        );
        assert_eq!(category, ErrorCategory::PolicyConstraintViolation);
    }

    #[test]
    fn test_parse_verdict_unknown_label() {
        let (category, rationale) =
            parse_verdict(r#"{"category": "made_up_bucket", "rationale": "who knows"}"#);
        assert_eq!(category, ErrorCategory::Unknown);
        assert_eq!(rationale, "who knows");
    }

    #[test]
    fn test_parse_verdict_plain_prose_keeps_reply() {
        let (category, rationale) = parse_verdict("the agent just gave up");
        assert_eq!(category, ErrorCategory::Unknown);
        assert_eq!(rationale, "the agent just gave up");
    }

    #[test]
    fn test_prompt_includes_instruction_and_truncates_trajectory() {
        let mut trial = TrialRecord {
            task_id: Some(TaskId::Int(42)),
            reward: 0.0,
            ..Default::default()
        };
        trial.info.task.instruction = Some("update both flight legs".to_string());
        trial.traj = (0..20)
            .map(|i| json!({"role": "user", "content": format!("turn {i}")}))
            .collect();

        let prompt = build_classification_prompt(&trial);
        assert!(prompt.contains("update both flight legs"));
        assert!(prompt.contains("turn 7"));
        assert!(!prompt.contains("turn 8"));
        for label in ErrorCategory::ALLOWED {
            assert!(prompt.contains(label));
        }
    }

    #[test]
    fn test_category_display_matches_serde() {
        let serialized =
            serde_json::to_string(&ErrorCategory::PartialPlanExecution).expect("serialize");
        assert_eq!(serialized, "\"partial_plan_execution\"");
        assert_eq!(
            ErrorCategory::PartialPlanExecution.to_string(),
            "partial_plan_execution"
        );
    }
}
