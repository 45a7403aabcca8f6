//! CLI command definitions for tau-harness.
//!
//! Three subcommands: `run` forwards a benchmark configuration to the
//! external tau-bench runner, `classify` buckets failing trials into
//! failure-mode categories, and `judge` scores each trajectory with the
//! judge model.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use crate::bench::{
    AgentStrategy, BenchEnv, BenchRunConfig, BenchRunner, UserStrategy, DEFAULT_RUNNER_COMMAND,
};
use crate::classify::ErrorClassifier;
use crate::error::LlmError;
use crate::judge::TrajectoryJudge;
use crate::llm::{XaiClient, DEFAULT_JUDGE_MODEL};

/// Default output file for error classifications.
const DEFAULT_CLASSIFY_OUTPUT: &str = "error_classification.jsonl";

/// Default output directory for per-episode verdicts.
const DEFAULT_JUDGE_OUTPUT_DIR: &str = "judged";

/// Benchmark harness for evaluating Grok models on tau-bench.
#[derive(Parser)]
#[command(name = "tau-harness")]
#[command(about = "Run tau-bench with Grok models and post-process the results")]
#[command(version)]
#[command(
    long_about = "tau-harness launches the external tau-bench runner against Grok models via the xAI API,\nthen post-processes the resulting JSON logs.\n\nExample usage:\n  tau-harness run --agent-strategy tool-calling --env airline \\\n      --model grok-4-1-fast-reasoning --user-model grok-4-fast-non-reasoning \\\n      --max-concurrency 10 --num-trials 3\n  tau-harness classify results/airline.json -o error_classification.jsonl\n  tau-harness judge --input-file results/airline.json --output-dir judged"
)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info", global = true)]
    pub log_level: String,
}

/// Available CLI subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Launch the external benchmark runner with the given configuration.
    Run(RunArgs),

    /// Classify failing trials from a results file into failure-mode categories.
    #[command(alias = "classify-errors")]
    Classify(ClassifyArgs),

    /// Score each trajectory in a results file with the judge model.
    #[command(alias = "evaluate-trajectory")]
    Judge(JudgeArgs),
}

/// Arguments for `tau-harness run`.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Strategy the evaluated agent uses to decide actions.
    #[arg(long, value_enum)]
    pub agent_strategy: AgentStrategy,

    /// Benchmark environment to run.
    #[arg(long, value_enum)]
    pub env: BenchEnv,

    /// Model identifier for the evaluated agent.
    #[arg(short = 'm', long)]
    pub model: String,

    /// Provider for the evaluated agent.
    #[arg(long, default_value = "xai")]
    pub model_provider: String,

    /// Model identifier for the simulated user.
    #[arg(long)]
    pub user_model: String,

    /// Provider for the simulated user model.
    #[arg(long, default_value = "xai")]
    pub user_model_provider: String,

    /// Strategy driving the simulated user.
    #[arg(long, value_enum, default_value = "llm")]
    pub user_strategy: UserStrategy,

    /// Maximum number of simultaneous trial executions inside the runner.
    #[arg(long, default_value = "1")]
    pub max_concurrency: usize,

    /// Number of trials per task.
    #[arg(long, default_value = "1")]
    pub num_trials: u32,

    /// Few-shot display data, required by the few-shot agent strategy.
    #[arg(long)]
    pub few_shot_displays_path: Option<PathBuf>,

    /// Command used to launch the external benchmark runner.
    #[arg(long, default_value = DEFAULT_RUNNER_COMMAND)]
    pub runner_cmd: String,
}

/// Arguments for `tau-harness classify`.
#[derive(Parser, Debug)]
pub struct ClassifyArgs {
    /// Path to the tau-bench results file (JSON array or JSON-lines).
    pub input_file: PathBuf,

    /// Output JSONL file for classifications.
    #[arg(short = 'o', long, default_value = DEFAULT_CLASSIFY_OUTPUT)]
    pub output: PathBuf,

    /// Judge model used for classification.
    #[arg(short = 'm', long, default_value = DEFAULT_JUDGE_MODEL)]
    pub model: String,

    /// Seconds to pause between judge calls (for rate limiting).
    #[arg(long, default_value = "0.0")]
    pub sleep: f64,

    /// xAI API key (can also be set via XAI_API_KEY env var).
    #[arg(long, env = "XAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Arguments for `tau-harness judge`.
#[derive(Parser, Debug)]
pub struct JudgeArgs {
    /// Path to the tau-bench results file (JSON array or JSON-lines).
    #[arg(long)]
    pub input_file: PathBuf,

    /// Directory to write per-episode judge outputs.
    #[arg(long, default_value = DEFAULT_JUDGE_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Judge model used for scoring.
    #[arg(short = 'm', long, default_value = DEFAULT_JUDGE_MODEL)]
    pub model: String,

    /// xAI API key (can also be set via XAI_API_KEY env var).
    #[arg(long, env = "XAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Parse CLI arguments and return the Cli struct.
///
/// This allows main.rs to access CLI arguments (like log_level) before
/// running commands.
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// Run the CLI by parsing arguments and executing the command.
pub async fn run() -> anyhow::Result<()> {
    run_with_cli(parse_cli()).await
}

/// Run the CLI with the parsed arguments.
///
/// This is the main entry point for the tau-harness CLI.
pub async fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Run(args) => run_bench_command(args).await,
        Commands::Classify(args) => run_classify_command(args).await,
        Commands::Judge(args) => run_judge_command(args).await,
    }
}

async fn run_bench_command(args: RunArgs) -> anyhow::Result<()> {
    let mut config = BenchRunConfig::new(args.agent_strategy, args.env, args.model, args.user_model)
        .with_model_provider(args.model_provider)
        .with_user_model_provider(args.user_model_provider)
        .with_user_strategy(args.user_strategy)
        .with_max_concurrency(args.max_concurrency)
        .with_num_trials(args.num_trials)
        .with_runner_command(args.runner_cmd);
    if let Some(path) = args.few_shot_displays_path {
        config = config.with_few_shot_displays(path);
    }

    let outcome = BenchRunner::new(config)
        .run()
        .await
        .context("benchmark run failed")?;

    info!(
        run_id = %outcome.run_id,
        exit_code = outcome.exit_code,
        duration_secs = outcome.duration_secs,
        "benchmark run complete"
    );
    Ok(())
}

async fn run_classify_command(args: ClassifyArgs) -> anyhow::Result<()> {
    let client = build_judge_client(args.api_key)?;
    let classifier = ErrorClassifier::new(Box::new(client), args.model)
        .with_sleep(Duration::from_secs_f64(args.sleep));

    let summary = classifier
        .classify_file(&args.input_file, &args.output)
        .await
        .with_context(|| {
            format!(
                "classification failed for {}",
                args.input_file.display()
            )
        })?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_judge_command(args: JudgeArgs) -> anyhow::Result<()> {
    let client = build_judge_client(args.api_key)?;
    let judge = TrajectoryJudge::new(Box::new(client), args.model);

    let summary = judge
        .judge_file(&args.input_file, &args.output_dir)
        .await
        .with_context(|| format!("judging failed for {}", args.input_file.display()))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Build the judge client from an explicit key or the environment.
fn build_judge_client(api_key: Option<String>) -> Result<XaiClient, LlmError> {
    match api_key {
        Some(key) => Ok(XaiClient::new(key)),
        None => XaiClient::from_env(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_args_parse_documented_surface() {
        let cli = Cli::try_parse_from([
            "tau-harness",
            "run",
            "--agent-strategy",
            "tool-calling",
            "--env",
            "airline",
            "--model",
            "grok-4-1-fast-reasoning",
            "--model-provider",
            "xai",
            "--user-model",
            "grok-4-fast-non-reasoning",
            "--user-model-provider",
            "xai",
            "--user-strategy",
            "llm",
            "--max-concurrency",
            "10",
            "--num-trials",
            "3",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.agent_strategy, AgentStrategy::ToolCalling);
                assert_eq!(args.env, BenchEnv::Airline);
                assert_eq!(args.max_concurrency, 10);
                assert_eq!(args.num_trials, 3);
                assert_eq!(args.runner_cmd, DEFAULT_RUNNER_COMMAND);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_classify_args_defaults() {
        let cli = Cli::try_parse_from(["tau-harness", "classify", "results/airline.json"])
            .expect("should parse");

        match cli.command {
            Commands::Classify(args) => {
                assert_eq!(args.input_file, PathBuf::from("results/airline.json"));
                assert_eq!(args.output, PathBuf::from(DEFAULT_CLASSIFY_OUTPUT));
                assert_eq!(args.model, DEFAULT_JUDGE_MODEL);
                assert_eq!(args.sleep, 0.0);
            }
            _ => panic!("expected classify command"),
        }
    }

    #[test]
    fn test_judge_alias_and_defaults() {
        let cli = Cli::try_parse_from([
            "tau-harness",
            "evaluate-trajectory",
            "--input-file",
            "results/airline.json",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Judge(args) => {
                assert_eq!(args.output_dir, PathBuf::from(DEFAULT_JUDGE_OUTPUT_DIR));
                assert_eq!(args.model, DEFAULT_JUDGE_MODEL);
            }
            _ => panic!("expected judge command"),
        }
    }

    #[test]
    fn test_few_shot_strategy_accepts_displays_path() {
        let cli = Cli::try_parse_from([
            "tau-harness",
            "run",
            "--agent-strategy",
            "few-shot",
            "--env",
            "retail",
            "--model",
            "grok-4-1-fast-reasoning",
            "--user-model",
            "grok-4-fast-non-reasoning",
            "--few-shot-displays-path",
            "displays/retail.jsonl",
        ])
        .expect("should parse");

        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.agent_strategy, AgentStrategy::FewShot);
                assert_eq!(
                    args.few_shot_displays_path,
                    Some(PathBuf::from("displays/retail.jsonl"))
                );
            }
            _ => panic!("expected run command"),
        }
    }
}
