//! Configuration forwarded to the external benchmark runner.

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default command used to launch the external runner.
pub const DEFAULT_RUNNER_COMMAND: &str = "python run.py";

/// Strategy the evaluated agent uses to decide actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AgentStrategy {
    ToolCalling,
    React,
    Act,
    FewShot,
}

impl AgentStrategy {
    /// Flag value understood by the runner.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::ToolCalling => "tool-calling",
            Self::React => "react",
            Self::Act => "act",
            Self::FewShot => "few-shot",
        }
    }
}

impl fmt::Display for AgentStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Simulated domain environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BenchEnv {
    Airline,
    Retail,
}

impl BenchEnv {
    /// Flag value understood by the runner.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Airline => "airline",
            Self::Retail => "retail",
        }
    }
}

impl fmt::Display for BenchEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Strategy driving the simulated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UserStrategy {
    Llm,
}

impl UserStrategy {
    /// Flag value understood by the runner.
    pub fn as_flag(&self) -> &'static str {
        match self {
            Self::Llm => "llm",
        }
    }
}

impl fmt::Display for UserStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_flag())
    }
}

/// Configuration for one benchmark invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchRunConfig {
    /// Strategy of the evaluated agent.
    pub agent_strategy: AgentStrategy,
    /// Domain environment to run.
    pub env: BenchEnv,
    /// Model identifier for the evaluated agent.
    pub model: String,
    /// Provider for the evaluated agent.
    pub model_provider: String,
    /// Model identifier for the simulated user.
    pub user_model: String,
    /// Provider for the simulated user model.
    pub user_model_provider: String,
    /// Strategy driving the simulated user.
    pub user_strategy: UserStrategy,
    /// Bound on simultaneous trial executions inside the runner.
    pub max_concurrency: usize,
    /// Number of trials per task.
    pub num_trials: u32,
    /// Few-shot display data, required by the few-shot agent strategy.
    pub few_shot_displays_path: Option<PathBuf>,
    /// Command used to launch the external runner.
    pub runner_command: String,
}

impl BenchRunConfig {
    /// Creates a configuration with the documented defaults: xAI on both
    /// sides, an LLM-simulated user, one trial, no concurrency.
    pub fn new(
        agent_strategy: AgentStrategy,
        env: BenchEnv,
        model: impl Into<String>,
        user_model: impl Into<String>,
    ) -> Self {
        Self {
            agent_strategy,
            env,
            model: model.into(),
            model_provider: "xai".to_string(),
            user_model: user_model.into(),
            user_model_provider: "xai".to_string(),
            user_strategy: UserStrategy::Llm,
            max_concurrency: 1,
            num_trials: 1,
            few_shot_displays_path: None,
            runner_command: DEFAULT_RUNNER_COMMAND.to_string(),
        }
    }

    /// Sets the provider for the evaluated agent.
    pub fn with_model_provider(mut self, provider: impl Into<String>) -> Self {
        self.model_provider = provider.into();
        self
    }

    /// Sets the provider for the simulated user model.
    pub fn with_user_model_provider(mut self, provider: impl Into<String>) -> Self {
        self.user_model_provider = provider.into();
        self
    }

    /// Sets the simulated-user strategy.
    pub fn with_user_strategy(mut self, strategy: UserStrategy) -> Self {
        self.user_strategy = strategy;
        self
    }

    /// Sets the concurrency bound forwarded to the runner.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Sets the number of trials per task.
    pub fn with_num_trials(mut self, num_trials: u32) -> Self {
        self.num_trials = num_trials;
        self
    }

    /// Sets the few-shot display data path.
    pub fn with_few_shot_displays(mut self, path: impl Into<PathBuf>) -> Self {
        self.few_shot_displays_path = Some(path.into());
        self
    }

    /// Sets the command used to launch the runner.
    pub fn with_runner_command(mut self, command: impl Into<String>) -> Self {
        self.runner_command = command.into();
        self
    }

    /// Full argument list forwarded to the runner, flag names matching its
    /// own CLI surface.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--agent-strategy".to_string(),
            self.agent_strategy.as_flag().to_string(),
            "--env".to_string(),
            self.env.as_flag().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--model-provider".to_string(),
            self.model_provider.clone(),
            "--user-model".to_string(),
            self.user_model.clone(),
            "--user-model-provider".to_string(),
            self.user_model_provider.clone(),
            "--user-strategy".to_string(),
            self.user_strategy.as_flag().to_string(),
            "--max-concurrency".to_string(),
            self.max_concurrency.to_string(),
            "--num-trials".to_string(),
            self.num_trials.to_string(),
        ];
        if let Some(path) = &self.few_shot_displays_path {
            args.push("--few-shot-displays-path".to_string());
            args.push(path.display().to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BenchRunConfig::new(
            AgentStrategy::ToolCalling,
            BenchEnv::Airline,
            "grok-4-1-fast-reasoning",
            "grok-4-fast-non-reasoning",
        );
        assert_eq!(config.model_provider, "xai");
        assert_eq!(config.user_model_provider, "xai");
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.num_trials, 1);
        assert_eq!(config.runner_command, DEFAULT_RUNNER_COMMAND);
        assert!(config.few_shot_displays_path.is_none());
    }

    #[test]
    fn test_to_args_matches_runner_surface() {
        let config = BenchRunConfig::new(
            AgentStrategy::ToolCalling,
            BenchEnv::Retail,
            "grok-4-1-fast-reasoning",
            "grok-4-fast-non-reasoning",
        )
        .with_max_concurrency(10)
        .with_num_trials(3);

        let args = config.to_args();
        assert_eq!(
            args,
            vec![
                "--agent-strategy",
                "tool-calling",
                "--env",
                "retail",
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
            ]
        );
    }

    #[test]
    fn test_to_args_appends_few_shot_path() {
        let config = BenchRunConfig::new(
            AgentStrategy::FewShot,
            BenchEnv::Airline,
            "grok-4-1-fast-reasoning",
            "grok-4-fast-non-reasoning",
        )
        .with_few_shot_displays("displays/airline.jsonl");

        let args = config.to_args();
        assert_eq!(args[1], "few-shot");
        let tail: Vec<&str> = args.iter().rev().take(2).map(String::as_str).collect();
        assert_eq!(tail, vec!["displays/airline.jsonl", "--few-shot-displays-path"]);
    }

    #[test]
    fn test_strategy_flags() {
        assert_eq!(AgentStrategy::ToolCalling.to_string(), "tool-calling");
        assert_eq!(AgentStrategy::React.to_string(), "react");
        assert_eq!(AgentStrategy::Act.to_string(), "act");
        assert_eq!(AgentStrategy::FewShot.to_string(), "few-shot");
        assert_eq!(BenchEnv::Retail.to_string(), "retail");
        assert_eq!(UserStrategy::Llm.to_string(), "llm");
    }
}
