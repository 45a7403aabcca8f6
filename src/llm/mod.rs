//! Judge-model integration for tau-harness.
//!
//! The post-processing commands audit benchmark trajectories with a Grok
//! judge model reached through the xAI chat-completions API. The client
//! lives behind the [`LlmProvider`] trait so both passes can be driven by a
//! scripted provider in tests.
//!
//! ```ignore
//! use tau_harness::llm::{GenerationRequest, LlmProvider, Message, XaiClient};
//!
//! let client = XaiClient::from_env()?;
//! let request = GenerationRequest::new(
//!     "grok-4-fast-non-reasoning",
//!     vec![
//!         Message::system("You are a strict evaluation assistant."),
//!         Message::user("Audit this trajectory..."),
//!     ],
//! )
//! .with_temperature(0.1)
//! .with_json_output();
//! let response = client.generate(request).await?;
//! ```

pub mod pricing;
pub mod xai;

pub use xai::{
    Choice, GenerationRequest, GenerationResponse, LlmProvider, Message, ResponseFormat, Usage,
    XaiClient, DEFAULT_JUDGE_MODEL,
};
