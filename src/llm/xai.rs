//! xAI chat-completions client.
//!
//! xAI exposes an OpenAI-compatible API; only the base URL and the credential
//! differ from other providers. Transient failures (timeouts, 429s, 5xx) are
//! retried with exponential backoff.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Default xAI API endpoint.
pub const XAI_BASE_URL: &str = "https://api.x.ai/v1";

/// Environment variable holding the xAI credential.
pub const API_KEY_ENV_VAR: &str = "XAI_API_KEY";

/// Default judge model for post-processing passes.
pub const DEFAULT_JUDGE_MODEL: &str = "grok-4-fast-non-reasoning";

/// Maximum number of retry attempts for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay for exponential backoff in milliseconds.
const BASE_RETRY_DELAY_MS: u64 = 1000;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// A message in a conversation with the judge model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (e.g., "system", "user", "assistant").
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Response format hint for the API ("text" or "json_object").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    /// Force the model to reply with a JSON object.
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }

    /// Plain text reply (the API default).
    pub fn text() -> Self {
        Self {
            format_type: "text".to_string(),
        }
    }
}

/// Request for text generation from the judge model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model identifier to use for generation.
    pub model: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Sampling temperature. Judges run cold for consistency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Response format hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl GenerationRequest {
    /// Create a new generation request with default parameters.
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
            response_format: None,
        }
    }

    /// Set the temperature for this request.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens for this request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Ask the model to reply with a JSON object.
    pub fn with_json_output(mut self) -> Self {
        self.response_format = Some(ResponseFormat::json_object());
        self
    }
}

/// Response from a judge-model generation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    /// Unique identifier for this response.
    pub id: String,
    /// Model that generated this response.
    pub model: String,
    /// Generated choices/completions.
    pub choices: Vec<Choice>,
    /// Token usage statistics.
    pub usage: Usage,
}

impl GenerationResponse {
    /// Get the content of the first choice, if available.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first().map(|c| c.message.content.as_str())
    }
}

/// A single generated choice from the judge model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Choice {
    /// Index of this choice in the response.
    pub index: u32,
    /// Generated message.
    pub message: Message,
    /// Reason the generation stopped (e.g., "stop", "length").
    pub finish_reason: String,
}

/// Token usage statistics for a generation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt.
    pub prompt_tokens: u32,
    /// Number of tokens generated.
    pub completion_tokens: u32,
    /// Total tokens used.
    pub total_tokens: u32,
}

/// Trait for judge-model providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a response for the given request.
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError>;
}

/// Client for the xAI chat-completions API.
pub struct XaiClient {
    /// HTTP client for making API requests.
    http_client: Client,
    /// API key for authentication.
    api_key: String,
    /// Base URL for the API.
    base_url: String,
    /// Default model to use when a request leaves it empty.
    default_model: String,
}

impl XaiClient {
    /// Create a new client with the given API key and the default judge model.
    pub fn new(api_key: String) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client - system TLS configuration error"),
            api_key,
            base_url: XAI_BASE_URL.to_string(),
            default_model: DEFAULT_JUDGE_MODEL.to_string(),
        }
    }

    /// Create a new client with a specific default model.
    pub fn with_model(api_key: String, model: String) -> Self {
        let mut client = Self::new(api_key);
        client.default_model = model;
        client
    }

    /// Create a new client with a custom base URL.
    ///
    /// Useful for tests or OpenAI-compatible proxies in front of xAI.
    pub fn with_custom_url(api_key: String, base_url: String, model: String) -> Self {
        let mut client = Self::with_model(api_key, model);
        client.base_url = base_url;
        client
    }

    /// Create a new client from the `XAI_API_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] if the variable is not set.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = env::var(API_KEY_ENV_VAR).map_err(|_| LlmError::MissingApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the default model.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Get the API key with the middle masked, for debug logging.
    pub fn api_key_masked(&self) -> String {
        if self.api_key.len() <= 8 {
            "*".repeat(self.api_key.len())
        } else {
            format!(
                "{}...{}",
                &self.api_key[..4],
                &self.api_key[self.api_key.len() - 4..]
            )
        }
    }

    /// Execute a request with exponential backoff retry logic.
    async fn execute_with_retry(
        &self,
        request: &ApiRequest,
    ) -> Result<GenerationResponse, LlmError> {
        let mut last_error = None;
        let url = format!("{}/chat/completions", self.base_url);

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s
                let delay_ms = BASE_RETRY_DELAY_MS * (1 << (attempt - 1));
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = delay_ms,
                    "Retrying xAI request after transient failure"
                );
            }

            match self.execute_request(&url, request).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if is_transient_error(&err) {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_retries = MAX_RETRIES,
                            error = %err,
                            "Transient error, will retry"
                        );
                        last_error = Some(err);
                    } else {
                        return Err(err);
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LlmError::RequestFailed("Max retries exceeded with no error captured".to_string())
        }))
    }

    /// Execute a single request (no retry logic).
    async fn execute_request(
        &self,
        url: &str,
        request: &ApiRequest,
    ) -> Result<GenerationResponse, LlmError> {
        let http_response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        let status = http_response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            // Try to parse structured error response
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                if status_code == 429 {
                    return Err(LlmError::RateLimited(error_response.error.message));
                }
                return Err(LlmError::ApiError {
                    code: status_code,
                    message: error_response.error.message,
                });
            }

            return Err(LlmError::ApiError {
                code: status_code,
                message: error_text,
            });
        }

        let api_response: ApiResponse = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))?;

        let choices = api_response
            .choices
            .into_iter()
            .map(|choice| Choice {
                index: choice.index,
                message: Message {
                    role: choice.message.role,
                    content: choice.message.content,
                },
                finish_reason: choice.finish_reason.unwrap_or_else(|| "stop".to_string()),
            })
            .collect();

        Ok(GenerationResponse {
            id: api_response.id,
            model: api_response.model,
            choices,
            usage: api_response
                .usage
                .map(|u| Usage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                    total_tokens: u.total_tokens,
                })
                .unwrap_or_default(),
        })
    }
}

/// Check if an error is transient and should be retried.
fn is_transient_error(error: &LlmError) -> bool {
    match error {
        LlmError::RequestFailed(msg) => {
            // Network errors, timeouts, connection issues
            msg.contains("timeout")
                || msg.contains("connection")
                || msg.contains("temporarily")
                || msg.contains("Connection refused")
        }
        LlmError::RateLimited(_) => true,
        LlmError::ApiError { code, .. } => *code >= 500 || *code == 429,
        _ => false,
    }
}

#[async_trait]
impl LlmProvider for XaiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse, LlmError> {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        let api_request = ApiRequest {
            model,
            messages: request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.response_format,
        };

        self.execute_with_retry(&api_request).await
    }
}

/// Internal request structure for the OpenAI-compatible API.
#[derive(Debug, Clone, Serialize)]
struct ApiRequest {
    model: String,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Internal response structure from the OpenAI-compatible API.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    id: String,
    model: String,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

/// Internal choice structure from the API response.
#[derive(Debug, Deserialize)]
struct ApiChoice {
    index: u32,
    message: ApiMessage,
    finish_reason: Option<String>,
}

/// Internal message structure from the API response.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    role: String,
    content: String,
}

/// Internal usage structure from the API response.
#[derive(Debug, Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// Error response from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Deserialize)]
#[allow(dead_code)] // Fields kept for complete API error deserialization
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    code: Option<String>,
}
