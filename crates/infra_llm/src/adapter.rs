//! OpenAI-compatible chat completion adapter

use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};
use domain_adjudication::{CompletionRequest, LanguageModelPort};

/// Configuration for the chat completion adapter
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Model name requested for every completion
    pub model: String,

    /// Per-call timeout in seconds
    pub timeout_secs: u64,

    /// Retry attempts for transient failures (0 disables retry)
    pub max_retries: u32,

    /// Base delay for exponential backoff in milliseconds
    pub retry_delay_ms: u64,

    /// Sampling temperature; 0 keeps verdicts as stable as the model allows
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4.1-mini".to_string(),
            timeout_secs: 30,
            max_retries: 2,
            retry_delay_ms: 500,
            temperature: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Chat completion adapter implementing the language model port
///
/// One instance is shared across the whole batch; reqwest pools
/// connections internally.
#[derive(Debug)]
pub struct OpenAiChatAdapter {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiChatAdapter {
    /// Creates the adapter and its HTTP client
    pub fn new(config: LlmConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(err)),
            })?;
        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    async fn try_complete(&self, request: &CompletionRequest) -> Result<String, PortError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| self.map_transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers());
            return Err(map_status(status, retry_after));
        }

        let parsed: ChatResponse =
            response
                .json()
                .await
                .map_err(|err| PortError::Transformation {
                    message: format!("malformed completion response: {err}"),
                })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| PortError::transformation("completion response carried no content"))
    }

    fn map_transport_error(&self, err: reqwest::Error) -> PortError {
        if err.is_timeout() {
            PortError::timeout("chat completion", self.config.timeout_secs * 1000)
        } else {
            PortError::Connection {
                message: format!("chat completion request failed: {err}"),
                source: Some(Box::new(err)),
            }
        }
    }
}

/// Maps an HTTP error status onto the shared port error surface
fn map_status(status: StatusCode, retry_after_secs: u64) -> PortError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            PortError::unauthorized(format!("model endpoint rejected credentials ({status})"))
        }
        StatusCode::NOT_FOUND => PortError::not_found("model endpoint", status),
        StatusCode::TOO_MANY_REQUESTS => PortError::RateLimited {
            retry_after_secs,
        },
        status if status.is_server_error() => PortError::ServiceUnavailable {
            service: format!("model endpoint ({status})"),
        },
        status => PortError::internal(format!("unexpected model endpoint status {status}")),
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> u64 {
    headers
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}

impl DomainPort for OpenAiChatAdapter {}

#[async_trait]
impl LanguageModelPort for OpenAiChatAdapter {
    async fn complete(&self, request: CompletionRequest) -> Result<String, PortError> {
        // Fail closed before the wire: a missing key routes the claim to
        // manual review instead of burning the retry budget on 401s.
        if self.config.api_key.is_empty() {
            return Err(PortError::configuration("LLM API key is not set"));
        }

        let mut attempt = 0u32;
        loop {
            let started = Instant::now();
            match self.try_complete(&request).await {
                Ok(content) => {
                    debug!(
                        model = %self.config.model,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        attempt,
                        "Chat completion succeeded"
                    );
                    return Ok(content);
                }
                Err(err) if err.is_transient() && attempt < self.config.max_retries => {
                    let delay =
                        Duration::from_millis(self.config.retry_delay_ms << attempt);
                    warn!(
                        error = %err,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient completion failure; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl HealthCheckable for OpenAiChatAdapter {
    /// Reports configuration health without spending a model call
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let (status, message) = if self.config.api_key.is_empty() {
            (
                AdapterHealth::Unhealthy,
                Some("LLM API key is not set".to_string()),
            )
        } else {
            (
                AdapterHealth::Healthy,
                Some(format!("configured for model {}", self.config.model)),
            )
        };

        HealthCheckResult {
            adapter_id: "openai-chat-adapter".to_string(),
            status,
            latency_ms: started.elapsed().as_millis() as u64,
            message,
            checked_at: Utc::now(),
        }
    }
}
