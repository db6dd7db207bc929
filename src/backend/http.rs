//! OpenAI-compatible `/chat/completions` client.

use super::{BackendReply, ChatBackend, ChatRequest};
use crate::config::ChatConfig;
use crate::error::PdfChatError;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

/// Backend that POSTs a [`ChatRequest`] to `{base_url}/chat/completions`
/// with a bearer credential.
///
/// The client has no request timeout: a stalled endpoint blocks the
/// interaction until it answers or the connection drops.
pub struct OpenAiCompatibleBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    name: String,
}

impl OpenAiCompatibleBackend {
    /// Create a backend for `base_url` (e.g. `https://api.groq.com/openai/v1`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, PdfChatError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| {
            PdfChatError::InvalidConfig(format!("invalid API base URL '{base_url}': {e}"))
        })?;
        let name = parsed.host_str().unwrap_or("openai-compatible").to_string();

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PdfChatError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.into(),
            name,
        })
    }

    /// Create a backend from the config's base URL and credential.
    pub fn from_config(config: &ChatConfig) -> Result<Self, PdfChatError> {
        let key = config.resolve_api_key()?;
        Self::new(&config.api_base_url, key)
    }

    /// The full URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Pull `error.message` out of an OpenAI-style error body, else return the raw body.
fn error_detail(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[async_trait]
impl ChatBackend for OpenAiCompatibleBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<BackendReply, PdfChatError> {
        debug!(
            "POST {} (model={}, {} messages)",
            self.endpoint,
            request.model,
            request.messages.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| PdfChatError::LlmApiError {
                message: format!("request to {} failed: {}", self.name, e),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = error_detail(&body);
            warn!("{} answered HTTP {}: {}", self.name, status, detail);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PdfChatError::AuthError {
                    provider: self.name.clone(),
                    detail,
                },
                _ => PdfChatError::LlmApiError {
                    message: format!("HTTP {status}: {detail}"),
                },
            });
        }

        let parsed: CompletionResponse =
            response.json().await.map_err(|e| PdfChatError::LlmApiError {
                message: format!("malformed response from {}: {}", self.name, e),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| PdfChatError::EmptyResponse {
                model: request.model.clone(),
            })?;

        Ok(BackendReply {
            content,
            input_tokens: parsed.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens: parsed.usage.as_ref().map(|u| u.completion_tokens),
        })
    }
}
