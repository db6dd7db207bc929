//! Chat-completion backends.
//!
//! The Answer Generator talks to a [`ChatBackend`], never to an HTTP client
//! directly. Two implementations ship with the crate:
//!
//! * [`OpenAiCompatibleBackend`] — a single `POST /chat/completions` against
//!   any OpenAI-compatible endpoint (Groq by default), bearer credential from
//!   the environment. This is the default.
//! * [`ProviderBackend`] — wraps an edgequake-llm [`LLMProvider`] so any of
//!   its providers (OpenAI, Anthropic, Gemini, Ollama, …) can answer.
//!
//! Tests and embedders can supply their own implementation through
//! [`crate::config::ChatConfigBuilder::backend`].

mod http;
mod provider;

pub use http::OpenAiCompatibleBackend;
pub use provider::ProviderBackend;

use crate::config::ChatConfig;
use crate::error::PdfChatError;
use crate::session::Role;
use async_trait::async_trait;
use edgequake_llm::{LLMProvider, ProviderFactory};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// One role-tagged message of a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestMessage {
    pub role: Role,
    pub content: String,
}

/// A complete chat-completion request.
///
/// Serialises directly to the OpenAI wire body:
/// `{"model": …, "temperature": …, "messages": [system, user]}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    pub messages: Vec<RequestMessage>,
}

impl ChatRequest {
    /// Content of the first system message, if any.
    pub fn system_content(&self) -> Option<&str> {
        self.content_of(Role::System)
    }

    /// Content of the first user message, if any.
    pub fn user_content(&self) -> Option<&str> {
        self.content_of(Role::User)
    }

    fn content_of(&self, role: Role) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == role)
            .map(|m| m.content.as_str())
    }
}

/// The single top-choice reply of a chat-completion call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BackendReply {
    pub content: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
}

/// Sends one chat-completion request and returns the reply text.
///
/// Implementations must not retry; a failure is returned as-is.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Short label used in logs and error messages (e.g. "api.groq.com").
    fn name(&self) -> &str;

    /// Send `request` and return the top choice's message content.
    async fn complete(&self, request: &ChatRequest) -> Result<BackendReply, PdfChatError>;
}

/// Resolve the backend, from most-specific to least-specific.
///
/// 1. **Pre-built backend** (`config.backend`) — used as-is.
/// 2. **Pre-built provider** (`config.provider`) — wrapped in [`ProviderBackend`].
/// 3. **Named provider** (`config.provider_name`) — created through
///    [`ProviderFactory::create_llm_provider`] with `config.model`; the factory
///    reads that provider's own API key variable.
/// 4. **OpenAI-compatible endpoint** — `config.api_base_url` with the key from
///    `config.api_key_env`. A missing key is [`PdfChatError::MissingCredential`].
///
/// Callers resolve once at startup so a missing credential is reported
/// before any question is asked.
pub fn resolve_backend(config: &ChatConfig) -> Result<Arc<dyn ChatBackend>, PdfChatError> {
    if let Some(ref backend) = config.backend {
        return Ok(Arc::clone(backend));
    }

    if let Some(ref provider) = config.provider {
        let label = config.provider_name.as_deref().unwrap_or("custom");
        return Ok(Arc::new(ProviderBackend::new(label, Arc::clone(provider))));
    }

    if let Some(ref name) = config.provider_name {
        debug!("Creating edgequake-llm provider '{}' with model '{}'", name, config.model);
        let provider: Arc<dyn LLMProvider> =
            ProviderFactory::create_llm_provider(name, &config.model).map_err(|e| {
                PdfChatError::ProviderNotConfigured {
                    provider: name.clone(),
                    hint: format!("{e}"),
                }
            })?;
        return Ok(Arc::new(ProviderBackend::new(name.clone(), provider)));
    }

    let backend = OpenAiCompatibleBackend::from_config(config)?;
    Ok(Arc::new(backend))
}
