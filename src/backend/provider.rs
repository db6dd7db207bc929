//! Adapter from an edgequake-llm [`LLMProvider`] to [`ChatBackend`].

use super::{BackendReply, ChatBackend, ChatRequest};
use crate::error::PdfChatError;
use crate::session::Role;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use tracing::debug;

/// Answers through any edgequake-llm provider.
///
/// The provider was created for a specific model, so `ChatRequest::model`
/// is informational here; temperature and max_tokens are forwarded.
pub struct ProviderBackend {
    name: String,
    provider: Arc<dyn LLMProvider>,
}

impl ProviderBackend {
    pub fn new(name: impl Into<String>, provider: Arc<dyn LLMProvider>) -> Self {
        Self {
            name: name.into(),
            provider,
        }
    }
}

/// Translate the request's role-tagged messages into edgequake-llm messages.
fn to_provider_messages(request: &ChatRequest) -> Vec<ChatMessage> {
    request
        .messages
        .iter()
        .map(|m| match m.role {
            Role::System => ChatMessage::system(m.content.as_str()),
            Role::User => ChatMessage::user(m.content.as_str()),
            Role::Assistant => ChatMessage::assistant(m.content.as_str()),
        })
        .collect()
}

fn build_options(request: &ChatRequest) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(request.temperature),
        max_tokens: request.max_tokens,
        ..Default::default()
    }
}

#[async_trait]
impl ChatBackend for ProviderBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, request: &ChatRequest) -> Result<BackendReply, PdfChatError> {
        let messages = to_provider_messages(request);
        let options = build_options(request);

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| PdfChatError::LlmApiError {
                message: format!("{} provider failed: {}", self.name, e),
            })?;

        debug!(
            "{}: {} input tokens, {} output tokens",
            self.name, response.prompt_tokens, response.completion_tokens
        );

        Ok(BackendReply {
            content: response.content,
            input_tokens: Some(response.prompt_tokens as u64),
            output_tokens: Some(response.completion_tokens as u64),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_options_forwards_sampling_parameters() {
        let request = ChatRequest {
            model: "gpt-4.1-nano".into(),
            temperature: 0.1,
            max_tokens: Some(512),
            messages: vec![],
        };
        let opts = build_options(&request);
        assert_eq!(opts.temperature, Some(0.1));
        assert_eq!(opts.max_tokens, Some(512));
    }
}
