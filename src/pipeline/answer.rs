//! Answer generation: one chat-completion call per question.
//!
//! The request always has the same two-message shape:
//!
//! 1. **System message** — the full document text, verbatim, followed by the
//!    answering instructions from [`crate::prompts`]
//! 2. **User message** — the question
//!
//! Earlier transcript turns are never sent: every question is answered from
//! the document alone. The call is made exactly once; failures propagate.

use crate::backend::{ChatBackend, ChatRequest, RequestMessage};
use crate::config::ChatConfig;
use crate::error::PdfChatError;
use crate::prompts::document_system_prompt;
use crate::session::Role;
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// A reply from the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub content: String,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub duration_ms: u64,
}

/// Build the two-message request for `question` against `document_text`.
pub fn build_request(document_text: &str, question: &str, config: &ChatConfig) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        temperature: config.temperature,
        max_tokens: config.max_tokens,
        messages: vec![
            RequestMessage {
                role: Role::System,
                content: document_system_prompt(document_text, config.system_prompt.as_deref()),
            },
            RequestMessage {
                role: Role::User,
                content: question.to_string(),
            },
        ],
    }
}

/// Ask `backend` one question about `document_text`.
pub async fn generate_answer(
    backend: &dyn ChatBackend,
    document_text: &str,
    question: &str,
    config: &ChatConfig,
) -> Result<Answer, PdfChatError> {
    let start = Instant::now();
    let request = build_request(document_text, question, config);

    let reply = backend.complete(&request).await?;
    let duration_ms = start.elapsed().as_millis() as u64;

    debug!(
        "{}: answered in {}ms ({:?} input tokens, {:?} output tokens)",
        backend.name(),
        duration_ms,
        reply.input_tokens,
        reply.output_tokens
    );

    Ok(Answer {
        content: reply.content,
        input_tokens: reply.input_tokens,
        output_tokens: reply.output_tokens,
        duration_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendReply;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Recording {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait]
    impl ChatBackend for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(&self, request: &ChatRequest) -> Result<BackendReply, PdfChatError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(BackendReply {
                content: "Page 1 says Alpha.".into(),
                input_tokens: Some(120),
                output_tokens: Some(5),
            })
        }
    }

    #[test]
    fn request_has_exactly_system_then_user() {
        let config = ChatConfig::default();
        let req = build_request("Alpha.Beta.", "What is on page 1?", &config);

        let roles: Vec<Role> = req.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User]);
        assert!(req.system_content().unwrap().contains("Alpha.Beta."));
        assert_eq!(req.user_content(), Some("What is on page 1?"));
        assert_eq!(req.model, "llama-3.3-70b-versatile");
        assert_eq!(req.temperature, 0.1);
    }

    #[test]
    fn custom_instructions_are_used() {
        let config = ChatConfig::builder()
            .system_prompt("Reply with one word.")
            .build()
            .unwrap();
        let req = build_request("Doc", "q", &config);
        assert!(req.system_content().unwrap().ends_with("Reply with one word."));
    }

    #[tokio::test]
    async fn generate_answer_returns_reply_and_usage() {
        let backend = Recording {
            seen: Mutex::new(Vec::new()),
        };
        let config = ChatConfig::default();

        let answer = generate_answer(&backend, "Alpha.Beta.", "What is on page 1?", &config)
            .await
            .unwrap();

        assert_eq!(answer.content, "Page 1 says Alpha.");
        assert_eq!(answer.input_tokens, Some(120));
        assert_eq!(backend.seen.lock().unwrap().len(), 1);
    }
}
