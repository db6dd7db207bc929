//! # edgequake-pdfchat
//!
//! Upload a PDF and ask questions about it. The extracted text of the whole
//! document is sent as context to a chat-completion model on every question.
//!
//! ## Flow
//!
//! ```text
//! upload ──▶ input ──▶ extract ──▶ Session (document text)
//!                                        │
//! question ──────────────────────────────┴─▶ answer ──▶ Session (transcript)
//! ```
//!
//! * **Upload**: a local path or URL is read, checked for the `%PDF`
//!   signature, and every page's text is extracted with pdfium and joined in
//!   page order. One document per session.
//! * **Question**: a system message carrying the full document text plus the
//!   question is sent to the model (Groq `llama-3.3-70b-versatile`,
//!   temperature 0.1 by default). Prior turns are not sent.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfchat::{ChatConfig, PdfChat, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from GROQ_API_KEY
//!     let chat = PdfChat::new(ChatConfig::default())?;
//!     let mut session = Session::new();
//!
//!     chat.handle_upload(&mut session, "report.pdf").await?;
//!     let answer = chat.handle_question(&mut session, "What is the conclusion?").await?;
//!     println!("{}", answer.content);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfchat` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! ## Backends
//!
//! The default backend is any OpenAI-compatible `/chat/completions`
//! endpoint. Setting a provider name (`openai`, `anthropic`, `gemini`,
//! `ollama`, …) switches to the matching edgequake-llm provider instead.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod chat;
pub mod config;
pub mod document;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{BackendReply, ChatBackend, ChatRequest, OpenAiCompatibleBackend, ProviderBackend};
pub use chat::{inspect, load_document, PdfChat};
pub use config::{ChatConfig, ChatConfigBuilder};
pub use document::{DocumentMetadata, LoadedDocument};
pub use error::PdfChatError;
pub use pipeline::answer::Answer;
pub use progress::{ChatProgressCallback, NoopProgressCallback, ProgressCallback};
pub use session::{Role, Session, SessionState, Turn};
