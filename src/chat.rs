//! Session handlers: one per inbound event.
//!
//! [`PdfChat`] owns the configuration and the resolved backend and is shared
//! by every session; each [`Session`] is owned by its user and passed in by
//! `&mut`. The two handlers perform the only state transitions:
//!
//! | Event | Handler | Effect on success |
//! |-------|---------|-------------------|
//! | file uploaded | [`PdfChat::handle_upload`] | document attached (Empty → Ready) |
//! | question submitted | [`PdfChat::handle_question`] | user + assistant turns appended |

use crate::backend::{resolve_backend, ChatBackend};
use crate::config::ChatConfig;
use crate::document::{DocumentMetadata, LoadedDocument};
use crate::error::PdfChatError;
use crate::pipeline::answer::{generate_answer, Answer};
use crate::pipeline::{extract, input};
use crate::session::{Session, Turn};
use std::sync::Arc;
use tracing::{info, warn};

/// Upload and question handlers bound to one backend.
pub struct PdfChat {
    config: ChatConfig,
    backend: Arc<dyn ChatBackend>,
}

impl PdfChat {
    /// Resolve the backend from `config`.
    ///
    /// Fails with [`PdfChatError::MissingCredential`] when the API key is
    /// absent, so the caller can refuse to start.
    pub fn new(config: ChatConfig) -> Result<Self, PdfChatError> {
        let backend = resolve_backend(&config)?;
        info!("Answering with backend '{}' (model {})", backend.name(), config.model);
        Ok(Self { config, backend })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Handle "file uploaded": resolve `input` (path or URL), extract its
    /// text and attach it to `session`.
    ///
    /// Rejected with [`PdfChatError::DocumentAlreadyLoaded`] before any I/O
    /// when the session already holds a document. On any failure the
    /// session is unchanged.
    ///
    /// The progress callback's extraction span covers the download too.
    pub async fn handle_upload<'s>(
        &self,
        session: &'s mut Session,
        input: &str,
    ) -> Result<&'s LoadedDocument, PdfChatError> {
        session.ensure_no_document()?;
        self.notify_extraction_start(input);
        let upload = input::resolve_upload(input, self.config.download_timeout_secs)
            .await
            .map_err(|e| self.notify_extraction_error(e))?;
        self.attach(session, upload).await
    }

    /// Like [`PdfChat::handle_upload`] for bytes already in memory.
    pub async fn handle_upload_bytes<'s>(
        &self,
        session: &'s mut Session,
        name: &str,
        bytes: Vec<u8>,
    ) -> Result<&'s LoadedDocument, PdfChatError> {
        session.ensure_no_document()?;
        self.notify_extraction_start(name);
        let upload = input::UploadedPdf::from_bytes(name, bytes)
            .map_err(|e| self.notify_extraction_error(e))?;
        self.attach(session, upload).await
    }

    fn notify_extraction_start(&self, name: &str) {
        if let Some(cb) = self.config.progress_callback.as_ref() {
            cb.on_extraction_start(name);
        }
    }

    fn notify_extraction_error(&self, e: PdfChatError) -> PdfChatError {
        if let Some(cb) = self.config.progress_callback.as_ref() {
            cb.on_extraction_error(&e.to_string());
        }
        e
    }

    /// Extract `upload` and attach it. The extraction span is already open.
    async fn attach<'s>(
        &self,
        session: &'s mut Session,
        upload: input::UploadedPdf,
    ) -> Result<&'s LoadedDocument, PdfChatError> {
        let doc = extract::extract_document(upload, self.config.password.as_deref())
            .await
            .map_err(|e| self.notify_extraction_error(e))?;

        info!(
            "Extracted {} chars from {} pages ({} without text)",
            doc.text.len(),
            doc.pages.len(),
            doc.empty_page_count()
        );
        if let Some(cb) = self.config.progress_callback.as_ref() {
            cb.on_extraction_complete(doc.pages.len(), doc.text.len());
        }

        session.attach_document(doc)
    }

    /// Handle "question submitted".
    ///
    /// With no document loaded this returns [`PdfChatError::NoDocumentLoaded`]
    /// and touches nothing. Otherwise the question is appended as a user
    /// turn, the backend is called once, and on success the reply is
    /// appended as an assistant turn. If the call fails the user turn stays
    /// in the transcript without an answer.
    pub async fn handle_question(
        &self,
        session: &mut Session,
        question: &str,
    ) -> Result<Answer, PdfChatError> {
        let document_text = session
            .document_text()
            .ok_or(PdfChatError::NoDocumentLoaded)?
            .to_owned();

        session.append(Turn::user(question));

        let cb = self.config.progress_callback.as_ref();
        if let Some(cb) = cb {
            cb.on_answer_start(question);
        }

        match generate_answer(self.backend.as_ref(), &document_text, question, &self.config).await {
            Ok(answer) => {
                if let Some(cb) = cb {
                    cb.on_answer_complete(answer.content.len(), answer.duration_ms);
                }
                session.append(Turn::assistant(answer.content.as_str()));
                Ok(answer)
            }
            Err(e) => {
                warn!("Question left unanswered: {}", e);
                if let Some(cb) = cb {
                    cb.on_answer_error(&e.to_string());
                }
                Err(e)
            }
        }
    }
}

/// Read and extract a PDF outside of any session.
pub async fn load_document(input_str: &str, config: &ChatConfig) -> Result<LoadedDocument, PdfChatError> {
    let upload = input::resolve_upload(input_str, config.download_timeout_secs).await?;
    extract::extract_document(upload, config.password.as_deref()).await
}

/// Extract PDF metadata without reading page text.
///
/// Does not require an LLM backend or API key. URLs are downloaded with
/// `timeout_secs`.
pub async fn inspect(
    input_str: &str,
    password: Option<&str>,
    timeout_secs: u64,
) -> Result<DocumentMetadata, PdfChatError> {
    let upload = input::resolve_upload(input_str, timeout_secs).await?;
    extract::extract_metadata(upload, password).await
}
