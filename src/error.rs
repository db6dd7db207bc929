//! Error types for the edgequake-pdfchat library.
//!
//! Everything that can go wrong is a variant of [`PdfChatError`]. The variants
//! are grouped by where the failure happens, because each group is handled
//! differently by a front-end:
//!
//! * **Configuration** — missing credential or bad builder input. Fatal at
//!   startup; nothing can be asked until it is fixed.
//! * **Upload** — the file could not be read, is not a PDF, or PDFium could
//!   not parse it. The session keeps no partial state.
//! * **Usage** — the question or upload does not fit the session's current
//!   state ("no document loaded", "already loaded"). No side effects.
//! * **Remote** — the chat-completion call failed. Never retried; the
//!   question stays unanswered in the transcript.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdfchat library.
#[derive(Debug, Error)]
pub enum PdfChatError {
    // ── Configuration errors ──────────────────────────────────────────────
    /// The environment variable holding the API key is unset or empty.
    #[error("{var} not found in environment variables\nExport it before starting: export {var}=...")]
    MissingCredential { var: String },

    /// A named edgequake-llm provider could not be created.
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Upload errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The upload argument is neither a usable path nor an HTTP/HTTPS URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read but carry no `%PDF-` header near the start.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: Vec<u8> },

    /// PDFium could not parse the document structure.
    #[error("PDF '{name}' is corrupt: {detail}")]
    CorruptPdf { name: String, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium (file or containing directory).\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Usage errors ──────────────────────────────────────────────────────
    /// A question arrived before any document was uploaded.
    #[error("Please upload a PDF first!")]
    NoDocumentLoaded,

    /// A second upload arrived while a document is already loaded.
    #[error("A PDF is already loaded ('{name}'). Start a new session to chat about another document.")]
    DocumentAlreadyLoaded { name: String },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// The endpoint rejected the credential (401/403).
    #[error("Authentication error from '{provider}': {detail}")]
    AuthError { provider: String, detail: String },

    /// Transport failure or non-success response from the chat endpoint.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The endpoint answered but returned no choice to read.
    #[error("LLM API returned no answer (model '{model}')")]
    EmptyResponse { model: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfChatError {
    /// True for errors caused by the session's state rather than by input or
    /// infrastructure. Front-ends show these as friendly notices.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            PdfChatError::NoDocumentLoaded | PdfChatError::DocumentAlreadyLoaded { .. }
        )
    }
}
