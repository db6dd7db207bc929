//! Progress-callback trait for the two blocking spans of an interaction.
//!
//! Text extraction and the chat-completion call both block the interaction
//! until they finish. Inject an [`Arc<dyn ChatProgressCallback>`] via
//! [`crate::config::ChatConfigBuilder::progress_callback`] to show a busy
//! indicator while they run. The library itself knows nothing about how the
//! host renders it.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfchat::{ChatConfig, ChatProgressCallback};
//! use std::sync::Arc;
//!
//! struct Log;
//!
//! impl ChatProgressCallback for Log {
//!     fn on_answer_start(&self, question: &str) {
//!         eprintln!("thinking about: {question}");
//!     }
//! }
//!
//! let config = ChatConfig::builder()
//!     .progress_callback(Arc::new(Log) as Arc<dyn ChatProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the session handlers around each blocking span.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ChatProgressCallback: Send + Sync {
    /// Called before the uploaded PDF is read and parsed.
    fn on_extraction_start(&self, name: &str) {
        let _ = name;
    }

    /// Called after text extraction succeeded.
    ///
    /// # Arguments
    /// * `page_count` — pages in the document
    /// * `text_len`   — byte length of the concatenated text
    fn on_extraction_complete(&self, page_count: usize, text_len: usize) {
        let _ = (page_count, text_len);
    }

    /// Called when the upload could not be turned into document text.
    fn on_extraction_error(&self, error: &str) {
        let _ = error;
    }

    /// Called just before the chat-completion request is sent.
    fn on_answer_start(&self, question: &str) {
        let _ = question;
    }

    /// Called when the reply arrived.
    fn on_answer_complete(&self, answer_len: usize, duration_ms: u64) {
        let _ = (answer_len, duration_ms);
    }

    /// Called when the chat-completion request failed.
    fn on_answer_error(&self, error: &str) {
        let _ = error;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ChatProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ChatConfig`].
pub type ProgressCallback = Arc<dyn ChatProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_extraction_start("a.pdf");
        cb.on_extraction_complete(2, 11);
        cb.on_extraction_error("corrupt");
        cb.on_answer_start("q");
        cb.on_answer_complete(10, 5);
        cb.on_answer_error("boom");
    }
}
