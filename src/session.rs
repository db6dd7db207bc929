//! Per-session conversation state.
//!
//! A [`Session`] is created empty for each interactive user, passed by
//! `&mut` into every handler, and dropped when the user leaves. It holds at
//! most one [`LoadedDocument`] and an append-only transcript.
//!
//! ```text
//!   Empty ──upload──▶ Ready ──question──▶ Ready
//!     │                  └──upload──▶ Ready   (rejected: already loaded)
//!     └──question──▶ Empty                    (rejected: no document)
//! ```

use crate::document::LoadedDocument;
use crate::error::PdfChatError;
use serde::{Deserialize, Serialize};

/// Author of a message.
///
/// Transcript turns are only ever [`Role::User`] or [`Role::Assistant`];
/// [`Role::System`] appears in outbound requests only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No document uploaded yet; questions are rejected.
    Empty,
    /// A document is loaded; questions are answered.
    Ready,
}

/// Document text plus transcript for one user.
#[derive(Debug, Default)]
pub struct Session {
    document: Option<LoadedDocument>,
    transcript: Vec<Turn>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        if self.document.is_some() {
            SessionState::Ready
        } else {
            SessionState::Empty
        }
    }

    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// The extracted text of the loaded document.
    pub fn document_text(&self) -> Option<&str> {
        self.document.as_ref().map(|d| d.text.as_str())
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Append a turn at the end. No validation; empty content is kept.
    pub fn append(&mut self, turn: Turn) {
        self.transcript.push(turn);
    }

    /// Fail with [`PdfChatError::DocumentAlreadyLoaded`] if a document is
    /// already held. Handlers call this before extracting anything.
    pub fn ensure_no_document(&self) -> Result<(), PdfChatError> {
        match self.document {
            Some(ref doc) => Err(PdfChatError::DocumentAlreadyLoaded {
                name: doc.metadata.source.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Store the document for the rest of the session.
    ///
    /// A second document is rejected and the session is left unchanged.
    pub fn attach_document(&mut self, doc: LoadedDocument) -> Result<&LoadedDocument, PdfChatError> {
        self.ensure_no_document()?;
        let doc = self.document.insert(doc);
        Ok(&*doc)
    }
}
