//! The extracted document held by a session.

use serde::{Deserialize, Serialize};

/// Descriptive information read from the PDF alongside its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Display name of the upload (file name or URL).
    pub source: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
}

/// Text of an uploaded PDF, immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedDocument {
    /// All page texts concatenated in page order, no separators.
    pub text: String,
    /// Per-page text, index 0 = page 1. Pages without a text layer are `""`.
    pub pages: Vec<String>,
    pub metadata: DocumentMetadata,
}

impl LoadedDocument {
    /// Build a document from per-page texts.
    pub fn from_pages(metadata: DocumentMetadata, pages: Vec<String>) -> Self {
        let text = concat_page_texts(&pages);
        Self {
            text,
            pages,
            metadata,
        }
    }

    /// Number of pages that produced no text.
    pub fn empty_page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_empty()).count()
    }
}

/// Join page texts in order with nothing in between.
pub fn concat_page_texts<S: AsRef<str>>(pages: &[S]) -> String {
    let mut text = String::with_capacity(pages.iter().map(|p| p.as_ref().len()).sum());
    for page in pages {
        text.push_str(page.as_ref());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_join_without_separator() {
        assert_eq!(concat_page_texts(&["Alpha.", "Beta."]), "Alpha.Beta.");
    }

    #[test]
    fn empty_pages_contribute_nothing() {
        assert_eq!(concat_page_texts(&["", "Beta.", ""]), "Beta.");
        assert_eq!(concat_page_texts::<&str>(&[]), "");
    }

    #[test]
    fn page_text_is_not_trimmed() {
        assert_eq!(concat_page_texts(&["a \n", "\tb"]), "a \n\tb");
    }

    #[test]
    fn from_pages_counts_blank_pages() {
        let doc = LoadedDocument::from_pages(
            DocumentMetadata {
                source: "scan.pdf".into(),
                page_count: 3,
                ..Default::default()
            },
            vec!["Alpha.".into(), String::new(), "Gamma.".into()],
        );
        assert_eq!(doc.text, "Alpha.Gamma.");
        assert_eq!(doc.empty_page_count(), 1);
    }
}
