//! Text extraction: PDF bytes → per-page text via pdfium.
//!
//! `pdfium-render` wraps the pdfium C++ library, which is not async-safe, so
//! every call here runs inside `tokio::task::spawn_blocking`.
//!
//! Pages whose text layer is missing or unreadable (scanned images) yield an
//! empty string. Only a document that pdfium cannot open at all is an error.

use super::input::UploadedPdf;
use crate::document::{DocumentMetadata, LoadedDocument};
use crate::error::PdfChatError;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable pointing at a pdfium library file or its directory.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Extract the text of every page and concatenate it in page order.
pub async fn extract_document(
    upload: UploadedPdf,
    password: Option<&str>,
) -> Result<LoadedDocument, PdfChatError> {
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || extract_document_blocking(&upload, pwd.as_deref()))
        .await
        .map_err(|e| PdfChatError::Internal(format!("Extraction task panicked: {}", e)))?
}

/// Read metadata only, without extracting page text.
pub async fn extract_metadata(
    upload: UploadedPdf,
    password: Option<&str>,
) -> Result<DocumentMetadata, PdfChatError> {
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &upload, pwd.as_deref())?;
        Ok(read_metadata(&document, &upload.name))
    })
    .await
    .map_err(|e| PdfChatError::Internal(format!("Metadata task panicked: {}", e)))?
}

fn extract_document_blocking(
    upload: &UploadedPdf,
    password: Option<&str>,
) -> Result<LoadedDocument, PdfChatError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, upload, password)?;
    let metadata = read_metadata(&document, &upload.name);
    info!("PDF loaded: {} ({} pages)", upload.name, metadata.page_count);

    let pages: Vec<String> = document
        .pages()
        .iter()
        .enumerate()
        .map(|(idx, page)| match page.text() {
            Ok(text) => {
                let text = text.all();
                debug!("Page {}: {} chars", idx + 1, text.len());
                text
            }
            Err(e) => {
                warn!("Page {}: no readable text layer ({:?})", idx + 1, e);
                String::new()
            }
        })
        .collect();

    Ok(LoadedDocument::from_pages(metadata, pages))
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` first, then the working directory,
/// then the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, PdfChatError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(path) if !path.is_empty() => {
            debug!("Binding pdfium from {}={}", PDFIUM_LIB_PATH_ENV, path);
            if Path::new(&path).is_dir() {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(path.as_str()))
            } else {
                Pdfium::bind_to_library(path.as_str())
            }
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PdfChatError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    upload: &'a UploadedPdf,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfChatError> {
    pdfium
        .load_pdf_from_byte_slice(&upload.bytes, password)
        .map_err(|e| classify_load_error(&upload.name, &format!("{:?}", e), password.is_some()))
}

/// Map a pdfium load failure to a password or corruption error.
fn classify_load_error(name: &str, detail: &str, password_given: bool) -> PdfChatError {
    if detail.contains("Password") || detail.contains("password") {
        if password_given {
            PdfChatError::WrongPassword {
                name: name.to_string(),
            }
        } else {
            PdfChatError::PasswordRequired {
                name: name.to_string(),
            }
        }
    } else {
        PdfChatError::CorruptPdf {
            name: name.to_string(),
            detail: detail.to_string(),
        }
    }
}

fn read_metadata(document: &PdfDocument<'_>, source: &str) -> DocumentMetadata {
    let metadata = document.metadata();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        source: source.to_string(),
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: document.pages().len() as usize,
        pdf_version: format!("{:?}", document.version()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_errors_without_password() {
        let e = classify_load_error("a.pdf", "PdfiumLibraryInternalError(PasswordError)", false);
        assert!(matches!(e, PdfChatError::PasswordRequired { .. }));
    }

    #[test]
    fn password_errors_with_password() {
        let e = classify_load_error("a.pdf", "PdfiumLibraryInternalError(PasswordError)", true);
        assert!(matches!(e, PdfChatError::WrongPassword { .. }));
    }

    #[test]
    fn other_errors_are_corruption() {
        let e = classify_load_error("a.pdf", "PdfiumLibraryInternalError(FormatError)", false);
        match e {
            PdfChatError::CorruptPdf { name, detail } => {
                assert_eq!(name, "a.pdf");
                assert!(detail.contains("FormatError"));
            }
            other => panic!("expected CorruptPdf, got {other:?}"),
        }
    }
}
