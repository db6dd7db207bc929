//! Upload resolution: turn a user-supplied path or URL into PDF bytes.
//!
//! PDFium parses from an in-memory slice, so both local files and downloads
//! end up as a `Vec<u8>`. The `%PDF-` header is checked here so a wrong
//! file type gets a clear error instead of a PDFium parse failure. Like
//! PDFium, the header may appear anywhere in the first 1024 bytes (a BOM or
//! stray line break before it is tolerated).

use crate::error::PdfChatError;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PDF_HEADER: &[u8] = b"%PDF-";
/// How far into the file the header is searched for.
const HEADER_SEARCH_WINDOW: usize = 1024;
/// Bytes echoed back in `NotAPdf` errors.
const MAGIC_PREVIEW_LEN: usize = 4;

/// Raw bytes of an uploaded PDF plus the name it is shown under.
#[derive(Debug, Clone)]
pub struct UploadedPdf {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedPdf {
    /// Wrap in-memory bytes, checking for the `%PDF-` header.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PdfChatError> {
        let name = name.into();
        check_magic(&name, &bytes)?;
        Ok(Self { name, bytes })
    }
}

fn check_magic(name: &str, bytes: &[u8]) -> Result<(), PdfChatError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(PDF_HEADER.len()).any(|w| w == PDF_HEADER) {
        return Ok(());
    }
    Err(PdfChatError::NotAPdf {
        name: name.to_string(),
        magic: bytes.iter().take(MAGIC_PREVIEW_LEN).copied().collect(),
    })
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the upload argument to PDF bytes.
///
/// URLs are downloaded with `timeout_secs`; anything else is read as a local path.
pub async fn resolve_upload(input: &str, timeout_secs: u64) -> Result<UploadedPdf, PdfChatError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(PdfChatError::InvalidInput {
            input: input.to_string(),
        });
    }
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        read_local(Path::new(input)).await
    }
}

async fn read_local(path: &Path) -> Result<UploadedPdf, PdfChatError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => PdfChatError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => PdfChatError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    let name = display_name(path);
    debug!("Read local PDF {} ({} bytes)", path.display(), bytes.len());
    UploadedPdf::from_bytes(name, bytes)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| PathBuf::from(path).display().to_string())
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<UploadedPdf, PdfChatError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| PdfChatError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            PdfChatError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            PdfChatError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(PdfChatError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| PdfChatError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    UploadedPdf::from_bytes(filename_from_url(url), bytes.to_vec())
}

/// Last path segment of the URL when it looks like a file name, else the URL.
fn filename_from_url(url: &str) -> String {
    if let Ok(parsed) = reqwest::Url::parse(url) {
        if let Some(mut segments) = parsed.path_segments() {
            if let Some(last) = segments.next_back() {
                if !last.is_empty() && last.contains('.') {
                    return last.to_string();
                }
            }
        }
    }
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/doc.pdf"));
        assert!(is_url("http://example.com/doc.pdf"));
        assert!(!is_url("/tmp/doc.pdf"));
        assert!(!is_url("doc.pdf"));
        assert!(!is_url(""));
    }

    #[test]
    fn filename_comes_from_last_segment() {
        assert_eq!(
            filename_from_url("https://arxiv.org/pdf/paper.pdf"),
            "paper.pdf"
        );
        assert_eq!(
            filename_from_url("https://arxiv.org/pdf/1706.03762"),
            "1706.03762"
        );
        assert_eq!(
            filename_from_url("https://example.com/download"),
            "https://example.com/download"
        );
    }

    #[test]
    fn from_bytes_checks_signature() {
        assert!(UploadedPdf::from_bytes("a.pdf", b"%PDF-1.7\n".to_vec()).is_ok());

        match UploadedPdf::from_bytes("a.txt", b"hello".to_vec()) {
            Err(PdfChatError::NotAPdf { name, magic }) => {
                assert_eq!(name, "a.txt");
                assert_eq!(magic, b"hell".to_vec());
            }
            other => panic!("expected NotAPdf, got {other:?}"),
        }

        assert!(matches!(
            UploadedPdf::from_bytes("empty.pdf", Vec::new()),
            Err(PdfChatError::NotAPdf { .. })
        ));
    }

    #[test]
    fn header_after_leading_bytes_is_accepted() {
        let bom = b"\xEF\xBB\xBF%PDF-1.4\n%%EOF\n".to_vec();
        assert!(UploadedPdf::from_bytes("bom.pdf", bom).is_ok());

        let crlf = b"\r\n%PDF-1.4\n%%EOF\n".to_vec();
        assert!(UploadedPdf::from_bytes("crlf.pdf", crlf).is_ok());

        let mut late = vec![b' '; HEADER_SEARCH_WINDOW];
        late.extend_from_slice(b"%PDF-1.4\n");
        assert!(matches!(
            UploadedPdf::from_bytes("late.pdf", late),
            Err(PdfChatError::NotAPdf { .. })
        ));
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let err = resolve_upload("/definitely/not/here.pdf", 5).await.unwrap_err();
        assert!(matches!(err, PdfChatError::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn local_non_pdf_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"just some text").unwrap();
        let err = resolve_upload(tmp.path().to_str().unwrap(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, PdfChatError::NotAPdf { .. }));
    }

    #[tokio::test]
    async fn local_pdf_bytes_are_read() {
        let mut tmp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        tmp.write_all(b"%PDF-1.4\n%%EOF\n").unwrap();
        let upload = resolve_upload(tmp.path().to_str().unwrap(), 5).await.unwrap();
        assert!(upload.name.ends_with(".pdf"));
        assert!(upload.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn blank_input_is_invalid() {
        let err = resolve_upload("   ", 5).await.unwrap_err();
        assert!(matches!(err, PdfChatError::InvalidInput { .. }));
    }
}
