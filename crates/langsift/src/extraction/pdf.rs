//! PDF text extraction using lopdf.
//!
//! Text is read page by page from the content streams. Password-protected
//! documents that lopdf cannot open with an empty password are reported as
//! [`PdfError::PasswordRequired`].
use lopdf::Document;
use std::fmt;

#[derive(Debug, Clone)]
pub enum PdfError {
    InvalidPdf(String),
    PasswordRequired,
    TextExtractionFailed(String),
    IOError(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::PasswordRequired => write!(f, "PDF is password-protected"),
            PdfError::TextExtractionFailed(msg) => write!(f, "Text extraction failed: {}", msg),
            PdfError::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

// NOTE: No From<std::io::Error> impl - IO errors must bubble up unchanged per error handling policy

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(io_err) => PdfError::IOError(io_err.to_string()),
            _ => PdfError::InvalidPdf(err.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;

/// Extract the text of every page, in page order.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let document = Document::load_mem(bytes)?;

    let page_numbers: Vec<u32> = document.get_pages().keys().copied().collect();
    if page_numbers.is_empty() {
        return Ok(String::new());
    }

    match document.extract_text(&page_numbers) {
        Ok(text) => {
            tracing::trace!(pages = page_numbers.len(), chars = text.len(), "Extracted PDF text");
            Ok(text)
        }
        Err(_) if document.is_encrypted() => Err(PdfError::PasswordRequired),
        Err(e) => Err(PdfError::TextExtractionFailed(e.to_string())),
    }
}
