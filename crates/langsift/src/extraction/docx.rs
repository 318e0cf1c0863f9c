//! DOCX (Microsoft Word) text extraction using docx-lite.
//!
//! docx-lite streams `word/document.xml`, so memory stays flat even for large
//! reports.

use crate::error::{LangsiftError, Result};

/// Extract text from DOCX bytes using docx-lite.
///
/// # Arguments
/// * `bytes` - The DOCX file contents as bytes
///
/// # Returns
/// * `Ok(String)` - The extracted text content
/// * `Err(LangsiftError)` - If the archive or its XML is malformed
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    docx_lite::extract_text_from_bytes(bytes)
        .map_err(|e| LangsiftError::parsing(format!("DOCX text extraction failed: {}", e)))
}
