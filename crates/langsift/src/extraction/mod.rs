//! Text extraction from document bytes.
//!
//! The worker only needs plain text, so every format adapter returns a `String`.
//! [`OfficeTextExtractor`] dispatches on the file extension:
//!
//! | Extension | Adapter | Feature |
//! |-----------|---------|---------|
//! | docx | [`docx`] (docx-lite) | `office` |
//! | pptx | [`pptx`] (zip + roxmltree) | `office` |
//! | doc, ppt | [`libreoffice`] conversion, then the modern adapter | `office` |
//! | xls, xlsx | [`excel`] (calamine) | `excel` |
//! | pdf | [`pdf`] (lopdf) | `pdf` |

#[cfg(feature = "office")]
pub mod docx;

#[cfg(feature = "excel")]
pub mod excel;

#[cfg(feature = "office")]
pub mod libreoffice;

#[cfg(feature = "pdf")]
pub mod pdf;

#[cfg(feature = "office")]
pub mod pptx;

use crate::core::config::DEFAULT_CONVERSION_TIMEOUT_SECS;
use crate::{LangsiftError, Result};

/// Turns the raw bytes of a file into plain text.
///
/// Implementations must be safe to call from many worker threads at once.
pub trait TextExtractor: Send + Sync {
    /// Extract text from `bytes`. `extension` has no leading dot and may be in any case.
    fn extract(&self, bytes: &[u8], extension: &str) -> Result<String>;
}

/// Default extractor for Word, Excel, PowerPoint and PDF documents.
#[derive(Debug, Clone)]
pub struct OfficeTextExtractor {
    libreoffice_timeout_secs: u64,
}

impl Default for OfficeTextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CONVERSION_TIMEOUT_SECS)
    }
}

impl OfficeTextExtractor {
    pub fn new(libreoffice_timeout_secs: u64) -> Self {
        Self {
            libreoffice_timeout_secs,
        }
    }

    #[cfg(feature = "office")]
    fn extract_legacy(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let (converted, target) = libreoffice::convert_blocking(bytes, extension, self.libreoffice_timeout_secs)?;
        match target {
            "docx" => docx::extract_text(&converted),
            _ => pptx::extract_text(&converted),
        }
    }
}

#[cfg(not(all(feature = "office", feature = "excel", feature = "pdf")))]
fn feature_disabled(extension: &str, feature: &str) -> LangsiftError {
    LangsiftError::UnsupportedFormat(format!(
        "'{}' extraction requires the '{}' feature",
        extension, feature
    ))
}

impl TextExtractor for OfficeTextExtractor {
    fn extract(&self, bytes: &[u8], extension: &str) -> Result<String> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        tracing::trace!(extension = %extension, bytes = bytes.len(), "Extracting text");

        match extension.as_str() {
            #[cfg(feature = "office")]
            "docx" => docx::extract_text(bytes),
            #[cfg(feature = "office")]
            "pptx" => pptx::extract_text(bytes),
            #[cfg(feature = "office")]
            "doc" | "ppt" => self.extract_legacy(bytes, &extension),
            #[cfg(not(feature = "office"))]
            "docx" | "pptx" | "doc" | "ppt" => Err(feature_disabled(&extension, "office")),

            #[cfg(feature = "excel")]
            "xls" | "xlsx" => excel::extract_text(bytes, &extension),
            #[cfg(not(feature = "excel"))]
            "xls" | "xlsx" => Err(feature_disabled(&extension, "excel")),

            #[cfg(feature = "pdf")]
            "pdf" => Ok(pdf::extract_text(bytes)?),
            #[cfg(not(feature = "pdf"))]
            "pdf" => Err(feature_disabled(&extension, "pdf")),

            other => Err(LangsiftError::UnsupportedFormat(format!(
                "No text extractor for '{}' files",
                other
            ))),
        }
    }
}

/// First `max_chars` characters of `text`, cut on a character boundary.
pub fn truncate_chars(text: &str, max_chars: Option<usize>) -> &str {
    match max_chars {
        Some(max) => match text.char_indices().nth(max) {
            Some((byte_index, _)) => &text[..byte_index],
            None => text,
        },
        None => text,
    }
}
