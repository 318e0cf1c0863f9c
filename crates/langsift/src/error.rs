//! Error types for langsift.
//!
//! Every fallible operation in the crate returns [`LangsiftError`]. The variants
//! follow the failure taxonomy of an ingest job:
//!
//! - `ModelLoad` - the shared language model could not be loaded. Fatal for
//!   worker start-up; the worker never becomes active.
//! - `Parsing` / `UnsupportedFormat` / `Io` / `Classification` / `Sink` - a
//!   single file could not be processed. The file is reported as failed and the
//!   job carries on.
//! - `LifecycleViolation` - a worker broke the start-up / process / shutdown
//!   protocol (double shutdown, completion recorded for a finalized job, ...).
//!   These are programming errors; they are logged and returned, never folded
//!   into shared state.
//!
//! **I/O errors bubble up unchanged.** `LangsiftError::Io` is produced by `?` on
//! `std::io::Error` and is never rewrapped.
//!
//! # Example
//!
//! ```rust
//! use langsift::{LangsiftError, Result};
//!
//! fn read_document(path: &str) -> Result<Vec<u8>> {
//!     let bytes = std::fs::read(path)?;
//!
//!     if bytes.is_empty() {
//!         return Err(LangsiftError::parsing(format!("Document is empty: {}", path)));
//!     }
//!
//!     Ok(bytes)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `LangsiftError`.
pub type Result<T> = std::result::Result<T, LangsiftError>;

/// Main error type for all langsift operations.
#[derive(Debug, Error)]
pub enum LangsiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Language model load error: {message}")]
    ModelLoad {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Classification error: {message}")]
    Classification {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Sink error: {message}")]
    Sink {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Lifecycle violation: {0}")]
    LifecycleViolation(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Other(String),
}

impl LangsiftError {
    /// Whether this error should abort worker start-up rather than fail a single file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LangsiftError::ModelLoad { .. })
    }
}

#[cfg(feature = "excel")]
impl From<calamine::Error> for LangsiftError {
    fn from(err: calamine::Error) -> Self {
        LangsiftError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

#[cfg(feature = "office")]
impl From<zip::result::ZipError> for LangsiftError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            // Real IO error bubbles up unchanged
            zip::result::ZipError::Io(io_err) => LangsiftError::Io(io_err),
            other => LangsiftError::Parsing {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(feature = "pdf")]
impl From<crate::extraction::pdf::PdfError> for LangsiftError {
    fn from(err: crate::extraction::pdf::PdfError) -> Self {
        LangsiftError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<serde_json::Error> for LangsiftError {
    fn from(err: serde_json::Error) -> Self {
        LangsiftError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl LangsiftError {
    error_constructor!(parsing, Parsing);
    error_constructor!(model_load, ModelLoad);
    error_constructor!(classification, Classification);
    error_constructor!(validation, Validation);
    error_constructor!(sink, Sink);
    error_constructor!(serialization, Serialization);
}
