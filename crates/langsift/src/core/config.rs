//! Configuration loading and management.
//!
//! This module provides utilities for loading the language detector configuration
//! from TOML, YAML, or JSON files and for discovering a `langsift.toml` in the
//! directory hierarchy.

use crate::{LangsiftError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions handled when no configuration overrides them.
pub const DEFAULT_SUPPORTED_EXTENSIONS: [&str; 7] = ["doc", "docx", "xls", "xlsx", "ppt", "pptx", "pdf"];

/// Default timeout for LibreOffice conversion of legacy formats (300 seconds).
pub const DEFAULT_CONVERSION_TIMEOUT_SECS: u64 = 300;

/// Main configuration for the language detector module.
///
/// Every field has a default, so an empty file is a valid configuration.
///
/// # Example
///
/// ```rust
/// use langsift::core::config::LangsiftConfig;
///
/// let config = LangsiftConfig::default();
/// assert!(config.is_supported_extension("DOCX"));
/// assert!(!config.is_supported_extension("txt"));
///
/// // let config = LangsiftConfig::from_toml_file("langsift.toml")?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LangsiftConfig {
    /// File extensions (without the dot) that are extracted and classified
    #[serde(default = "default_supported_extensions")]
    pub supported_extensions: Vec<String>,

    /// Skip files the reputation check marks as known
    #[serde(default = "default_true")]
    pub skip_known_files: bool,

    /// Truncate extracted text to this many characters before classification (None = unlimited)
    #[serde(default)]
    pub max_text_chars: Option<usize>,

    /// Language model settings
    #[serde(default)]
    pub language_detection: LanguageDetectionConfig,

    /// Timeout for converting `.doc` / `.ppt` through LibreOffice
    #[serde(default = "default_conversion_timeout")]
    pub libreoffice_timeout_secs: u64,
}

/// Language detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageDetectionConfig {
    /// Minimum confidence (0.0-1.0); detections below it are reported as undetermined
    #[serde(default)]
    pub min_confidence: f64,

    /// Restrict the model to these ISO 639-1 codes (None = every supported language)
    #[serde(default)]
    pub allowed_languages: Option<Vec<String>>,
}

fn default_true() -> bool {
    true
}
fn default_supported_extensions() -> Vec<String> {
    DEFAULT_SUPPORTED_EXTENSIONS.iter().map(|ext| ext.to_string()).collect()
}
fn default_conversion_timeout() -> u64 {
    DEFAULT_CONVERSION_TIMEOUT_SECS
}

impl Default for LangsiftConfig {
    fn default() -> Self {
        Self {
            supported_extensions: default_supported_extensions(),
            skip_known_files: true,
            max_text_chars: None,
            language_detection: LanguageDetectionConfig::default(),
            libreoffice_timeout_secs: DEFAULT_CONVERSION_TIMEOUT_SECS,
        }
    }
}

impl Default for LanguageDetectionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.0,
            allowed_languages: None,
        }
    }
}

impl LangsiftConfig {
    /// Case-insensitive check against `supported_extensions`.
    ///
    /// A leading dot on `extension` is ignored.
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        if extension.is_empty() {
            return false;
        }
        self.supported_extensions
            .iter()
            .any(|supported| supported.trim_start_matches('.').eq_ignore_ascii_case(extension))
    }

    /// Check the configuration for values the worker cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.supported_extensions.is_empty() {
            return Err(LangsiftError::validation("supported_extensions cannot be empty"));
        }

        let confidence = self.language_detection.min_confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(LangsiftError::validation(format!(
                "language_detection.min_confidence must be between 0.0 and 1.0, got {}",
                confidence
            )));
        }

        if self.max_text_chars == Some(0) {
            return Err(LangsiftError::validation("max_text_chars must be positive when set"));
        }

        if self.libreoffice_timeout_secs == 0 {
            return Err(LangsiftError::validation("libreoffice_timeout_secs must be positive"));
        }

        Ok(())
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `LangsiftError::Validation` if the file doesn't exist or is invalid TOML.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LangsiftError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        toml::from_str(&content)
            .map_err(|e| LangsiftError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LangsiftError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        serde_yaml_ng::from_str(&content)
            .map_err(|e| LangsiftError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            LangsiftError::validation(format!("Failed to read config file {}: {}", path.as_ref().display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| LangsiftError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))
    }

    /// Load configuration, picking the format from the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(LangsiftError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `langsift.toml` in current directory and parent directories.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir()?;

        loop {
            let langsift_toml = current.join("langsift.toml");
            if langsift_toml.exists() {
                return Ok(Some(Self::from_toml_file(langsift_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }
}
