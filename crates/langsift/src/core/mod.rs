//! Core configuration.
//!
//! Holds [`LangsiftConfig`], its loaders and validation.

pub mod config;

pub use config::{LangsiftConfig, LanguageDetectionConfig};
