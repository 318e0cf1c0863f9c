//! langsift - per-job document language classification
//!
//! langsift plugs into a batch ingest host: for every candidate document in an
//! ingest job it extracts plain text, identifies the natural language, records the
//! result, and keeps per-job totals that are reported once when the job's last
//! worker retires.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use langsift::factory::LanguageDetectorFactory;
//! use langsift::ingest::{FsIngestFile, IngestModuleFactory, JobHandle};
//! use langsift::sinks::MemoryArtifactSink;
//! use langsift::LangsiftConfig;
//! use std::sync::Arc;
//!
//! # fn main() -> langsift::Result<()> {
//! let artifacts = Arc::new(MemoryArtifactSink::new());
//! let factory = LanguageDetectorFactory::new(LangsiftConfig::default(), artifacts.clone())?;
//!
//! let mut worker = factory.create_file_module();
//! worker.start_up(Arc::new(JobHandle::new(1)))?;
//! worker.process(&FsIngestFile::new(1, "report.docx"))?;
//! worker.shut_down()?;
//!
//! for record in artifacts.records() {
//!     println!("{}: {}", record.file_name, record.language_name);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Jobs** (`jobs`): job statistics registry, worker lifecycle coordination, summaries
//! - **Worker** (`worker`): per-file filter, extract, classify, record
//! - **Extraction** (`extraction`): DOCX, PPTX, XLS(X), PDF and legacy DOC/PPT to text
//! - **Language detection** (`language_detection`): shared whatlang model with reset-after-detect
//! - **Ingest** (`ingest`): traits the host framework implements
//! - **Sinks** (`sinks`): artifact and notification outputs

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod factory;
pub mod ingest;
pub mod jobs;
pub mod language_detection;
pub mod sinks;
pub mod types;
pub mod worker;

pub use error::{LangsiftError, Result};

pub use core::config::{LangsiftConfig, LanguageDetectionConfig};
pub use factory::LanguageDetectorFactory;
pub use types::*;
