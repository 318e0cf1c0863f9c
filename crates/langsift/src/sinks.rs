//! Output boundaries: where language results and job messages go.
//!
//! - [`ArtifactSink`] persists one [`ClassificationRecord`] per classified file.
//!   Every record is written as a single "interesting file hit" artifact that
//!   carries the language and the `Language_Detected` set name
//!   ([`LanguageArtifact`]).
//! - [`NotificationSink`] receives the end-of-job [`JobSummary`] and the
//!   occasional informational notice (e.g. job cancelled).

use crate::jobs::JobSummary;
use crate::types::{ClassificationRecord, LANGUAGE_SET_NAME};
use crate::{LangsiftError, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Artifact category every language record is filed under.
pub const ARTIFACT_TYPE: &str = "interesting_file_hit";

/// Destination for per-file language results.
pub trait ArtifactSink: Send + Sync {
    /// Persist `record`. A failure fails the file, not the job.
    fn record_language(&self, record: &ClassificationRecord) -> Result<()>;
}

/// Destination for user-facing job messages.
pub trait NotificationSink: Send + Sync {
    /// Called exactly once per job, by the last worker to shut down.
    fn post_summary(&self, summary: &JobSummary);

    /// Free-form informational notice.
    fn post_info(&self, _subject: &str, _details: &str) {}
}

/// Serialized shape of a language artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageArtifact {
    pub artifact_type: String,
    pub set_name: String,
    pub source_module: String,
    #[serde(flatten)]
    pub record: ClassificationRecord,
}

impl LanguageArtifact {
    pub fn new(source_module: impl Into<String>, record: ClassificationRecord) -> Self {
        Self {
            artifact_type: ARTIFACT_TYPE.to_string(),
            set_name: LANGUAGE_SET_NAME.to_string(),
            source_module: source_module.into(),
            record,
        }
    }
}

/// Keeps every record in memory. Handy for hosts that post-process results
/// and for tests.
#[derive(Debug, Default)]
pub struct MemoryArtifactSink {
    records: Mutex<Vec<ClassificationRecord>>,
}

impl MemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ClassificationRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl ArtifactSink for MemoryArtifactSink {
    fn record_language(&self, record: &ClassificationRecord) -> Result<()> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Writes one JSON object per line to any writer (file, stdout, socket).
///
/// Lines from concurrent workers never interleave: each record is serialized
/// first and written under a lock.
pub struct JsonLinesSink<W: Write + Send> {
    source_module: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(source_module: impl Into<String>, writer: W) -> Self {
        Self {
            source_module: source_module.into(),
            writer: Mutex::new(writer),
        }
    }

    pub fn flush(&self) -> Result<()> {
        self.writer.lock().flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

impl<W: Write + Send> ArtifactSink for JsonLinesSink<W> {
    fn record_language(&self, record: &ClassificationRecord) -> Result<()> {
        let artifact = LanguageArtifact::new(self.source_module.clone(), record.clone());
        let mut line = serde_json::to_vec(&artifact)?;
        line.push(b'\n');

        self.writer
            .lock()
            .write_all(&line)
            .map_err(|e| LangsiftError::sink_with_source(format!("Failed to write record for file {}", record.file_id), e))
    }
}

/// Sends job messages to the `tracing` subscriber at `info` level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn post_summary(&self, summary: &JobSummary) {
        tracing::info!(
            job_id = summary.job_id,
            files_processed = summary.files_processed,
            processing_time_ms = summary.processing_time.as_millis() as u64,
            "{}",
            summary.subject()
        );
    }

    fn post_info(&self, subject: &str, details: &str) {
        tracing::info!(subject, "{}", details);
    }
}

/// Collects job messages in memory.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    summaries: Mutex<Vec<JobSummary>>,
    infos: Mutex<Vec<(String, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summaries(&self) -> Vec<JobSummary> {
        self.summaries.lock().clone()
    }

    pub fn infos(&self) -> Vec<(String, String)> {
        self.infos.lock().clone()
    }
}

impl NotificationSink for MemoryNotifier {
    fn post_summary(&self, summary: &JobSummary) {
        self.summaries.lock().push(summary.clone());
    }

    fn post_info(&self, subject: &str, details: &str) {
        self.infos.lock().push((subject.to_string(), details.to_string()));
    }
}
