use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque identifier of an ingest job, as assigned by the host.
pub type JobId = u64;

/// Opaque identifier of a file within the host's data store.
pub type FileId = u64;

/// Language code reported when the model cannot determine a language.
pub const UNDETERMINED_LANGUAGE: &str = "und";

/// Set name attached to every language artifact.
pub const LANGUAGE_SET_NAME: &str = "Language_Detected";

/// Result of classifying one file.
///
/// Produced by the worker once extraction and classification succeeded and handed
/// to the [`ArtifactSink`](crate::sinks::ArtifactSink). Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub job_id: JobId,
    pub file_id: FileId,
    pub file_name: String,
    /// ISO 639-1 code, or [`UNDETERMINED_LANGUAGE`]
    pub language_code: String,
    /// Display name from the language table; the raw code when the table has no entry
    pub language_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Wall-clock time spent extracting and classifying the file
    #[serde(with = "duration_ms", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl ClassificationRecord {
    /// Whether the language table knew the detected code.
    pub fn is_name_resolved(&self) -> bool {
        self.language_name != self.language_code
    }
}

/// Why a file was passed through without classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Unallocated or unused blocks, directories, virtual files
    NotRegularFile,
    /// Marked known by the host's reputation check
    KnownFile,
    /// Extension outside the configured set
    UnsupportedExtension,
}

/// Successful outcome of processing one file.
///
/// Failures are reported through `Err(LangsiftError)` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    Classified(ClassificationRecord),
    Skipped(SkipReason),
    /// The job was cancelled before work on this file started
    Cancelled,
}

impl FileOutcome {
    pub fn record(&self) -> Option<&ClassificationRecord> {
        match self {
            FileOutcome::Classified(record) => Some(record),
            _ => None,
        }
    }
}

/// Two-state result the host framework understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessResult {
    Ok,
    Error,
}

impl<E> From<&std::result::Result<FileOutcome, E>> for ProcessResult {
    fn from(result: &std::result::Result<FileOutcome, E>) -> Self {
        match result {
            Ok(_) => ProcessResult::Ok,
            Err(_) => ProcessResult::Error,
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(code: &str, name: &str) -> ClassificationRecord {
        ClassificationRecord {
            job_id: 1,
            file_id: 10,
            file_name: "memo.docx".to_string(),
            language_code: code.to_string(),
            language_name: name.to_string(),
            confidence: Some(0.99),
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_record_serializes_elapsed_as_millis() {
        let json = serde_json::to_value(record("en", "English")).unwrap();
        assert_eq!(json["elapsed_ms"], 1500);
        assert_eq!(json["language_name"], "English");
        assert!(json.get("elapsed").is_none());
    }

    #[test]
    fn test_record_name_resolution() {
        assert!(record("en", "English").is_name_resolved());
        assert!(!record("xx", "xx").is_name_resolved());
    }

    #[test]
    fn test_process_result_from_outcome() {
        let ok: std::result::Result<FileOutcome, String> = Ok(FileOutcome::Cancelled);
        let err: std::result::Result<FileOutcome, String> = Err("corrupt".to_string());
        assert_eq!(ProcessResult::from(&ok), ProcessResult::Ok);
        assert_eq!(ProcessResult::from(&err), ProcessResult::Error);
    }

    #[test]
    fn test_outcome_record_accessor() {
        let outcome = FileOutcome::Classified(record("ru", "Russian"));
        assert_eq!(outcome.record().unwrap().language_code, "ru");
        assert!(FileOutcome::Skipped(SkipReason::KnownFile).record().is_none());
    }
}
