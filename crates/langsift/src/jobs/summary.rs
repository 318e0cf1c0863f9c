//! End-of-job summary posted by the last retiring worker.

use super::registry::FinalTotals;
use crate::types::JobId;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Totals for one finished job, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub job_id: JobId,
    /// Display name of the module that produced the summary
    pub module: String,
    pub files_processed: u64,
    #[serde(rename = "processing_time_ms", serialize_with = "serialize_millis")]
    pub processing_time: Duration,
}

impl JobSummary {
    pub fn new(module: impl Into<String>, totals: FinalTotals) -> Self {
        Self {
            job_id: totals.job_id,
            module: module.into(),
            files_processed: totals.files_processed,
            processing_time: totals.processing_time,
        }
    }

    /// One-line subject for the host's message list.
    pub fn subject(&self) -> String {
        format!("{} Results", self.module)
    }

    /// HTML body: module name followed by the two totals rows.
    pub fn details_html(&self) -> String {
        format!(
            "<table border='0' cellpadding='4' width='280'>\
             <tr><td>{}</td></tr>\
             <tr><td>Total Processing Time</td><td>{}</td></tr>\n\
             <tr><td>Total Files Processed</td><td>{}</td></tr>\n\
             </table>",
            html_escape(&self.module),
            self.processing_time.as_millis(),
            self.files_processed
        )
    }
}

impl fmt::Display for JobSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (job {}): {} files processed in {} ms",
            self.module,
            self.job_id,
            self.files_processed,
            self.processing_time.as_millis()
        )
    }
}

fn serialize_millis<S: serde::Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
