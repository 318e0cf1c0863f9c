//! The per-thread file classification worker.
//!
//! For each file the worker:
//!
//! 1. returns `Cancelled` if the job was cancelled,
//! 2. skips files that are not regular, are known, or have an unsupported
//!    extension (no I/O),
//! 3. reads and extracts the text,
//! 4. classifies it with the shared [`LanguageClassifier`],
//! 5. hands the [`ClassificationRecord`] to the [`ArtifactSink`] and adds the
//!    file to the job's totals.
//!
//! Any failure in steps 3-5 fails the current file only.

use crate::core::config::LangsiftConfig;
use crate::extraction::{TextExtractor, truncate_chars};
use crate::ingest::{FileIngestModule, IngestFile, IngestJobContext, KnownStatus};
use crate::jobs::{JobLifecycleCoordinator, WorkerState};
use crate::language_detection::LanguageClassifier;
use crate::sinks::ArtifactSink;
use crate::types::{ClassificationRecord, FileOutcome, JobId, SkipReason};
use crate::{LangsiftError, Result};
use std::io::Read;
use std::sync::Arc;
use std::time::Instant;

/// Decide from metadata alone whether `file` is out of scope.
pub fn prefilter(file: &dyn IngestFile, config: &LangsiftConfig) -> Option<SkipReason> {
    if !file.kind().is_regular() {
        return Some(SkipReason::NotRegularFile);
    }
    if config.skip_known_files && file.known_status() == KnownStatus::Known {
        return Some(SkipReason::KnownFile);
    }
    if !config.is_supported_extension(file.extension()) {
        return Some(SkipReason::UnsupportedExtension);
    }
    None
}

/// Worker created by [`LanguageDetectorFactory`](crate::factory::LanguageDetectorFactory),
/// one per processing thread.
pub struct FileClassificationWorker {
    coordinator: Arc<JobLifecycleCoordinator>,
    config: Arc<LangsiftConfig>,
    extractor: Arc<dyn TextExtractor>,
    artifacts: Arc<dyn ArtifactSink>,
    state: WorkerState,
    context: Option<Arc<dyn IngestJobContext>>,
    classifier: Option<Arc<LanguageClassifier>>,
    cancellation_reported: bool,
}

impl FileClassificationWorker {
    pub fn new(
        coordinator: Arc<JobLifecycleCoordinator>,
        config: Arc<LangsiftConfig>,
        extractor: Arc<dyn TextExtractor>,
        artifacts: Arc<dyn ArtifactSink>,
    ) -> Self {
        Self {
            coordinator,
            config,
            extractor,
            artifacts,
            state: WorkerState::Unstarted,
            context: None,
            classifier: None,
            cancellation_reported: false,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn report_cancellation(&mut self, job_id: JobId) {
        if self.cancellation_reported {
            return;
        }
        self.cancellation_reported = true;

        let module = self.coordinator.module_name();
        tracing::info!(job_id, "{} cancelled by user", module);
        self.coordinator
            .notifier()
            .post_info(module, &format!("{} cancelled by user", module));
    }

    fn classify_file(&self, job_id: JobId, file: &dyn IngestFile) -> Result<ClassificationRecord> {
        let classifier = self
            .classifier
            .as_ref()
            .ok_or_else(|| LangsiftError::LifecycleViolation("active worker has no classifier".to_string()))?;

        let started = Instant::now();

        let mut bytes = Vec::new();
        file.open()?.read_to_end(&mut bytes)?;

        let text = self.extractor.extract(&bytes, file.extension())?;
        if text.trim().is_empty() {
            return Err(LangsiftError::parsing(format!("No text could be extracted from '{}'", file.name())));
        }
        let text = truncate_chars(&text, self.config.max_text_chars);

        let language = classifier.classify(text)?;
        let elapsed = started.elapsed();

        Ok(ClassificationRecord {
            job_id,
            file_id: file.id(),
            file_name: file.name().to_string(),
            language_code: language.code,
            language_name: language.display_name,
            confidence: language.confidence,
            elapsed,
        })
    }
}

impl FileIngestModule for FileClassificationWorker {
    #[tracing::instrument(skip_all, fields(job_id = ctx.job_id()))]
    fn start_up(&mut self, ctx: Arc<dyn IngestJobContext>) -> Result<()> {
        if self.state != WorkerState::Unstarted {
            let message = format!("start_up called on a worker that is {}", self.state);
            tracing::error!("{}", message);
            return Err(LangsiftError::LifecycleViolation(message));
        }

        let job_id = ctx.job_id();
        let classifier = self.coordinator.start_up(job_id)?;

        self.classifier = Some(classifier);
        self.context = Some(ctx);
        self.state = WorkerState::Active { job_id };
        tracing::debug!("Worker started");
        Ok(())
    }

    #[tracing::instrument(skip_all, fields(file_id = file.id(), file_name = %file.name()))]
    fn process(&mut self, file: &dyn IngestFile) -> Result<FileOutcome> {
        let job_id = self.state.require_active("process")?;

        if self.context.as_ref().is_some_and(|ctx| ctx.is_cancelled()) {
            self.report_cancellation(job_id);
            return Ok(FileOutcome::Cancelled);
        }

        if let Some(reason) = prefilter(file, &self.config) {
            tracing::trace!(?reason, "Skipping file");
            return Ok(FileOutcome::Skipped(reason));
        }

        let record = self.classify_file(job_id, file).inspect_err(|e| {
            tracing::warn!(error = %e, "Error processing file");
        })?;

        self.artifacts.record_language(&record).inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to record language artifact");
        })?;
        self.coordinator.registry().record_completion(job_id, record.elapsed)?;

        tracing::debug!(
            language = %record.language_name,
            elapsed_ms = record.elapsed.as_millis() as u64,
            "Classified file"
        );
        Ok(FileOutcome::Classified(record))
    }

    #[tracing::instrument(skip_all)]
    fn shut_down(&mut self) -> Result<()> {
        let job_id = self.state.require_active("shut_down")?;
        self.state = WorkerState::Retired { job_id };
        self.classifier = None;
        self.context = None;

        self.coordinator.shut_down(job_id)?;
        Ok(())
    }
}

impl std::fmt::Debug for FileClassificationWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileClassificationWorker")
            .field("state", &self.state)
            .field("cancellation_reported", &self.cancellation_reported)
            .finish_non_exhaustive()
    }
}
