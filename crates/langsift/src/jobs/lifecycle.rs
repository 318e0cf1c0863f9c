//! Worker start-up and shutdown.
//!
//! [`JobLifecycleCoordinator`] is shared by every worker of a factory. Start-up
//! makes sure the language model is loaded and then counts the worker in; shutdown
//! counts it out and, when it was the last one of its job, posts the job summary.
//! [`WorkerState`] is the per-worker half of the protocol.

use super::registry::JobStatsRegistry;
use super::summary::JobSummary;
use crate::language_detection::{ClassifierSlot, LanguageClassifier};
use crate::sinks::NotificationSink;
use crate::types::JobId;
use crate::{LangsiftError, Result};
use std::fmt;
use std::sync::Arc;

/// Where a worker is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Unstarted,
    Active { job_id: JobId },
    Retired { job_id: JobId },
}

impl WorkerState {
    /// Job of an active worker.
    ///
    /// # Errors
    ///
    /// `LifecycleViolation` naming `operation` if the worker is not active.
    pub fn require_active(&self, operation: &str) -> Result<JobId> {
        match *self {
            WorkerState::Active { job_id } => Ok(job_id),
            other => {
                let message = format!("{} called on a worker that is {}", operation, other);
                tracing::error!("{}", message);
                Err(LangsiftError::LifecycleViolation(message))
            }
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerState::Unstarted => write!(f, "not started"),
            WorkerState::Active { job_id } => write!(f, "active in job {}", job_id),
            WorkerState::Retired { job_id } => write!(f, "retired from job {}", job_id),
        }
    }
}

/// Shared start-up / shutdown logic for all workers of one module.
pub struct JobLifecycleCoordinator {
    module_name: String,
    registry: Arc<JobStatsRegistry>,
    classifier: Arc<ClassifierSlot>,
    notifier: Arc<dyn NotificationSink>,
}

impl JobLifecycleCoordinator {
    pub fn new(
        module_name: impl Into<String>,
        registry: Arc<JobStatsRegistry>,
        classifier: Arc<ClassifierSlot>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            module_name: module_name.into(),
            registry,
            classifier,
            notifier,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn registry(&self) -> &Arc<JobStatsRegistry> {
        &self.registry
    }

    pub fn notifier(&self) -> &Arc<dyn NotificationSink> {
        &self.notifier
    }

    /// Load (or reuse) the shared classifier, then register a worker for `job_id`.
    ///
    /// A model load failure is returned before the registry is touched, so the
    /// job's counters never include a worker that could not start.
    pub fn start_up(&self, job_id: JobId) -> Result<Arc<LanguageClassifier>> {
        let classifier = self.classifier.get_or_load().inspect_err(|e| {
            tracing::error!(job_id, error = %e, "Language model failed to load");
        })?;
        self.registry.register(job_id)?;
        Ok(classifier)
    }

    /// Deregister a worker of `job_id`, posting the summary if it was the last.
    pub fn shut_down(&self, job_id: JobId) -> Result<Option<JobSummary>> {
        let Some(totals) = self.registry.deregister(job_id)? else {
            return Ok(None);
        };

        let summary = JobSummary::new(self.module_name.clone(), totals);
        tracing::info!(
            job_id,
            files_processed = summary.files_processed,
            processing_time_ms = summary.processing_time.as_millis() as u64,
            "Job finished"
        );
        self.notifier.post_summary(&summary);
        Ok(Some(summary))
    }
}

impl fmt::Debug for JobLifecycleCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobLifecycleCoordinator")
            .field("module_name", &self.module_name)
            .field("registry", &self.registry)
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}
