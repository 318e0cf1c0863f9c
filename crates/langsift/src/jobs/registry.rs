//! Per-job statistics shared by every worker in the process.
//!
//! One [`JobStatsRegistry`] is shared (via `Arc`) by all workers created by a
//! factory. Each job id maps to the number of active workers, the number of files
//! classified, and the cumulative processing time. The entry appears with the
//! first registration and disappears exactly once, when the last worker
//! deregisters; the totals are handed to that worker alone.
//!
//! Finalized job ids are remembered so that late completions and re-registration
//! are reported as lifecycle violations instead of silently opening a fresh entry.
//! The history is bounded: once it holds [`DEFAULT_FINALIZED_HISTORY`] ids (or
//! the capacity given to [`JobStatsRegistry::with_finalized_capacity`]), the
//! oldest id is forgotten and behaves like a job that was never registered.

use crate::types::JobId;
use crate::{LangsiftError, Result};
use ahash::{AHashMap, AHashSet};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// Number of finalized job ids a registry remembers by default.
pub const DEFAULT_FINALIZED_HISTORY: usize = 4096;

/// Totals of a job, returned once by the deregistration that retires it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalTotals {
    pub job_id: JobId,
    pub files_processed: u64,
    pub processing_time: Duration,
}

/// Point-in-time view of a live job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSnapshot {
    pub active_workers: usize,
    pub files_processed: u64,
    pub processing_time: Duration,
}

#[derive(Debug, Default)]
struct JobEntry {
    active_workers: usize,
    files_processed: u64,
    processing_time: Duration,
}

#[derive(Debug, Default)]
struct RegistryState {
    jobs: AHashMap<JobId, JobEntry>,
    finalized: AHashSet<JobId>,
    /// Finalization order, oldest first
    finalized_order: VecDeque<JobId>,
}

impl RegistryState {
    fn remember_finalized(&mut self, job_id: JobId, capacity: usize) {
        if capacity == 0 || !self.finalized.insert(job_id) {
            return;
        }
        self.finalized_order.push_back(job_id);
        while self.finalized_order.len() > capacity {
            if let Some(oldest) = self.finalized_order.pop_front() {
                self.finalized.remove(&oldest);
                tracing::trace!(job_id = oldest, "Forgot finalized job");
            }
        }
    }
}

/// Thread-safe table of live jobs.
///
/// Every operation takes the same lock, so operations on one job are
/// linearizable and a deregistration observing zero sees every completion
/// recorded before it.
///
/// # Example
///
/// ```rust
/// use langsift::jobs::JobStatsRegistry;
/// use std::time::Duration;
///
/// # fn main() -> langsift::Result<()> {
/// let registry = JobStatsRegistry::new();
/// registry.register(42)?;
/// registry.register(42)?;
/// registry.record_completion(42, Duration::from_millis(120))?;
///
/// assert!(registry.deregister(42)?.is_none());
/// let totals = registry.deregister(42)?.expect("last worker gets the totals");
/// assert_eq!(totals.files_processed, 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct JobStatsRegistry {
    state: Mutex<RegistryState>,
    finalized_capacity: usize,
}

impl Default for JobStatsRegistry {
    fn default() -> Self {
        Self::with_finalized_capacity(DEFAULT_FINALIZED_HISTORY)
    }
}

impl JobStatsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that remembers at most `capacity` finalized job ids.
    pub fn with_finalized_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            finalized_capacity: capacity,
        }
    }

    /// Count one more active worker for `job_id`, creating the entry if needed.
    ///
    /// # Errors
    ///
    /// `LifecycleViolation` if the job was already finalized.
    pub fn register(&self, job_id: JobId) -> Result<()> {
        let mut state = self.state.lock();
        if state.finalized.contains(&job_id) {
            return Err(violation(format!("cannot register worker for finalized job {}", job_id)));
        }

        let entry = state.jobs.entry(job_id).or_default();
        entry.active_workers += 1;
        tracing::debug!(job_id, active_workers = entry.active_workers, "Worker registered");
        Ok(())
    }

    /// Add one classified file and its processing time to `job_id`.
    ///
    /// # Errors
    ///
    /// `LifecycleViolation` if the job has no live entry. The registry is left
    /// unchanged.
    pub fn record_completion(&self, job_id: JobId, elapsed: Duration) -> Result<()> {
        let mut state = self.state.lock();
        let finalized = state.finalized.contains(&job_id);
        match state.jobs.get_mut(&job_id) {
            Some(entry) => {
                entry.files_processed += 1;
                entry.processing_time += elapsed;
                Ok(())
            }
            None if finalized => Err(violation(format!(
                "completion recorded for job {} after it was finalized",
                job_id
            ))),
            None => Err(violation(format!("completion recorded for unknown job {}", job_id))),
        }
    }

    /// Count one fewer active worker for `job_id`.
    ///
    /// Returns the job's totals when this call retired the last worker, and
    /// `None` otherwise.
    ///
    /// # Errors
    ///
    /// `LifecycleViolation` if the job has no live entry.
    pub fn deregister(&self, job_id: JobId) -> Result<Option<FinalTotals>> {
        let mut state = self.state.lock();
        let Some(entry) = state.jobs.get_mut(&job_id) else {
            let reason = if state.finalized.contains(&job_id) {
                "already finalized"
            } else {
                "never registered"
            };
            return Err(violation(format!("cannot deregister worker for job {}: {}", job_id, reason)));
        };

        entry.active_workers -= 1;
        tracing::debug!(job_id, active_workers = entry.active_workers, "Worker deregistered");
        if entry.active_workers > 0 {
            return Ok(None);
        }

        let Some(entry) = state.jobs.remove(&job_id) else {
            return Ok(None);
        };
        state.remember_finalized(job_id, self.finalized_capacity);

        Ok(Some(FinalTotals {
            job_id,
            files_processed: entry.files_processed,
            processing_time: entry.processing_time,
        }))
    }

    pub fn snapshot(&self, job_id: JobId) -> Option<JobSnapshot> {
        self.state.lock().jobs.get(&job_id).map(|entry| JobSnapshot {
            active_workers: entry.active_workers,
            files_processed: entry.files_processed,
            processing_time: entry.processing_time,
        })
    }

    /// Number of jobs with at least one active worker.
    pub fn active_jobs(&self) -> usize {
        self.state.lock().jobs.len()
    }

    pub fn is_finalized(&self, job_id: JobId) -> bool {
        self.state.lock().finalized.contains(&job_id)
    }
}

fn violation(message: String) -> LangsiftError {
    tracing::error!("{}", message);
    LangsiftError::LifecycleViolation(message)
}
