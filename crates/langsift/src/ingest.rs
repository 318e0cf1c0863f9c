//! Host framework boundary.
//!
//! The ingest host owns jobs, files and threads. It hands each worker an
//! [`IngestJobContext`] at start-up and a stream of [`IngestFile`]s afterwards,
//! and drives the worker through the [`FileIngestModule`] lifecycle:
//!
//! ```text
//! start_up(ctx) ──► process(file)* ──► shut_down()
//! ```
//!
//! Workers are created by an [`IngestModuleFactory`], one per processing thread.
//!
//! [`FsIngestFile`] and [`JobHandle`] are ready-made implementations for hosts
//! that ingest straight from the filesystem.

use crate::Result;
use crate::types::{FileId, FileOutcome, JobId};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Per-job information shared by all workers of one job.
pub trait IngestJobContext: Send + Sync {
    fn job_id(&self) -> JobId;

    /// Whether the user asked the job to stop. Checked once per file.
    fn is_cancelled(&self) -> bool;
}

/// What the host knows about where a file's bytes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// An ordinary allocated file
    Regular,
    /// Unallocated blocks carved out of a volume
    UnallocatedBlocks,
    /// Unused blocks carved out of a volume
    UnusedBlocks,
    Directory,
    /// Derived or virtual file with no content of its own
    Virtual,
}

impl FileKind {
    pub fn is_regular(self) -> bool {
        matches!(self, FileKind::Regular)
    }
}

/// Result of the host's reputation lookup (e.g. a known-file hash set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KnownStatus {
    /// Whitelisted, uninteresting content
    Known,
    /// Flagged as notable by the reputation source
    KnownBad,
    #[default]
    Unknown,
}

/// A candidate file handed to a worker.
pub trait IngestFile {
    fn id(&self) -> FileId;

    fn name(&self) -> &str;

    /// Extension without the leading dot, in whatever case the file uses.
    fn extension(&self) -> &str;

    fn kind(&self) -> FileKind;

    fn known_status(&self) -> KnownStatus;

    /// Open the file content for reading.
    fn open(&self) -> std::io::Result<Box<dyn Read + Send>>;
}

/// Per-thread processing unit driven by the host.
pub trait FileIngestModule: Send {
    /// Prepare the worker for `ctx`'s job. An error here means the worker never runs.
    fn start_up(&mut self, ctx: Arc<dyn IngestJobContext>) -> Result<()>;

    /// Handle one file. `Err` fails that file only; the job carries on.
    fn process(&mut self, file: &dyn IngestFile) -> Result<FileOutcome>;

    /// Retire the worker. Called once, after the last `process`.
    fn shut_down(&mut self) -> Result<()>;
}

/// Creates workers and describes the module to the host.
pub trait IngestModuleFactory: Send + Sync {
    fn module_name(&self) -> &str;

    fn module_description(&self) -> &str;

    fn module_version(&self) -> &str;

    fn create_file_module(&self) -> Box<dyn FileIngestModule>;
}

/// Job context backed by an atomic cancellation flag.
///
/// Clones share the flag, so a signal handler can hold one clone while the
/// workers hold others.
#[derive(Debug, Clone)]
pub struct JobHandle {
    job_id: JobId,
    cancelled: Arc<AtomicBool>,
}

impl JobHandle {
    pub fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl IngestJobContext for JobHandle {
    fn job_id(&self) -> JobId {
        self.job_id
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// A file on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsIngestFile {
    id: FileId,
    path: PathBuf,
    name: String,
    extension: String,
    kind: FileKind,
    known_status: KnownStatus,
}

impl FsIngestFile {
    /// Describe the file at `path`. Anything that is not a regular file is
    /// reported as [`FileKind::Directory`] or [`FileKind::Virtual`].
    pub fn new(id: FileId, path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let kind = match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => FileKind::Regular,
            Ok(meta) if meta.is_dir() => FileKind::Directory,
            _ => FileKind::Virtual,
        };

        Self {
            id,
            path,
            name,
            extension,
            kind,
            known_status: KnownStatus::Unknown,
        }
    }

    pub fn with_known_status(mut self, status: KnownStatus) -> Self {
        self.known_status = status;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl IngestFile for FsIngestFile {
    fn id(&self) -> FileId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn kind(&self) -> FileKind {
        self.kind
    }

    fn known_status(&self) -> KnownStatus {
        self.known_status
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(std::fs::File::open(&self.path)?))
    }
}
