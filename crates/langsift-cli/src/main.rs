//! langsift command-line ingest host.
//!
//! Walks the given paths, runs one ingest job over every file found with a pool
//! of worker threads, and writes one JSON line per classified document.

use anyhow::{Context, Result, bail};
use clap::Parser;
use langsift::LangsiftConfig;
use langsift::factory::{LanguageDetectorFactory, MODULE_NAME};
use langsift::ingest::{FileIngestModule, FsIngestFile, IngestJobContext, IngestModuleFactory, JobHandle, KnownStatus};
use langsift::jobs::JobSummary;
use langsift::sinks::{JsonLinesSink, NotificationSink};
use langsift::types::{FileOutcome, JobId};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "langsift")]
#[command(version, about = "Detect the natural language of Office and PDF documents", long_about = None)]
struct Cli {
    /// Files or directories to ingest
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Number of worker threads (defaults to the number of CPUs)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Identifier of the ingest job
    #[arg(short, long, default_value = "1")]
    job_id: JobId,

    /// Configuration file (.toml, .yaml, .yml or .json). Defaults to a discovered langsift.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write JSON lines here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// File of SHA-256 hex digests (one per line) marking files as known
    #[arg(short = 'k', long)]
    known_hashes: Option<PathBuf>,
}

/// Prints the job summary to stderr and logs it.
struct ConsoleNotifier;

impl NotificationSink for ConsoleNotifier {
    fn post_summary(&self, summary: &JobSummary) {
        tracing::info!(job_id = summary.job_id, "{}", summary.subject());
        eprintln!("{}", summary);
    }

    fn post_info(&self, subject: &str, details: &str) {
        tracing::info!(subject, "{}", details);
        eprintln!("{}", details);
    }
}

#[derive(Default)]
struct RunStats {
    classified: AtomicUsize,
    skipped: AtomicUsize,
    cancelled: AtomicUsize,
    failed: AtomicUsize,
}

impl RunStats {
    fn record(&self, outcome: &langsift::Result<FileOutcome>) {
        let counter = match outcome {
            Ok(FileOutcome::Classified(_)) => &self.classified,
            Ok(FileOutcome::Skipped(_)) => &self.skipped,
            Ok(FileOutcome::Cancelled) => &self.cancelled,
            Err(_) => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<LangsiftConfig> {
    let config = match path {
        Some(path) => LangsiftConfig::from_file(path).with_context(|| format!("loading {}", path.display()))?,
        None => LangsiftConfig::discover()?.unwrap_or_default(),
    };
    config.validate()?;
    Ok(config)
}

fn load_known_hashes(path: &Path) -> Result<HashSet<String>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut hashes = HashSet::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let digest = line.trim();
        if digest.is_empty() || digest.starts_with('#') {
            continue;
        }
        hashes.insert(digest.to_ascii_lowercase());
    }
    Ok(hashes)
}

fn sha256_hex(path: &Path) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut file = File::open(path)?;
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}

fn collect_files(paths: &[PathBuf], known: &HashSet<String>) -> Vec<FsIngestFile> {
    let mut files = Vec::new();
    for root in paths {
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping unreadable path");
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let id = files.len() as u64 + 1;
            let mut file = FsIngestFile::new(id, entry.path());
            if !known.is_empty() && entry.file_type().is_file() {
                match sha256_hex(entry.path()) {
                    Ok(digest) if known.contains(&digest) => file = file.with_known_status(KnownStatus::Known),
                    Ok(_) => {}
                    Err(e) => tracing::warn!(path = %entry.path().display(), error = %e, "Could not hash file"),
                }
            }
            files.push(file);
        }
    }
    files
}

fn start_workers(
    factory: &LanguageDetectorFactory,
    job: &JobHandle,
    count: usize,
) -> langsift::Result<Vec<Box<dyn FileIngestModule>>> {
    let mut workers: Vec<Box<dyn FileIngestModule>> = Vec::with_capacity(count);
    for _ in 0..count {
        let mut worker = factory.create_file_module();
        if let Err(e) = worker.start_up(Arc::new(job.clone())) {
            for started in &mut workers {
                let _ = started.shut_down();
            }
            return Err(e);
        }
        workers.push(worker);
    }
    Ok(workers)
}

fn run_job(workers: Vec<Box<dyn FileIngestModule>>, files: &[FsIngestFile], stats: &RunStats) {
    let next = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for mut worker in workers {
            let next = &next;
            scope.spawn(move || {
                loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(file) = files.get(index) else {
                        break;
                    };
                    let outcome = worker.process(file);
                    if let Ok(FileOutcome::Classified(record)) = &outcome {
                        tracing::info!(file = %file.path().display(), language = %record.language_name, "Classified");
                    }
                    stats.record(&outcome);
                }
                if let Err(e) = worker.shut_down() {
                    tracing::error!(error = %e, "Worker shutdown failed");
                }
            });
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = load_config(cli.config.as_deref())?;
    let known = match &cli.known_hashes {
        Some(path) => load_known_hashes(path)?,
        None => HashSet::new(),
    };

    let writer: Box<dyn Write + Send> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout()),
    };
    let sink = Arc::new(JsonLinesSink::new(MODULE_NAME, writer));

    let factory = LanguageDetectorFactory::builder(config, sink.clone())
        .notifier(Arc::new(ConsoleNotifier))
        .build()?;

    let files = collect_files(&cli.paths, &known);
    if files.is_empty() {
        bail!("no files found under the given paths");
    }

    let job = JobHandle::new(cli.job_id);
    let signal_job = job.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(job_id = signal_job.job_id(), "Interrupt received, cancelling job");
            signal_job.cancel();
        }
    });

    let threads = cli.threads.unwrap_or_else(num_cpus::get).clamp(1, files.len());
    let workers = start_workers(&factory, &job, threads).context("worker start-up failed")?;
    tracing::info!(job_id = cli.job_id, files = files.len(), threads, "Starting ingest job");

    let stats = RunStats::default();
    tokio::task::block_in_place(|| run_job(workers, &files, &stats));
    sink.flush()?;

    tracing::info!(
        classified = stats.classified.load(Ordering::Relaxed),
        skipped = stats.skipped.load(Ordering::Relaxed),
        cancelled = stats.cancelled.load(Ordering::Relaxed),
        failed = stats.failed.load(Ordering::Relaxed),
        "Ingest job complete"
    );
    Ok(())
}
