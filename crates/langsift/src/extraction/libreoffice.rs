//! LibreOffice conversion of legacy Office formats.
//!
//! `.doc` and `.ppt` are binary formats with no native text parser in the
//! extraction stack, so they are converted to `.docx` / `.pptx` with
//! `soffice --headless --convert-to` and then extracted like modern files.
//!
//! # System Requirement
//!
//! LibreOffice must be installed and `soffice` must be in PATH:
//! - **macOS**: `brew install --cask libreoffice`
//! - **Linux**: `apt install libreoffice` or `dnf install libreoffice`
//! - **Windows**: `winget install LibreOffice.LibreOffice`
//!
//! Workers are plain OS threads, so [`convert_blocking`] drives the async
//! conversion on a shared Tokio runtime.

use crate::error::{LangsiftError, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::env;
use std::fs as std_fs;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

/// Shared runtime for conversion subprocesses.
///
/// The `.expect()` here is justified: runtime creation only fails on resource
/// exhaustion, and every conversion would fail anyway.
static CONVERSION_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("langsift-soffice")
        .enable_all()
        .build()
        .expect("Failed to create LibreOffice conversion runtime - system may be out of resources")
});

/// Legacy formats this module can convert, with their modern target.
pub fn conversion_target(extension: &str) -> Option<&'static str> {
    match extension.to_ascii_lowercase().as_str() {
        "doc" => Some("docx"),
        "ppt" => Some("pptx"),
        _ => None,
    }
}

/// RAII guard for automatic temporary directory cleanup
struct TempDir {
    path: PathBuf,
}

impl TempDir {
    async fn new(path: PathBuf) -> Result<Self> {
        fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std_fs::remove_dir_all(&self.path);
    }
}

fn libreoffice_install_message() -> String {
    "LibreOffice (soffice/libreoffice) is required for legacy MS Office format support (.doc, .ppt). \
Install: macOS: 'brew install --cask libreoffice', \
Linux: 'apt install libreoffice', \
Windows: 'winget install LibreOffice.LibreOffice'. \
If LibreOffice is installed in a custom location, set the LANGSIFT_LIBREOFFICE_PATH environment variable to the soffice executable."
        .to_string()
}

fn soffice_candidates() -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for var in ["LANGSIFT_LIBREOFFICE_PATH", "SOFFICE_PATH", "LIBREOFFICE_PATH"] {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if cfg!(target_os = "macos") {
        push_candidate(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
    }

    if cfg!(target_os = "windows") {
        push_candidate(PathBuf::from("C:\\Program Files\\LibreOffice\\program\\soffice.exe"));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("soffice"));
            push_candidate(dir.join("libreoffice"));
            push_candidate(dir.join("soffice.exe"));
        }
    }

    candidates
}

fn locate_soffice_binary() -> Result<PathBuf> {
    for candidate in soffice_candidates() {
        if let Ok(metadata) = std_fs::metadata(&candidate)
            && metadata.is_file()
        {
            return Ok(candidate);
        }
    }

    Err(LangsiftError::MissingDependency(libreoffice_install_message()))
}

/// Convert an Office document to `target_format` using LibreOffice.
///
/// The child process is killed when `timeout_secs` elapses.
pub async fn convert_office_doc(
    input_path: &Path,
    output_dir: &Path,
    target_format: &str,
    timeout_secs: u64,
) -> Result<Vec<u8>> {
    let soffice_path = locate_soffice_binary()?;

    fs::create_dir_all(output_dir).await?;

    let child = Command::new(&soffice_path)
        .arg("--headless")
        .arg("--convert-to")
        .arg(target_format)
        .arg("--outdir")
        .arg(output_dir)
        .arg(input_path)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            LangsiftError::parsing(format!(
                "Failed to execute LibreOffice at '{}': {}",
                soffice_path.display(),
                e
            ))
        })?;

    let child_id = child.id();

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            return Err(LangsiftError::parsing(format!("Failed to wait for LibreOffice: {}", e)));
        }
        Err(_) => {
            return Err(LangsiftError::parsing(format!(
                "LibreOffice conversion timed out after {} seconds (PID: {:?})",
                timeout_secs, child_id
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);

        // Subprocess error analysis - wrap only if format/parsing error detected ~keep
        let combined = format!("{} {}", stderr, stdout).to_lowercase();
        if ["format", "unsupported", "error:", "failed"]
            .iter()
            .any(|keyword| combined.contains(keyword))
        {
            return Err(LangsiftError::parsing(format!(
                "LibreOffice conversion failed: {}",
                if !stderr.is_empty() { &stderr } else { &stdout }
            )));
        }

        // True system error - bubble up for user reporting ~keep
        return Err(LangsiftError::Io(std::io::Error::other(format!(
            "LibreOffice process failed with return code {}: {}",
            output.status.code().unwrap_or(-1),
            if !stderr.is_empty() { stderr } else { stdout }
        ))));
    }

    let input_stem = input_path
        .file_stem()
        .ok_or_else(|| LangsiftError::parsing("Invalid input file name"))?;

    let expected_output = output_dir.join(format!("{}.{}", input_stem.to_string_lossy(), target_format));

    let converted_bytes = fs::read(&expected_output).await.map_err(|e| {
        LangsiftError::parsing(format!(
            "LibreOffice conversion completed but output file not found: {}",
            e
        ))
    })?;

    if converted_bytes.is_empty() {
        return Err(LangsiftError::parsing("LibreOffice conversion produced empty file"));
    }

    Ok(converted_bytes)
}

/// Convert legacy `bytes` (a `.doc` or `.ppt`) to its modern equivalent.
///
/// Returns the converted bytes and the new extension.
pub async fn convert_legacy(bytes: &[u8], extension: &str, timeout_secs: u64) -> Result<(Vec<u8>, &'static str)> {
    let target = conversion_target(extension)
        .ok_or_else(|| LangsiftError::UnsupportedFormat(format!("No LibreOffice conversion for '{}'", extension)))?;

    let unique_id = uuid::Uuid::new_v4();
    let temp_dir = env::temp_dir();
    let input_dir_path = temp_dir.join(format!("langsift_{}_{}", extension, unique_id));
    let output_dir_path = temp_dir.join(format!("langsift_{}_{}_out", extension, unique_id));

    // RAII guards ensure cleanup on all paths including panic ~keep
    let _input_guard = TempDir::new(input_dir_path.clone()).await?;
    let _output_guard = TempDir::new(output_dir_path.clone()).await?;

    let input_path = input_dir_path.join(format!("input.{}", extension.to_ascii_lowercase()));
    fs::write(&input_path, bytes).await?;

    let converted = convert_office_doc(&input_path, &output_dir_path, target, timeout_secs).await?;
    tracing::debug!(from = extension, to = target, bytes = converted.len(), "LibreOffice conversion finished");

    Ok((converted, target))
}

/// Blocking form of [`convert_legacy`] for worker threads.
pub fn convert_blocking(bytes: &[u8], extension: &str, timeout_secs: u64) -> Result<(Vec<u8>, &'static str)> {
    CONVERSION_RUNTIME.block_on(convert_legacy(bytes, extension, timeout_secs))
}
