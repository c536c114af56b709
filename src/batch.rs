//! Batch recompression of files on disk.
//!
//! Expands the command-line inputs into a list of files, runs each one through
//! a [`Compressor`] on the rayon pool and writes the results into an output
//! directory. A file that fails to decode or encode is reported and skipped;
//! nothing is written for it and the rest of the batch carries on.
//!
//! ## Output Layout
//!
//! ```text
//! compress uploads/ extra/logo.png --out-dir out/
//!
//! uploads/                    out/
//! ├── avatars/                ├── avatars/
//! │   └── 7.jpg       ──→     │   └── 7.jpg
//! └── covers/                 ├── covers/
//!     └── 12.png      ──→     │   └── 12.png
//! extra/logo.png      ──→     └── logo.png
//! ```
//!
//! Directories keep their structure below the given root; plain files land
//! directly in the output directory under their own name. Two inputs that
//! would land on the same output path are rejected before anything runs.
//!
//! ## Progress
//!
//! Callers may pass an `mpsc::Sender<BatchEvent>`; one event is sent when the
//! batch starts and one per file as it finishes (in completion order). The
//! final [`BatchReport`] is sorted by source path.

use crate::imaging::{Compressor, ImagingError, TargetFormat};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input not found: {0}")]
    InputNotFound(PathBuf),
    #[error("{first} and {second} would both be written to {relative}")]
    DuplicateOutput {
        relative: String,
        first: String,
        second: String,
    },
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

/// A file to compress and where it goes, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub source: PathBuf,
    pub relative: PathBuf,
}

/// Expand `paths` into compressible files.
///
/// Directories are walked recursively and filtered to extensions the
/// compressor can write. Plain files are taken as given, whatever their
/// extension; a small file passes through regardless of format.
pub fn collect_inputs(paths: &[PathBuf]) -> Result<Vec<BatchInput>, BatchError> {
    let mut inputs = Vec::new();
    for path in paths {
        if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry?;
                if !entry.file_type().is_file() || !is_compressible(entry.path()) {
                    continue;
                }
                let relative = entry
                    .path()
                    .strip_prefix(path)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| PathBuf::from(entry.file_name()));
                inputs.push(BatchInput {
                    source: entry.path().to_path_buf(),
                    relative,
                });
            }
        } else if path.is_file() {
            let relative = path
                .file_name()
                .map(PathBuf::from)
                .ok_or_else(|| BatchError::InputNotFound(path.clone()))?;
            inputs.push(BatchInput {
                source: path.clone(),
                relative,
            });
        } else {
            return Err(BatchError::InputNotFound(path.clone()));
        }
    }
    ensure_unique_outputs(&inputs)?;
    debug!(count = inputs.len(), "collected batch inputs");
    Ok(inputs)
}

/// Reject inputs that map to the same output path; one would overwrite the other.
fn ensure_unique_outputs(inputs: &[BatchInput]) -> Result<(), BatchError> {
    let mut seen: HashMap<&Path, &Path> = HashMap::with_capacity(inputs.len());
    for input in inputs {
        if let Some(first) = seen.insert(input.relative.as_path(), input.source.as_path()) {
            return Err(BatchError::DuplicateOutput {
                relative: input.relative.display().to_string(),
                first: first.display().to_string(),
                second: input.source.display().to_string(),
            });
        }
    }
    Ok(())
}

fn is_compressible(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| TargetFormat::from_extension(e).is_ok())
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_string()
}

// ============================================================================
// Results
// ============================================================================

/// What happened to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum EntryStatus {
    /// Already within budget; copied unchanged.
    Passthrough,
    /// Decoded and re-encoded.
    Compressed {
        bytes: usize,
        /// JPEG quality used, if any.
        quality: Option<u8>,
        width: u32,
        height: u32,
        resized: bool,
        within_budget: bool,
    },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub source: PathBuf,
    /// Written file; `None` when the file failed.
    pub output: Option<PathBuf>,
    pub original_bytes: usize,
    #[serde(flatten)]
    pub status: EntryStatus,
}

impl BatchEntry {
    /// Size of the written file, if one was written.
    pub fn output_bytes(&self) -> Option<usize> {
        match &self.status {
            EntryStatus::Passthrough => Some(self.original_bytes),
            EntryStatus::Compressed { bytes, .. } => Some(*bytes),
            EntryStatus::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, EntryStatus::Failed { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchTotals {
    pub files: usize,
    pub passthrough: usize,
    pub compressed: usize,
    pub failed: usize,
    /// Compressed files still larger than the budget.
    pub over_budget: usize,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub budget: usize,
    pub strategy: &'static str,
    pub entries: Vec<BatchEntry>,
    pub totals: BatchTotals,
}

impl BatchReport {
    fn new(budget: usize, strategy: &'static str, mut entries: Vec<BatchEntry>) -> Self {
        entries.sort_by(|a, b| a.source.cmp(&b.source));
        let mut totals = BatchTotals {
            files: entries.len(),
            ..Default::default()
        };
        for entry in &entries {
            totals.bytes_in += entry.original_bytes;
            match &entry.status {
                EntryStatus::Passthrough => totals.passthrough += 1,
                EntryStatus::Compressed { within_budget, .. } => {
                    totals.compressed += 1;
                    if !within_budget {
                        totals.over_budget += 1;
                    }
                }
                EntryStatus::Failed { .. } => totals.failed += 1,
            }
            totals.bytes_out += entry.output_bytes().unwrap_or(0);
        }
        Self {
            budget,
            strategy,
            entries,
            totals,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.totals.failed > 0
    }
}

/// Progress events streamed while a batch runs.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Started { total: usize, budget: usize },
    /// `index` is the 1-based position of the file among the inputs.
    FileFinished { index: usize, entry: BatchEntry },
}

// ============================================================================
// Processing
// ============================================================================

/// Compress every input into `out_dir` in parallel.
///
/// Only setup failures (colliding output paths, creating `out_dir`) are
/// returned as errors; per-file failures are recorded in the report.
pub fn compress_files(
    inputs: &[BatchInput],
    out_dir: &Path,
    compressor: &Compressor,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchReport, BatchError> {
    ensure_unique_outputs(inputs)?;
    fs::create_dir_all(out_dir)?;

    if let Some(tx) = &events {
        tx.send(BatchEvent::Started {
            total: inputs.len(),
            budget: compressor.budget(),
        })
        .ok();
    }

    let entries: Vec<BatchEntry> = inputs
        .par_iter()
        .enumerate()
        .map_with(events, |tx, (i, input)| {
            let entry = compress_one(input, out_dir, compressor);
            if let Some(tx) = tx {
                tx.send(BatchEvent::FileFinished {
                    index: i + 1,
                    entry: entry.clone(),
                })
                .ok();
            }
            entry
        })
        .collect();

    Ok(BatchReport::new(
        compressor.budget(),
        compressor.policy_name(),
        entries,
    ))
}

fn compress_one(input: &BatchInput, out_dir: &Path, compressor: &Compressor) -> BatchEntry {
    let original_bytes = fs::metadata(&input.source)
        .map(|m| m.len() as usize)
        .unwrap_or(0);
    match try_compress_one(input, out_dir, compressor) {
        Ok((output, status)) => BatchEntry {
            source: input.source.clone(),
            output: Some(output),
            original_bytes,
            status,
        },
        Err(e) => {
            warn!(source = %input.source.display(), error = %e, "compression failed");
            BatchEntry {
                source: input.source.clone(),
                output: None,
                original_bytes,
                status: EntryStatus::Failed {
                    error: e.to_string(),
                },
            }
        }
    }
}

fn try_compress_one(
    input: &BatchInput,
    out_dir: &Path,
    compressor: &Compressor,
) -> Result<(PathBuf, EntryStatus), BatchError> {
    let data = fs::read(&input.source)?;
    let outcome = compressor.compress_detailed(&data, &extension_of(&input.source))?;

    let output = out_dir.join(&input.relative);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, &outcome.data)?;

    let status = if outcome.passthrough {
        EntryStatus::Passthrough
    } else {
        let (width, height) = outcome.dimensions.unwrap_or_default();
        EntryStatus::Compressed {
            bytes: outcome.data.len(),
            quality: outcome.quality.map(|q| q.value()),
            width,
            height,
            resized: outcome.resized,
            within_budget: outcome.within(compressor.budget()),
        }
    };
    Ok((output, status))
}
