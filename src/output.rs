//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. Each file is shown by
//! its positional index, name and what happened to it; the full source path
//! follows on an indented `Source:` line. Sizes are human readable.
//!
//! # Output Format
//!
//! ## Compress
//!
//! ```text
//! Compressing 3 files (budget 100.0 KiB)
//!     001 big.jpg: 412.3 KiB → 98.1 KiB (quality 60)
//!         Source: uploads/big.jpg
//!     002 broken.jpg: failed
//!         Source: uploads/broken.jpg
//!         Error: Failed to decode image: ...
//!     003 small.png: 64 B kept
//!         Source: uploads/small.png
//! 3 files: 1 compressed, 1 kept, 1 failed, 476.4 KiB → 98.2 KiB
//! ```
//!
//! ## Placeholder
//!
//! ```text
//! Placeholder "老王" 50×50 → avatar.png
//!     Font: /usr/share/fonts/wqy-microhei/wqy-microhei.ttc
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEntry, BatchEvent, BatchReport, EntryStatus};
use crate::imaging::{CanvasSize, FontSource};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Human-readable byte count: `512 B`, `1.5 KiB`, `2.0 MiB`.
pub fn format_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < MIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / MIB)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Compress output
// ============================================================================

/// Lines for one file result, indented under the batch header.
fn entry_lines(index: usize, entry: &BatchEntry) -> Vec<String> {
    let name = file_name(&entry.source);
    let header = match &entry.status {
        EntryStatus::Passthrough => {
            format!("{} kept", format_bytes(entry.original_bytes))
        }
        EntryStatus::Compressed {
            bytes,
            quality,
            width,
            height,
            resized,
            within_budget,
        } => {
            let mut line = format!(
                "{} → {}",
                format_bytes(entry.original_bytes),
                format_bytes(*bytes)
            );
            if let Some(q) = quality {
                line.push_str(&format!(" (quality {})", q));
            }
            if *resized {
                line.push_str(&format!(" (resized to {}×{})", width, height));
            }
            if !within_budget {
                line.push_str(" [over budget]");
            }
            line
        }
        EntryStatus::Failed { .. } => "failed".to_string(),
    };

    let mut lines = vec![
        format!("    {} {}: {}", format_index(index), name, header),
        format!("        Source: {}", entry.source.display()),
    ];
    if let EntryStatus::Failed { error } = &entry.status {
        lines.push(format!("        Error: {}", error));
    }
    lines
}

/// Format a progress event as it arrives from the batch.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Started { total, budget } => {
            let noun = if *total == 1 { "file" } else { "files" };
            vec![format!(
                "Compressing {} {} (budget {})",
                total,
                noun,
                format_bytes(*budget)
            )]
        }
        BatchEvent::FileFinished { index, entry } => entry_lines(*index, entry),
    }
}

/// One-line totals for a finished batch.
pub fn format_batch_summary(report: &BatchReport) -> Vec<String> {
    let t = &report.totals;
    let mut line = format!(
        "{} files: {} compressed, {} kept, {} failed, {} → {}",
        t.files,
        t.compressed,
        t.passthrough,
        t.failed,
        format_bytes(t.bytes_in),
        format_bytes(t.bytes_out)
    );
    if t.over_budget > 0 {
        line.push_str(&format!(" ({} over budget)", t.over_budget));
    }
    vec![line]
}

pub fn print_batch_summary(report: &BatchReport) {
    for line in format_batch_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Placeholder / fonts output
// ============================================================================

fn font_line(font: &FontSource) -> String {
    match font.path() {
        Some(path) => format!("Font: {}", path.display()),
        None => format!("Font: {} (ASCII only)", font),
    }
}

pub fn format_placeholder_output(
    label: &str,
    size: CanvasSize,
    output: &Path,
    font: &FontSource,
) -> Vec<String> {
    vec![
        format!(
            "Placeholder {:?} {}×{} → {}",
            label,
            size.width,
            size.height,
            output.display()
        ),
        format!("    {}", font_line(font)),
    ]
}

pub fn print_placeholder_output(label: &str, size: CanvasSize, output: &Path, font: &FontSource) {
    for line in format_placeholder_output(label, size, output, font) {
        println!("{}", line);
    }
}

/// Candidate list with availability marks, then the resolved font.
///
/// ```text
/// Candidates
///     [x] /usr/share/fonts/wqy-microhei/wqy-microhei.ttc
///     [ ] /usr/share/fonts/zihun/zihun-xingmouhei.ttf
/// Font: /usr/share/fonts/wqy-microhei/wqy-microhei.ttc
/// ```
pub fn format_fonts_output<P: AsRef<Path>>(candidates: &[P], font: &FontSource) -> Vec<String> {
    let mut lines = vec!["Candidates".to_string()];
    for candidate in candidates {
        let path = candidate.as_ref();
        let mark = if font.path() == Some(path) {
            "[x]"
        } else if path.is_file() {
            "[-]"
        } else {
            "[ ]"
        };
        lines.push(format!("    {} {}", mark, path.display()));
    }
    lines.push(font_line(font));
    lines
}

pub fn print_fonts_output<P: AsRef<Path>>(candidates: &[P], font: &FontSource) {
    for line in format_fonts_output(candidates, font) {
        println!("{}", line);
    }
}
