//! CLI output formatting for the build pipeline.
//!
//! Every photo is shown by its positional index and caption, with its source
//! file and stable id as indented context, so the output reads as a content
//! inventory while still tracing back to files.
//!
//! # Output Format
//!
//! ## Check
//!
//! ```text
//! Gallery (3 photos)
//!     001 IMG_0042.jpg: Saturday, May 4, 2019 at 3:04pm
//!         Source: /home/me/photos/IMG_0042.jpg
//!         Id: photo-3c
//!         Tags: sea, boats
//!     ...
//!
//! Add (1)
//!     photo-3c IMG_0042.jpg
//! Remove (1)
//!     photo-9 old.jpg
//! ```
//!
//! ## Process
//!
//! ```text
//! Processing 12 photos
//!     001/012 IMG_0042.jpg
//!     002/012 IMG_0043.jpg
//! warning: IMG_0043.jpg: Invalid EXIF orientation 9, keeping pixels as stored
//! Processed 12 photos (0 failed)
//! ```
//!
//! ## Build summary
//!
//! ```text
//! Gallery: 12 photos → album/
//!     Added: 1
//!     Repaired: 0
//!     Removed: 0
//!     Metadata: exiftool /usr/bin/exiftool
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes it out. Format functions
//! are pure: no I/O, no side effects. Warnings and failures go to stderr.

use crate::pipeline::BuildReport;
use crate::process::ProcessEvent;
use crate::reconcile::Reconciliation;
use crate::types::PhotoRecord;
use std::path::Path;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Caption when there is one, filename otherwise.
fn display_title(photo: &PhotoRecord) -> String {
    if photo.caption.is_empty() {
        photo.filename()
    } else {
        photo.caption.clone()
    }
}

/// `photo-3c IMG_0042.jpg`
fn id_line(photo: &PhotoRecord) -> String {
    format!("    {} {}", photo.stable_id, photo.filename())
}

fn section(lines: &mut Vec<String>, title: &str, photos: &[PhotoRecord]) {
    if photos.is_empty() {
        return;
    }
    lines.push(format!("{} ({})", title, photos.len()));
    lines.extend(photos.iter().map(id_line));
}

// ============================================================================
// Check: reconciliation plan
// ============================================================================

/// Format the reconciled gallery and what a build would change.
pub fn format_reconcile_output(reconciliation: &Reconciliation) -> Vec<String> {
    let mut lines = vec![format!("Gallery ({} photos)", reconciliation.photos.len())];

    for (i, photo) in reconciliation.photos.iter().enumerate() {
        lines.push(format!("    {} {}", format_index(i + 1), display_title(photo)));
        lines.push(format!("        Source: {}", photo.source().display()));
        lines.push(format!("        Id: {}", photo.stable_id));
        if !photo.tags.is_empty() {
            lines.push(format!("        Tags: {}", photo.tags.join(", ")));
        }
    }

    let changes = [
        ("Add", &reconciliation.to_add),
        ("Repair", &reconciliation.to_repair),
        ("Remove", &reconciliation.to_remove),
    ];
    if changes.iter().all(|(_, photos)| photos.is_empty()) {
        lines.push(String::new());
        lines.push("Up to date".to_string());
        return lines;
    }

    lines.push(String::new());
    for (title, photos) in changes {
        section(&mut lines, title, photos);
    }
    lines
}

pub fn print_reconcile_output(reconciliation: &Reconciliation) {
    for line in format_reconcile_output(reconciliation) {
        println!("{}", line);
    }
}

// ============================================================================
// Process: progress events
// ============================================================================

/// Format a single process event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Started { total: 0 } => vec!["Nothing to process".to_string()],
        ProcessEvent::Started { total } => vec![format!("Processing {} photos", total)],
        ProcessEvent::Progress {
            index,
            total,
            filename,
        } => vec![format!(
            "    {}/{} {}",
            format_index(*index),
            format_index(*total),
            filename
        )],
        ProcessEvent::Warning { filename, message } => {
            vec![format!("warning: {}: {}", filename, message)]
        }
        ProcessEvent::Failed { filename, message } => {
            vec![format!("failed: {}: {}", filename, message)]
        }
        ProcessEvent::Done { processed, failed } => {
            vec![format!("Processed {} photos ({} failed)", processed, failed)]
        }
    }
}

fn is_problem(event: &ProcessEvent) -> bool {
    matches!(
        event,
        ProcessEvent::Warning { .. } | ProcessEvent::Failed { .. }
    )
}

/// Print a process event: problems to stderr, progress to stdout.
pub fn print_process_event(event: &ProcessEvent) {
    for line in format_process_event(event) {
        if is_problem(event) {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

// ============================================================================
// Build summary
// ============================================================================

/// Format the end-of-build summary.
pub fn format_build_summary(report: &BuildReport, output_root: &Path) -> Vec<String> {
    let mut lines = vec![format!(
        "Gallery: {} photos \u{2192} {}",
        report.photos,
        output_root.display()
    )];
    lines.push(format!("    Added: {}", report.added));
    lines.push(format!("    Repaired: {}", report.repaired));
    lines.push(format!("    Removed: {}", report.removed));

    if !report.process.failures.is_empty() {
        lines.push(format!("    Failed: {}", report.process.failures.len()));
        for failure in &report.process.failures {
            lines.push(format!("        {}", failure));
        }
    }

    match &report.exiftool {
        Some(program) => {
            lines.push(format!("    Metadata: exiftool {}", program.display()));
            for warning in &report.metadata_warnings {
                lines.push(format!("        {}", warning));
            }
        }
        None => lines.push("    Metadata: skipped (exiftool not found)".to_string()),
    }

    lines
}

pub fn print_build_summary(report: &BuildReport, output_root: &Path) {
    for line in format_build_summary(report, output_root) {
        println!("{}", line);
    }
}
