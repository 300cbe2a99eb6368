//! The build pipeline.
//!
//! Ties the stages together in one pass over a source and an output
//! directory:
//!
//! ```text
//! photos.json ─→ existing ─┐
//! source/ ──→ index ───────┴─→ reconcile ─→ remove stale ─→ process ─→ metadata copy
//!                                   │                          │
//!                                   └──── final list ←── apply outcomes
//!                                              │
//!                                              ├─→ index.html + assets + includes
//!                                              └─→ photos.json
//! ```
//!
//! Fatal: anything that would leave the gallery inconsistent with
//! `photos.json` (unreadable source tree or state, directory creation, stale
//! file removal, page generation, saving state). Not fatal: per-photo
//! transform failures and metadata copy failures, which are reported and
//! picked up again on the next build.

use crate::config::{GalleryConfig, effective_threads};
use crate::generate::{self, GenerateError};
use crate::imaging::{ExifTool, ImageBackend};
use crate::naming;
use crate::process::{self, ProcessEvent, ProcessReport};
use crate::reconcile::{self, Mode, ReconcileError, Reconciliation};
use crate::scan::{self, ScanError};
use crate::state::{self, StateError};
use crate::types::{PhotoRecord, VariantKind};
use chrono::Local;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

pub use crate::types::OutputLayout;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("Failed to create {path}: {source}")]
    CreateDir { path: PathBuf, source: io::Error },
    #[error("Failed to remove {path}: {source}")]
    RemoveStale { path: PathBuf, source: io::Error },
}

/// What a build did.
#[derive(Debug)]
pub struct BuildReport {
    /// Source files indexed, duplicates included.
    pub scanned: usize,
    /// Photos in the published gallery.
    pub photos: usize,
    pub added: usize,
    pub repaired: usize,
    pub removed: usize,
    pub process: ProcessReport,
    /// The `exiftool` used for metadata copy, or `None` if skipped.
    pub exiftool: Option<PathBuf>,
    pub metadata_warnings: Vec<String>,
}

/// Create every output directory.
pub fn create_dirs(layout: &OutputLayout) -> Result<(), BuildError> {
    for path in layout.dirs() {
        std::fs::create_dir_all(&path).map_err(|source| BuildError::CreateDir { path, source })?;
    }
    Ok(())
}

/// Delete the variant files of photos leaving the gallery.
///
/// Paths come from each record's stable id, never from the persisted variant
/// paths. Records without an id derived from their hash own no files and are
/// skipped, as are files that are already gone.
pub fn remove_stale(layout: &OutputLayout, to_remove: &[PhotoRecord]) -> Result<(), BuildError> {
    for photo in to_remove {
        if naming::id_prefix_of(&photo.stable_id, &photo.content_hash).is_none() {
            continue;
        }
        for kind in VariantKind::ALL {
            let path = layout.variant_path(kind, &photo.stable_id);
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(source) => return Err(BuildError::RemoveStale { path, source }),
            }
        }
    }
    Ok(())
}

/// Copy produced variant descriptors into the final list, matched by hash.
pub fn apply_outcomes(photos: &mut [PhotoRecord], report: &ProcessReport) {
    let by_hash: HashMap<&str, _> = report
        .outcomes
        .iter()
        .map(|o| (o.content_hash.as_str(), o))
        .collect();
    for photo in photos.iter_mut() {
        if let Some(outcome) = by_hash.get(photo.content_hash.as_str()) {
            outcome.apply_to(photo);
        }
    }
}

/// Copy source metadata onto every original written by this build.
fn copy_metadata(
    tool: &ExifTool,
    layout: &OutputLayout,
    processed: &[PhotoRecord],
    report: &ProcessReport,
) -> Vec<String> {
    let written: HashSet<&str> = report
        .outcomes
        .iter()
        .filter(|o| o.variants.iter().any(|(kind, _)| *kind == VariantKind::Original))
        .map(|o| o.content_hash.as_str())
        .collect();

    processed
        .iter()
        .filter(|p| written.contains(p.content_hash.as_str()))
        .filter_map(|photo| {
            let dst = layout.variant_path(VariantKind::Original, &photo.stable_id);
            tool.copy_metadata(photo.source(), &dst)
                .err()
                .map(|e| format!("{}: {}", photo.filename(), e))
        })
        .collect()
}

fn scan_and_reconcile(
    config: &GalleryConfig,
    source: &Path,
    layout: &OutputLayout,
    backend: &impl ImageBackend,
) -> Result<(usize, Reconciliation), BuildError> {
    let existing = state::load_state(layout.root())?;
    let scanned = scan::index(source, backend, effective_threads(&config.processing))?;
    let count = scanned.len();
    let reconciliation =
        reconcile::reconcile(scanned, &existing, Mode::from_append_flag(config.append))?;
    Ok((count, reconciliation))
}

/// Index and reconcile without writing anything.
pub fn check(
    config: &GalleryConfig,
    source: &Path,
    layout: &OutputLayout,
    backend: &impl ImageBackend,
) -> Result<Reconciliation, BuildError> {
    scan_and_reconcile(config, source, layout, backend).map(|(_, r)| r)
}

/// Build or update the gallery in `layout` from the photos under `source`.
pub fn build(
    config: &GalleryConfig,
    source: &Path,
    layout: &OutputLayout,
    backend: &impl ImageBackend,
    events: Option<Sender<ProcessEvent>>,
) -> Result<BuildReport, BuildError> {
    let (scanned, reconciliation) = scan_and_reconcile(config, source, layout, backend)?;

    create_dirs(layout)?;
    remove_stale(layout, &reconciliation.to_remove)?;

    let to_process = reconciliation.to_process();
    let report = process::process(
        &to_process,
        layout,
        &config.transform_settings(),
        effective_threads(&config.processing),
        backend,
        events,
    );

    let Reconciliation {
        mut photos,
        to_add,
        to_repair,
        to_remove,
        tags,
    } = reconciliation;
    apply_outcomes(&mut photos, &report);

    let exiftool = ExifTool::locate(config.metadata.exiftool.as_deref());
    let metadata_warnings = match &exiftool {
        Some(tool) => copy_metadata(tool, layout, &to_process, &report),
        None => Vec::new(),
    };

    generate::write_site(layout, config, &photos, &tags, Local::now())?;
    state::save_state(layout.root(), &photos)?;

    Ok(BuildReport {
        scanned,
        photos: photos.len(),
        added: to_add.len(),
        repaired: to_repair.len(),
        removed: to_remove.len(),
        process: report,
        exiftool: exiftool.map(|t| t.program().to_path_buf()),
        metadata_warnings,
    })
}
