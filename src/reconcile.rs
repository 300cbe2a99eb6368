//! Reconciliation of a fresh scan against the persisted gallery.
//!
//! Stage 2 of the build pipeline. The scan stage produces one record per
//! source file; `photos.json` holds the gallery as it was published last time.
//! This module aligns the two so that repeated builds are incremental:
//!
//! ```text
//! scanned ──┐
//!           ├── reconcile(mode) ──→ photos     (final ordered gallery)
//! existing ─┘                  ├──→ to_add     (new content, needs transforming)
//!                              ├──→ to_repair  (known content with missing variants)
//!                              └──→ to_remove  (stale content, files to delete)
//! ```
//!
//! Every set operation compares **content hashes**, never paths: renaming or
//! moving a photo on disk does not make it new, and two byte-identical files
//! are one photo.
//!
//! ## Modes
//!
//! - [`Mode::Append`]: the gallery only grows. Previously published photos
//!   stay even when their source file is gone.
//! - [`Mode::Replace`]: the gallery mirrors the scanned directory. Photos
//!   whose content no longer appears are scheduled for removal.
//!
//! In both modes, freshly scanned records inherit captions, authors, stable
//! ids and variant dimensions already known for the same content. Tags always
//! come from the scan.
//! The merge is fill-only ([`PhotoRecord::merge_fields`]).
//!
//! ## Ordering and naming
//!
//! The final list is stable-sorted by capture time. Tags then get sequential
//! class names (`tag-0`, `tag-1`, …) and photos get stable ids (see
//! [`crate::naming`]) in that order.

use crate::naming;
use crate::types::PhotoRecord;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Unable to assign a unique id to photo with content hash {hash}")]
    IdExhausted { hash: String },
}

/// Reconciliation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Only add photos; never remove previously published ones.
    Append,
    /// Mirror the scanned directory; remove photos no longer present.
    Replace,
}

impl Mode {
    pub fn from_append_flag(append: bool) -> Self {
        if append { Mode::Append } else { Mode::Replace }
    }
}

/// A tag and the CSS class name assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagClass {
    pub tag: String,
    pub class_name: String,
}

/// Outcome of reconciling a scan against the persisted gallery.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Final gallery, sorted by capture time, with ids, tags and captions.
    pub photos: Vec<PhotoRecord>,
    /// Photos whose content is new to the gallery. One record per hash.
    pub to_add: Vec<PhotoRecord>,
    /// Known photos still present on disk but missing a variant, typically
    /// because their transform failed on an earlier run.
    pub to_repair: Vec<PhotoRecord>,
    /// Previously published photos whose variant files must be deleted.
    pub to_remove: Vec<PhotoRecord>,
    /// Tag classes in encounter order.
    pub tags: Vec<TagClass>,
}

impl Reconciliation {
    /// Everything the transform stage has to process.
    pub fn to_process(&self) -> Vec<PhotoRecord> {
        self.to_add.iter().chain(&self.to_repair).cloned().collect()
    }
}

/// Records of `a` whose content hash appears nowhere in `b`.
pub fn subtract(a: &[PhotoRecord], b: &[PhotoRecord]) -> Vec<PhotoRecord> {
    let hashes: HashSet<&str> = b.iter().map(|p| p.content_hash.as_str()).collect();
    a.iter()
        .filter(|p| !hashes.contains(p.content_hash.as_str()))
        .cloned()
        .collect()
}

/// Keep the first record of every content hash, preserving input order.
pub fn dedupe(photos: Vec<PhotoRecord>) -> Vec<PhotoRecord> {
    let mut seen = HashSet::new();
    photos
        .into_iter()
        .filter(|p| seen.insert(p.content_hash.clone()))
        .collect()
}

/// `a` followed by `b`, deduplicated: on a shared hash, `a`'s record wins.
pub fn union(a: Vec<PhotoRecord>, b: Vec<PhotoRecord>) -> Vec<PhotoRecord> {
    dedupe(a.into_iter().chain(b).collect())
}

/// Fill unset fields of every `dst` record from the `src` records sharing
/// its content hash.
pub fn merge_all(dst: &mut [PhotoRecord], src: &[PhotoRecord]) {
    let mut by_hash: HashMap<&str, Vec<&PhotoRecord>> = HashMap::new();
    for photo in src {
        by_hash.entry(photo.content_hash.as_str()).or_default().push(photo);
    }
    for photo in dst.iter_mut() {
        if let Some(matches) = by_hash.get(photo.content_hash.as_str()) {
            for other in matches {
                photo.merge_fields(other);
            }
        }
    }
}

/// Assign sequential class names to tags in encounter order and fill every
/// record's `tag_names` (parallel to its `tags`).
pub fn assign_tags(photos: &mut [PhotoRecord]) -> Vec<TagClass> {
    let mut classes: Vec<TagClass> = Vec::new();
    let mut lookup: HashMap<String, String> = HashMap::new();

    for photo in photos.iter_mut() {
        photo.tag_names = photo
            .tags
            .iter()
            .map(|tag| {
                lookup
                    .entry(tag.clone())
                    .or_insert_with(|| {
                        let class_name = format!("tag-{}", classes.len());
                        classes.push(TagClass {
                            tag: tag.clone(),
                            class_name: class_name.clone(),
                        });
                        class_name
                    })
                    .clone()
            })
            .collect();
    }

    classes
}

/// Give every record a stable id, in list order.
///
/// Records sharing a content hash share an id. A record that already carries
/// an id from the persisted gallery keeps it as long as the id is a prefix of
/// its own hash and no other content claims it first, so published file names
/// never change. Every other record gets the shortest hash prefix not yet
/// used by any id.
///
/// Reserved persisted ids count as assigned before any new id is chosen, so
/// a new id is the shortest prefix unused by every id assigned so far.
pub fn assign_ids(photos: &mut [PhotoRecord]) -> Result<(), ReconcileError> {
    let mut ids: HashMap<String, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();

    for photo in photos.iter() {
        if let Some(suffix) = naming::id_prefix_of(&photo.stable_id, &photo.content_hash)
            && !ids.contains_key(&photo.content_hash)
            && !taken.contains(suffix)
        {
            taken.insert(suffix.to_string());
            ids.insert(photo.content_hash.clone(), photo.stable_id.clone());
        }
    }

    for photo in photos.iter_mut() {
        if let Some(id) = ids.get(&photo.content_hash) {
            photo.stable_id = id.clone();
            continue;
        }
        let prefix = naming::shortest_unique_prefix(&photo.content_hash, &taken)
            .ok_or_else(|| ReconcileError::IdExhausted {
                hash: photo.content_hash.clone(),
            })?
            .to_string();
        photo.stable_id = naming::photo_id(&prefix);
        ids.insert(photo.content_hash.clone(), photo.stable_id.clone());
        taken.insert(prefix);
    }

    Ok(())
}

/// Reconcile freshly scanned records against the persisted gallery.
pub fn reconcile(
    scanned: Vec<PhotoRecord>,
    existing: &[PhotoRecord],
    mode: Mode,
) -> Result<Reconciliation, ReconcileError> {
    let new_hashes: HashSet<String> = subtract(&scanned, existing)
        .into_iter()
        .map(|p| p.content_hash)
        .collect();
    let scanned_hashes: HashSet<String> = scanned.iter().map(|p| p.content_hash.clone()).collect();

    let mut scanned = scanned;
    merge_all(&mut scanned, existing);

    let (mut photos, to_remove) = match mode {
        Mode::Append => (union(scanned, existing.to_vec()), Vec::new()),
        Mode::Replace => {
            let photos = dedupe(scanned);
            let to_remove = dedupe(subtract(existing, &photos));
            (photos, to_remove)
        }
    };

    // sort_by_key is stable: equal timestamps keep encounter order
    photos.sort_by_key(|p| p.captured_at);

    let tags = assign_tags(&mut photos);
    assign_ids(&mut photos)?;
    for photo in &mut photos {
        photo.set_default_caption();
    }

    let to_add = photos
        .iter()
        .filter(|p| new_hashes.contains(&p.content_hash))
        .cloned()
        .collect();
    let to_repair = photos
        .iter()
        .filter(|p| {
            !new_hashes.contains(&p.content_hash)
                && scanned_hashes.contains(&p.content_hash)
                && !p.variants().all(|(_, v)| v.is_produced())
        })
        .cloned()
        .collect();

    Ok(Reconciliation {
        photos,
        to_add,
        to_repair,
        to_remove,
        tags,
    })
}
