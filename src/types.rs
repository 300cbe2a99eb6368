//! Shared types used across all pipeline stages.
//!
//! [`PhotoRecord`] is created by the scan stage, enriched by reconciliation
//! and the transform stage, and finally serialized to `photos.json`. The same
//! file is read back as the "existing" gallery on the next run, so every
//! field defaults when absent: older and newer state files load silently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One of the three rendered raster forms of a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariantKind {
    Original,
    Slide,
    Thumb,
}

impl VariantKind {
    pub const ALL: [VariantKind; 3] = [VariantKind::Original, VariantKind::Slide, VariantKind::Thumb];

    /// Output subdirectory holding this variant.
    pub fn dir_name(self) -> &'static str {
        match self {
            VariantKind::Original => "originals",
            VariantKind::Slide => "slides",
            VariantKind::Thumb => "thumbs",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VariantKind::Original => "original",
            VariantKind::Slide => "slide",
            VariantKind::Thumb => "thumbnail",
        }
    }
}

/// A produced (or pending) variant file.
///
/// `width == 0` / `height == 0` means the variant has not been produced yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Variant {
    /// Path relative to the output root, e.g. `slides/photo-3f.jpg`.
    pub relative_path: String,
    pub width: u32,
    pub height: u32,
}

impl Variant {
    pub fn is_produced(&self) -> bool {
        self.width != 0 && self.height != 0
    }

    /// Fill-only merge: copy each field from `other` where ours is unset.
    fn fill_from(&mut self, other: &Variant) {
        fill_string(&mut self.relative_path, &other.relative_path);
        if self.width == 0 {
            self.width = other.width;
        }
        if self.height == 0 {
            self.height = other.height;
        }
    }
}

/// One photo of the gallery.
///
/// Identity across runs is `content_hash`; `source_path` only identifies the
/// file within a single scan and is kept for display and default captions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PhotoRecord {
    pub source_path: PathBuf,
    pub content_hash: String,
    pub captured_at: DateTime<Utc>,
    pub caption: String,
    pub author: String,
    pub tags: Vec<String>,
    pub tag_names: Vec<String>,
    pub stable_id: String,
    pub original: Variant,
    pub slide: Variant,
    pub thumb: Variant,
}

impl PhotoRecord {
    /// A freshly indexed record: identity and timestamp only.
    pub fn indexed(source_path: PathBuf, content_hash: String, captured_at: DateTime<Utc>) -> Self {
        Self {
            source_path,
            content_hash,
            captured_at,
            ..Self::default()
        }
    }

    /// Base name of the source file (`IMG_0042.jpg`).
    pub fn filename(&self) -> String {
        self.source_path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn source(&self) -> &Path {
        &self.source_path
    }

    pub fn variant(&self, kind: VariantKind) -> &Variant {
        match kind {
            VariantKind::Original => &self.original,
            VariantKind::Slide => &self.slide,
            VariantKind::Thumb => &self.thumb,
        }
    }

    pub fn variant_mut(&mut self, kind: VariantKind) -> &mut Variant {
        match kind {
            VariantKind::Original => &mut self.original,
            VariantKind::Slide => &mut self.slide,
            VariantKind::Thumb => &mut self.thumb,
        }
    }

    /// All three variants, in output order.
    pub fn variants(&self) -> impl Iterator<Item = (VariantKind, &Variant)> {
        VariantKind::ALL.into_iter().map(|kind| (kind, self.variant(kind)))
    }

    /// Copy fields from `other` only where ours hold the unset sentinel.
    ///
    /// Zero dimensions and empty strings count as unset. Tags are not merged:
    /// they always come from the source file's current keywords.
    /// A set value is never overwritten, so applying the merge twice is the
    /// same as applying it once.
    pub fn merge_fields(&mut self, other: &PhotoRecord) {
        for kind in VariantKind::ALL {
            self.variant_mut(kind).fill_from(other.variant(kind));
        }
        fill_string(&mut self.caption, &other.caption);
        fill_string(&mut self.author, &other.author);
        fill_string(&mut self.stable_id, &other.stable_id);
    }

    /// Give the photo a caption built from its filename and capture date,
    /// unless one is already set.
    pub fn set_default_caption(&mut self) {
        if self.caption.is_empty() {
            self.caption = crate::metadata::default_caption(&self.filename(), self.captured_at);
        }
    }
}

/// Where a gallery lives on disk.
///
/// ```text
/// <root>/
/// ├── index.html
/// ├── photos.json
/// ├── originals/photo-3c.jpg
/// ├── slides/photo-3c.jpg
/// ├── thumbs/photo-3c.jpg
/// └── assets/
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub const INDEX_FILE: &'static str = "index.html";
    pub const ASSETS_DIR: &'static str = "assets";

    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn variant_dir(&self, kind: VariantKind) -> PathBuf {
        self.root.join(kind.dir_name())
    }

    /// Absolute path of one variant file of a photo.
    pub fn variant_path(&self, kind: VariantKind, stable_id: &str) -> PathBuf {
        self.root.join(crate::naming::variant_relative_path(kind, stable_id))
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join(Self::ASSETS_DIR)
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(Self::INDEX_FILE)
    }

    /// Every directory a build writes into.
    pub fn dirs(&self) -> Vec<PathBuf> {
        VariantKind::ALL
            .into_iter()
            .map(|kind| self.variant_dir(kind))
            .chain([self.assets_dir()])
            .collect()
    }
}

fn fill_string(dst: &mut String, src: &str) {
    if dst.is_empty() && !src.is_empty() {
        *dst = src.to_string();
    }
}
