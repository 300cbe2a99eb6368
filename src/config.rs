//! Gallery configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  →  <source>/config.toml  →  command-line flags
//! ```
//!
//! The file layer is sparse: it only needs the keys it wants to change.
//! Unknown keys are rejected to catch typos early. The fully merged
//! [`GalleryConfig`] is validated once and then passed by reference to every
//! stage; nothing reads settings from anywhere else.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = ""
//! subtitle = ""
//! color = "blue"            # Color theme of the page
//! # head_content = "head.html"
//! # body_content = "analytics.html"
//! include = []              # Files copied verbatim into the output root
//! append = false            # Keep photos whose source file has gone
//!
//! [images]
//! max_slide = 1200          # Slide bounding box (pixels)
//! max_thumb = 300           # Thumbnail bounding box (pixels)
//! quality = 90              # JPEG quality (1-100)
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//!
//! [metadata]
//! # exiftool = "/usr/local/bin/exiftool"
//! ```
//!
//! Relative paths in the file (`head_content`, `body_content`, `include`)
//! are resolved against the source directory. Paths given on the command
//! line are used as given.

use crate::imaging::{Quality, TransformSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "config.toml";

/// Color themes shipped in the stylesheet.
pub const COLORS: &[&str] = &["blue", "green", "grey", "orange", "purple", "red"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Gallery configuration.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    pub title: String,
    pub subtitle: String,
    /// Color theme, one of [`COLORS`].
    pub color: String,
    /// HTML inserted before `</head>`.
    pub head_content: Option<PathBuf>,
    /// HTML inserted before `</body>`.
    pub body_content: Option<PathBuf>,
    /// Files copied verbatim into the output root.
    pub include: Vec<PathBuf>,
    /// Append mode: never remove previously published photos.
    pub append: bool,
    pub images: ImagesConfig,
    pub processing: ProcessingConfig,
    pub metadata: MetadataConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            color: "blue".to_string(),
            head_content: None,
            body_content: None,
            include: Vec::new(),
            append: false,
            images: ImagesConfig::default(),
            processing: ProcessingConfig::default(),
            metadata: MetadataConfig::default(),
        }
    }
}

impl GalleryConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.images.quality) {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.images.max_slide == 0 || self.images.max_thumb == 0 {
            return Err(ConfigError::Validation(
                "images.max_slide and images.max_thumb must be non-zero".into(),
            ));
        }
        if !COLORS.contains(&self.color.as_str()) {
            return Err(ConfigError::Validation(format!(
                "color must be one of {}, got {:?}",
                COLORS.join(", "),
                self.color
            )));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn transform_settings(&self) -> TransformSettings {
        TransformSettings {
            max_slide: self.images.max_slide,
            max_thumb: self.images.max_thumb,
            quality: Quality::new(self.images.quality),
        }
    }

    /// Make the file-relative paths absolute against `base`.
    fn resolve_paths(&mut self, base: &Path) {
        for path in self
            .head_content
            .iter_mut()
            .chain(self.body_content.iter_mut())
            .chain(self.include.iter_mut())
        {
            *path = base.join(&*path);
        }
    }
}

/// Variant sizes and encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Longest edge of the slide variant.
    pub max_slide: u32,
    /// Longest edge of the thumbnail variant.
    pub max_thumb: u32,
    /// JPEG encoding quality (1-100).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        let settings = TransformSettings::default();
        Self {
            max_slide: settings.max_slide,
            max_thumb: settings.max_thumb,
            quality: settings.quality.value(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Metadata copy settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MetadataConfig {
    /// Path to `exiftool`. When absent, `PATH` is searched.
    pub exiftool: Option<PathBuf>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_processes.map(|n| n.min(cores)).unwrap_or(cores)
}

/// Values given on the command line. `None` / empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub color: Option<String>,
    pub head_content: Option<PathBuf>,
    pub body_content: Option<PathBuf>,
    /// Added to the includes from the file.
    pub include: Vec<PathBuf>,
    /// `true` forces append mode; `false` leaves the file's setting.
    pub append: bool,
    pub max_slide: Option<u32>,
    pub max_thumb: Option<u32>,
    pub max_processes: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, config: &mut GalleryConfig) {
        if let Some(title) = &self.title {
            config.title = title.clone();
        }
        if let Some(subtitle) = &self.subtitle {
            config.subtitle = subtitle.clone();
        }
        if let Some(color) = &self.color {
            config.color = color.clone();
        }
        if let Some(path) = &self.head_content {
            config.head_content = Some(path.clone());
        }
        if let Some(path) = &self.body_content {
            config.body_content = Some(path.clone());
        }
        config.include.extend(self.include.iter().cloned());
        config.append |= self.append;
        if let Some(n) = self.max_slide {
            config.images.max_slide = n;
        }
        if let Some(n) = self.max_thumb {
            config.images.max_thumb = n;
        }
        if let Some(n) = self.max_processes {
            config.processing.max_processes = Some(n);
        }
    }
}

/// Stock defaults as a TOML value, the base layer of every merge.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(GalleryConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value and deserialize.
///
/// Not validated yet: command-line overrides still have to be applied.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    Ok(merged.try_into()?)
}

/// Load the gallery configuration for `source_dir`.
///
/// Merges `config.toml` (if any) over stock defaults, applies command-line
/// overrides, and validates the result.
pub fn load_config(source_dir: &Path, overrides: &Overrides) -> Result<GalleryConfig, ConfigError> {
    let mut config = resolve_config(stock_defaults_value(), load_raw_config(source_dir)?)?;
    config.resolve_paths(source_dir);
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Photo Album Configuration
# =========================
# Place this file in the source directory as config.toml.
# All settings are optional. Values shown below are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# Page title and subtitle.
title = ""
subtitle = ""

# Color theme: blue, green, grey, orange, purple or red.
color = "blue"

# HTML files whose content is inserted before </head> and </body>.
# Relative paths are resolved against this directory.
# head_content = "head.html"
# body_content = "body.html"

# Files copied verbatim into the output root (favicon, robots.txt, ...).
include = []

# When true, photos whose source file disappeared stay in the gallery.
# When false, the gallery mirrors the source directory.
append = false

# ---------------------------------------------------------------------------
# Image variants
# ---------------------------------------------------------------------------
[images]
# Slides and thumbnails fit inside a square of this many pixels.
# Smaller photos are never upscaled.
max_slide = 1200
max_thumb = 300

# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel workers for indexing and transforming.
# Omit to use all CPU cores. Values above the core count are clamped.
# max_processes = 4

# ---------------------------------------------------------------------------
# Metadata
# ---------------------------------------------------------------------------
[metadata]
# exiftool copies EXIF/IPTC/XMP from each source onto its full-size copy.
# Omit to search PATH; the step is skipped when exiftool is not installed.
# exiftool = "/usr/local/bin/exiftool"
"##
}
