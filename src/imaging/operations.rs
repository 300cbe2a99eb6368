//! High-level image operations.
//!
//! [`transform_photo`] runs one photo through the whole transform state
//! machine, driving the backend for I/O and the pure helpers for pixels:
//!
//! ```text
//! Decode → OrientationCorrect → EncodeOriginal
//!        → ResampleSlide → EncodeSlide → ResampleThumb → EncodeThumb → Done
//! ```
//!
//! Failure policy, per photo:
//! - **Decode** failure ends the photo with no variants.
//! - **Orientation** problems (unreadable metadata, undefined code) are
//!   warnings; the photo continues un-rotated.
//! - **Encode/write** failure ends the photo; variants already written keep
//!   their dimensions, the rest stay at 0.
//!
//! Nothing here returns `Err`: every problem is captured in the
//! [`PhotoOutcome`] so a worker pool can keep going.

use super::backend::{BackendError, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::orientation;
use super::params::TransformSettings;
use crate::naming;
use crate::types::{OutputLayout, PhotoRecord, Variant, VariantKind};
use image::DynamicImage;
use image::imageops::FilterType;
use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Failed to decode {path}: {source}")]
    Decode { path: PathBuf, source: BackendError },
    #[error("Failed to read orientation of {path}: {source}")]
    Metadata { path: PathBuf, source: BackendError },
    #[error("Invalid EXIF orientation {0}, keeping pixels as stored")]
    InvalidOrientation(u32),
    #[error("Failed to write {variant} {path}: {source}")]
    Write {
        variant: &'static str,
        path: PathBuf,
        source: BackendError,
    },
}

/// Result of transforming one photo.
#[derive(Debug)]
pub struct PhotoOutcome {
    pub content_hash: String,
    pub stable_id: String,
    pub filename: String,
    /// Variants written successfully, in state-machine order.
    pub variants: Vec<(VariantKind, Variant)>,
    /// Non-fatal problems; the photo was still produced.
    pub warnings: Vec<TransformError>,
    /// The failure that stopped this photo, if any.
    pub error: Option<TransformError>,
}

impl PhotoOutcome {
    fn for_photo(photo: &PhotoRecord) -> Self {
        Self {
            content_hash: photo.content_hash.clone(),
            stable_id: photo.stable_id.clone(),
            filename: photo.filename(),
            variants: Vec::new(),
            warnings: Vec::new(),
            error: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Copy produced variant descriptors into `photo`.
    pub fn apply_to(&self, photo: &mut PhotoRecord) {
        for (kind, variant) in &self.variants {
            *photo.variant_mut(*kind) = variant.clone();
        }
    }
}

/// Resample `image` to fit inside `max` with Lanczos3.
///
/// Never upscales: an image that already fits is returned as an identical copy.
pub fn fit(image: &DynamicImage, max: (u32, u32)) -> DynamicImage {
    let source = (image.width(), image.height());
    let (width, height) = calculate_fit_dimensions(source, max);
    if (width, height) == source {
        return image.clone();
    }
    image.resize_exact(width, height, FilterType::Lanczos3)
}

/// Produce all three variants of `photo` under `layout`.
pub fn transform_photo(
    backend: &impl ImageBackend,
    photo: &PhotoRecord,
    layout: &OutputLayout,
    settings: &TransformSettings,
) -> PhotoOutcome {
    let mut outcome = PhotoOutcome::for_photo(photo);
    let source = photo.source();

    let decoded = match backend.decode(source) {
        Ok(img) => img,
        Err(e) => {
            outcome.error = Some(TransformError::Decode {
                path: source.to_path_buf(),
                source: e,
            });
            return outcome;
        }
    };

    let image = match backend.read_metadata(source) {
        Ok(meta) => match meta.orientation {
            Some(code) => orientation::correct(&decoded, code).unwrap_or_else(|e| {
                outcome.warnings.push(e);
                decoded
            }),
            None => decoded,
        },
        Err(e) => {
            outcome.warnings.push(TransformError::Metadata {
                path: source.to_path_buf(),
                source: e,
            });
            decoded
        }
    };

    let steps = [
        (VariantKind::Original, None),
        (VariantKind::Slide, Some(settings.slide_box())),
        (VariantKind::Thumb, Some(settings.thumb_box())),
    ];
    for (kind, bounds) in steps {
        let pixels = match bounds {
            Some(max) => Cow::Owned(fit(&image, max)),
            None => Cow::Borrowed(&image),
        };
        let path = layout.variant_path(kind, &photo.stable_id);
        if let Err(e) = backend.encode(&pixels, &path, settings.quality) {
            outcome.error = Some(TransformError::Write {
                variant: kind.label(),
                path,
                source: e,
            });
            return outcome;
        }
        outcome.variants.push((
            kind,
            Variant {
                relative_path: naming::variant_relative_path(kind, &photo.stable_id),
                width: pixels.width(),
                height: pixels.height(),
            },
        ));
    }

    outcome
}
