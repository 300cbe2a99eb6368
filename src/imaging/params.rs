//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the pipeline (which decides which photos to transform)
//! and [`operations`](super::operations) (which drives the backend).
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`TransformSettings`]: Bounding boxes for the slide and thumbnail variants plus encode quality.

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// How every photo is transformed.
///
/// Slides and thumbnails are fit into square boxes of `max_slide` and
/// `max_thumb` pixels; the original variant keeps full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformSettings {
    pub max_slide: u32,
    pub max_thumb: u32,
    pub quality: Quality,
}

impl TransformSettings {
    pub fn slide_box(&self) -> (u32, u32) {
        (self.max_slide, self.max_slide)
    }

    pub fn thumb_box(&self) -> (u32, u32) {
        (self.max_thumb, self.max_thumb)
    }
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            max_slide: 1200,
            max_thumb: 300,
            quality: Quality::default(),
        }
    }
}
