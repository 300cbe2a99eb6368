//! EXIF orientation correction.
//!
//! Cameras store pixels in sensor order and record how the photo should be
//! turned in the EXIF `Orientation` tag. Correction bakes that turn into the
//! pixels so every variant displays upright without the tag.
//!
//! Each code maps to a short list of primitive operations applied left to
//! right. Rotations are clockwise, matching `image::imageops`:
//!
//! | Code | Operations |
//! |---|---|
//! | 1 | none |
//! | 2 | flip horizontal |
//! | 3 | rotate 180° |
//! | 4 | flip vertical |
//! | 5 | rotate 90°, flip horizontal |
//! | 6 | rotate 90° |
//! | 7 | rotate 270°, flip horizontal |
//! | 8 | rotate 270° |
//!
//! Any other code is rejected with [`TransformError::InvalidOrientation`].

use super::operations::TransformError;
use image::DynamicImage;

/// One primitive orientation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    FlipH,
    FlipV,
    Rotate90,
    Rotate180,
    Rotate270,
}

impl Orientation {
    fn apply(self, image: &DynamicImage) -> DynamicImage {
        match self {
            Orientation::FlipH => image.fliph(),
            Orientation::FlipV => image.flipv(),
            Orientation::Rotate90 => image.rotate90(),
            Orientation::Rotate180 => image.rotate180(),
            Orientation::Rotate270 => image.rotate270(),
        }
    }
}

/// Operations correcting EXIF orientation `code`, or `None` for undefined codes.
pub fn ops_for(code: u32) -> Option<&'static [Orientation]> {
    use Orientation::*;
    let ops: &'static [Orientation] = match code {
        1 => &[],
        2 => &[FlipH],
        3 => &[Rotate180],
        4 => &[FlipV],
        5 => &[Rotate90, FlipH],
        6 => &[Rotate90],
        7 => &[Rotate270, FlipH],
        8 => &[Rotate270],
        _ => return None,
    };
    Some(ops)
}

/// Apply `ops` left to right, returning a new image.
pub fn apply(image: &DynamicImage, ops: &[Orientation]) -> DynamicImage {
    ops.iter().fold(image.clone(), |img, op| op.apply(&img))
}

/// Return `image` turned upright according to EXIF orientation `code`.
pub fn correct(image: &DynamicImage, code: u32) -> Result<DynamicImage, TransformError> {
    let ops = ops_for(code).ok_or(TransformError::InvalidOrientation(code))?;
    Ok(apply(image, ops))
}
