//! Pure Rust image processing backend.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG) | `image::load_from_memory_with_format` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | EXIF orientation + capture time | `kamadak-exif` |
//! | IPTC keywords | custom `iptc_parser` (JPEG APP13) |

use super::backend::{BackendError, ImageBackend, ImageMetadata};
use super::iptc_parser;
use super::params::Quality;
use crate::metadata::exif_local_to_utc;
use chrono::{DateTime, NaiveDate, Utc};
use exif::{In, Tag, Value};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageFormat};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

/// Source file extensions this backend decodes, matched case-insensitively.
const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg"];

pub fn supported_input_extensions() -> &'static [&'static str] {
    SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Orientation and capture time from the EXIF block, if there is one.
fn read_exif(bytes: &[u8]) -> (Option<u32>, Option<DateTime<Utc>>) {
    let Ok(exif) = exif::Reader::new().read_from_container(&mut Cursor::new(bytes)) else {
        return (None, None);
    };

    let orientation = exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0));

    let captured_at = [Tag::DateTimeOriginal, Tag::DateTime]
        .into_iter()
        .find_map(|tag| {
            let field = exif.get_field(tag, In::PRIMARY)?;
            let Value::Ascii(ref parts) = field.value else {
                return None;
            };
            let dt = exif::DateTime::from_ascii(parts.first()?).ok()?;
            let naive = NaiveDate::from_ymd_opt(dt.year.into(), dt.month.into(), dt.day.into())?
                .and_hms_opt(dt.hour.into(), dt.minute.into(), dt.second.into())?;
            exif_local_to_utc(naive)
        });

    (orientation, captured_at)
}

fn encode_error(e: ImageError) -> BackendError {
    match e {
        ImageError::IoError(io) => BackendError::Io(io),
        other => BackendError::Encode(other.to_string()),
    }
}

impl ImageBackend for RustBackend {
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError> {
        let bytes = std::fs::read(path)?;
        let (orientation, captured_at) = read_exif(&bytes);
        Ok(ImageMetadata {
            orientation,
            captured_at,
            keywords: iptc_parser::read_keywords(&bytes),
        })
    }

    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
        let bytes = std::fs::read(path)?;
        image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg).map_err(|e| {
            BackendError::Decode(format!("Failed to decode {}: {}", path.display(), e))
        })
    }

    fn encode(
        &self,
        image: &DynamicImage,
        path: &Path,
        quality: Quality,
    ) -> Result<(), BackendError> {
        // JPEG has no alpha channel
        let rgb;
        let pixels = match image {
            DynamicImage::ImageRgb8(_) | DynamicImage::ImageLuma8(_) => image,
            _ => {
                rgb = DynamicImage::ImageRgb8(image.to_rgb8());
                &rgb
            }
        };

        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);
        let encoder = JpegEncoder::new_with_quality(&mut writer, quality.value() as u8);
        pixels.write_with_encoder(encoder).map_err(encode_error)?;
        writer.flush()?;
        Ok(())
    }
}
