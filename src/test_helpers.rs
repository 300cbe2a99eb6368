//! Shared test utilities for the photo-album test suite.
//!
//! Record builders for reconciliation tests and synthetic JPEG writers for
//! anything that touches the real codec.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let a = record("p1.jpg", "3f9a", 10);
//! let published = produced_record("p2.jpg", "3c01", 20, "photo-3c");
//!
//! let tmp = TempDir::new().unwrap();
//! create_test_jpeg(&tmp.path().join("p1.jpg"), 40, 30);
//! ```

use chrono::{DateTime, Utc};
use image::{ImageEncoder, Rgb, RgbImage};
use std::path::{Path, PathBuf};

use crate::naming;
use crate::types::{PhotoRecord, Variant, VariantKind};

/// Base timestamp for `record`: 2017-07-14T02:40:00Z.
const BASE_SECS: i64 = 1_500_000_000;

// =========================================================================
// Record builders
// =========================================================================

/// A freshly indexed record captured `secs` seconds after the base time.
pub fn record(path: &str, hash: &str, secs: i64) -> PhotoRecord {
    PhotoRecord::indexed(PathBuf::from(path), hash.to_string(), at(secs))
}

/// A record as persisted after a successful build: id set and all three
/// variants produced.
pub fn produced_record(path: &str, hash: &str, secs: i64, stable_id: &str) -> PhotoRecord {
    let mut photo = record(path, hash, secs);
    photo.stable_id = stable_id.to_string();
    for (kind, (w, h)) in [
        (VariantKind::Original, (4000, 3000)),
        (VariantKind::Slide, (1200, 900)),
        (VariantKind::Thumb, (300, 225)),
    ] {
        *photo.variant_mut(kind) = Variant {
            relative_path: naming::variant_relative_path(kind, stable_id),
            width: w,
            height: h,
        };
    }
    photo
}

pub fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_SECS + secs, 0).unwrap()
}

/// Content hashes in list order.
pub fn hashes(photos: &[PhotoRecord]) -> Vec<&str> {
    photos.iter().map(|p| p.content_hash.as_str()).collect()
}

// =========================================================================
// Synthetic JPEGs
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    std::fs::write(path, jpeg_bytes(width, height)).unwrap();
}

/// Encode a gradient image as baseline JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    });
    let mut buf = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut buf)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    buf
}

/// Insert an EXIF APP1 segment right after SOI carrying `Orientation` and,
/// optionally, `DateTime` (`"YYYY:MM:DD HH:MM:SS"`).
pub fn with_exif(jpeg: &[u8], orientation: u16, datetime: Option<&str>) -> Vec<u8> {
    // Big-endian TIFF: header, IFD0 at offset 8, ASCII payload after the IFD.
    let entry_count: u16 = if datetime.is_some() { 2 } else { 1 };
    let data_offset = 8 + 2 + 12 * entry_count as u32 + 4;

    let mut tiff = Vec::new();
    tiff.extend_from_slice(b"MM\x00\x2a\x00\x00\x00\x08");
    tiff.extend_from_slice(&entry_count.to_be_bytes());
    // 0x0112 Orientation, SHORT, count 1, value left-justified
    tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
    tiff.extend_from_slice(&orientation.to_be_bytes());
    tiff.extend_from_slice(&[0x00, 0x00]);
    if let Some(dt) = datetime {
        // 0x0132 DateTime, ASCII, NUL-terminated
        let count = dt.len() as u32 + 1;
        tiff.extend_from_slice(&[0x01, 0x32, 0x00, 0x02]);
        tiff.extend_from_slice(&count.to_be_bytes());
        tiff.extend_from_slice(&data_offset.to_be_bytes());
    }
    tiff.extend_from_slice(&[0, 0, 0, 0]);
    if let Some(dt) = datetime {
        tiff.extend_from_slice(dt.as_bytes());
        tiff.push(0);
    }

    let mut payload = b"Exif\x00\x00".to_vec();
    payload.extend_from_slice(&tiff);
    insert_segment(jpeg, 0xE1, &payload)
}

/// Insert an APP13 segment carrying IPTC keywords (dataset 2:25).
pub fn with_iptc(jpeg: &[u8], keywords: &[&str]) -> Vec<u8> {
    let mut iim = Vec::new();
    for keyword in keywords {
        iim.extend_from_slice(&[0x1C, 0x02, 0x19]);
        iim.extend_from_slice(&(keyword.len() as u16).to_be_bytes());
        iim.extend_from_slice(keyword.as_bytes());
    }

    let mut payload = b"Photoshop 3.0\x00".to_vec();
    payload.extend_from_slice(b"8BIM");
    payload.extend_from_slice(&0x0404u16.to_be_bytes());
    // empty pascal name, padded to even
    payload.extend_from_slice(&[0x00, 0x00]);
    payload.extend_from_slice(&(iim.len() as u32).to_be_bytes());
    payload.extend_from_slice(&iim);
    if iim.len() % 2 == 1 {
        payload.push(0);
    }
    insert_segment(jpeg, 0xED, &payload)
}

fn insert_segment(jpeg: &[u8], marker: u8, payload: &[u8]) -> Vec<u8> {
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8], "not a JPEG");
    let len = (payload.len() + 2) as u16;
    let mut out = Vec::with_capacity(jpeg.len() + payload.len() + 4);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, marker]);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(payload);
    out.extend_from_slice(&jpeg[2..]);
    out
}
