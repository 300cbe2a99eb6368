//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every backend must
//! support: read_metadata, decode, and encode. Resampling and orientation
//! correction are pure functions over decoded pixels and live outside the
//! backend, so swapping a backend never changes what a photo looks like.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust and statically
//! linked into the binary.

use super::params::Quality;
use chrono::{DateTime, Utc};
use image::DynamicImage;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Embedded image metadata.
///
/// Field mapping:
/// - `orientation`: EXIF `Orientation` (`0x0112`), normally 1–8
/// - `captured_at`: EXIF `DateTimeOriginal`, falling back to `DateTime`
/// - `keywords`: IPTC Keywords (`2:25`), one entry per repeated field
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    pub orientation: Option<u32>,
    pub captured_at: Option<DateTime<Utc>>,
    pub keywords: Vec<String>,
}

/// Trait for image processing backends.
///
/// `Sync` because one backend is shared by every indexing and transform
/// worker.
pub trait ImageBackend: Sync {
    /// Read embedded EXIF/IPTC metadata.
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError>;

    /// Decode a source file into pixels.
    fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError>;

    /// Encode pixels and write them to `path`.
    fn encode(&self, image: &DynamicImage, path: &Path, quality: Quality)
    -> Result<(), BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    /// Mock backend that records operations without touching the filesystem.
    /// Uses Mutex (not RefCell) so it is Sync and can be shared by workers.
    ///
    /// `decode` returns a blank image of the registered size, or a decode
    /// error for unregistered paths. `encode` fails for any output path
    /// containing one of `fail_encode` substrings.
    #[derive(Default)]
    pub struct MockBackend {
        pub images: Mutex<HashMap<PathBuf, (u32, u32)>>,
        pub metadata: Mutex<HashMap<PathBuf, ImageMetadata>>,
        pub fail_encode: Mutex<Vec<String>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        ReadMetadata(String),
        Decode(String),
        Encode {
            output: String,
            width: u32,
            height: u32,
            quality: u32,
        },
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a decodable source of the given size.
        pub fn with_image(self, path: impl Into<PathBuf>, width: u32, height: u32) -> Self {
            self.images.lock().unwrap().insert(path.into(), (width, height));
            self
        }

        pub fn with_metadata(self, path: impl Into<PathBuf>, metadata: ImageMetadata) -> Self {
            self.metadata.lock().unwrap().insert(path.into(), metadata);
            self
        }

        pub fn failing_encode(self, output_contains: &str) -> Self {
            self.fail_encode.lock().unwrap().push(output_contains.to_string());
            self
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        /// Encoded output paths, in call order.
        pub fn encoded_outputs(&self) -> Vec<String> {
            self.get_operations()
                .into_iter()
                .filter_map(|op| match op {
                    RecordedOp::Encode { output, .. } => Some(output),
                    _ => None,
                })
                .collect()
        }
    }

    impl ImageBackend for MockBackend {
        fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::ReadMetadata(path.to_string_lossy().to_string()));

            Ok(self
                .metadata
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .unwrap_or_default())
        }

        fn decode(&self, path: &Path) -> Result<DynamicImage, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Decode(path.to_string_lossy().to_string()));

            self.images
                .lock()
                .unwrap()
                .get(path)
                .map(|&(w, h)| DynamicImage::new_rgb8(w, h))
                .ok_or_else(|| BackendError::Decode(format!("no mock image for {}", path.display())))
        }

        fn encode(
            &self,
            image: &DynamicImage,
            path: &Path,
            quality: Quality,
        ) -> Result<(), BackendError> {
            let output = path.to_string_lossy().to_string();
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                output: output.clone(),
                width: image.width(),
                height: image.height(),
                quality: quality.value(),
            });

            if self.fail_encode.lock().unwrap().iter().any(|s| output.contains(s)) {
                return Err(BackendError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "mock write failure",
                )));
            }
            Ok(())
        }
    }

    #[test]
    fn mock_decodes_registered_images() {
        let backend = MockBackend::new().with_image("/in/a.jpg", 800, 600);

        let img = backend.decode(Path::new("/in/a.jpg")).unwrap();
        assert_eq!((img.width(), img.height()), (800, 600));
        assert!(matches!(
            backend.decode(Path::new("/in/missing.jpg")),
            Err(BackendError::Decode(_))
        ));

        let ops = backend.get_operations();
        assert_eq!(ops.len(), 2);
        assert!(matches!(&ops[0], RecordedOp::Decode(p) if p == "/in/a.jpg"));
    }

    #[test]
    fn mock_records_encode() {
        let backend = MockBackend::new();
        let img = DynamicImage::new_rgb8(40, 30);

        backend
            .encode(&img, Path::new("/out/slides/photo-a.jpg"), Quality::new(85))
            .unwrap();

        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::Encode {
                output: "/out/slides/photo-a.jpg".into(),
                width: 40,
                height: 30,
                quality: 85,
            }]
        );
    }

    #[test]
    fn mock_encode_failure_is_io() {
        let backend = MockBackend::new().failing_encode("thumbs/");
        let img = DynamicImage::new_rgb8(4, 3);

        assert!(backend.encode(&img, Path::new("/out/slides/x.jpg"), Quality::default()).is_ok());
        assert!(matches!(
            backend.encode(&img, Path::new("/out/thumbs/x.jpg"), Quality::default()),
            Err(BackendError::Io(_))
        ));
    }

    #[test]
    fn mock_metadata_defaults_when_unregistered() {
        let backend = MockBackend::new().with_metadata(
            "/in/a.jpg",
            ImageMetadata {
                orientation: Some(6),
                ..ImageMetadata::default()
            },
        );

        assert_eq!(backend.read_metadata(Path::new("/in/a.jpg")).unwrap().orientation, Some(6));
        assert_eq!(
            backend.read_metadata(Path::new("/in/b.jpg")).unwrap(),
            ImageMetadata::default()
        );
    }
}
