//! Image processing in pure Rust, plus one optional external tool.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode / encode** | `image` JPEG codec |
//! | **EXIF** | `kamadak-exif` (orientation, capture time) |
//! | **IPTC keywords** | custom parser (JPEG APP13) |
//! | **Orientation** | `DynamicImage::{rotate90, rotate180, rotate270, fliph, flipv}` |
//! | **Fit** | `resize_exact` with Lanczos3 |
//! | **Metadata copy** | `exiftool`, when installed |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Orientation**: EXIF code → ordered list of pure pixel operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: The per-photo transform state machine

pub mod backend;
mod calculations;
pub mod exiftool;
pub(crate) mod iptc_parser;
pub mod operations;
pub mod orientation;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, ImageMetadata};
pub use calculations::calculate_fit_dimensions;
pub use exiftool::{ExifTool, ExifToolError};
pub use operations::{PhotoOutcome, TransformError, fit, transform_photo};
pub use params::{Quality, TransformSettings};
pub use rust_backend::{RustBackend, supported_input_extensions};
