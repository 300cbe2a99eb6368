//! Photo discovery and indexing.
//!
//! Stage 1 of the build pipeline. Walks the source directory, and for every
//! JPEG computes a content identity and a capture time, producing one
//! [`PhotoRecord`] per file:
//!
//! ```text
//! photos/                      PhotoRecord {
//! ├── 2019/                      sourcePath:  /abs/photos/2019/IMG_0042.jpg
//! │   ├── IMG_0042.jpg    →      contentHash: sha256 of the file bytes
//! │   └── IMG_0043.JPG           capturedAt:  EXIF → mtime → now
//! ├── notes.txt  (ignored)       tags:        IPTC keywords
//! └── config.toml (ignored)    }
//! ```
//!
//! ## Identity
//!
//! A photo is its bytes: the SHA-256 of the file is the identity used by
//! every later stage. Renaming or moving a file does not change it; two
//! copies of one file are the same photo.
//!
//! ## Parallelism
//!
//! Hashing is I/O bound and files are independent, so indexing runs on a
//! dedicated rayon pool sized by `[processing] max_processes`. The directory
//! walk is bridged into the pool, so hashing starts while the walk is still
//! producing paths.
//!
//! ## Failure policy
//!
//! Indexing is all-or-nothing. A walk error or an unreadable file aborts the
//! build: reconciling against a partial scan in replace mode would delete
//! published photos. Missing or broken metadata is never an error; the
//! capture time falls back to the file's modification time and then to now.

use crate::imaging::{ImageBackend, supported_input_extensions};
use crate::metadata::{resolve_captured_at, system_time_to_utc};
use crate::types::PhotoRecord;
use chrono::Utc;
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to walk source directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Failed to hash {path}: {source}")]
    Hash { path: PathBuf, source: io::Error },
    #[error("Failed to start indexing pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// SHA-256 hash of a file's contents, returned as a hex string.
pub fn hash_file(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    let digest = Sha256::digest(&bytes);
    Ok(format!("{:x}", digest))
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Lazily walk `root`, yielding every regular JPEG file.
///
/// Hidden entries are included; symlinks are not followed.
pub fn discover(root: &Path) -> impl Iterator<Item = Result<PathBuf, ScanError>> + Send + use<> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() && is_supported(e.path()) => {
                Some(Ok(e.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(ScanError::Walk(e))),
        })
}

/// Index one file: hash, capture time, keywords.
///
/// Fails only when the file cannot be read for hashing.
pub fn index_photo(backend: &impl ImageBackend, path: &Path) -> Result<PhotoRecord, ScanError> {
    let content_hash = hash_file(path).map_err(|source| ScanError::Hash {
        path: path.to_path_buf(),
        source,
    })?;

    let metadata = backend.read_metadata(path).unwrap_or_default();
    let mtime = std::fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .map(system_time_to_utc);
    let captured_at = resolve_captured_at(metadata.captured_at, mtime, Utc::now());

    let mut photo = PhotoRecord::indexed(path.to_path_buf(), content_hash, captured_at);
    photo.tags = metadata.keywords;
    Ok(photo)
}

/// Index every JPEG under `root` on a pool of `threads` workers.
///
/// Source paths are absolute. The result is sorted by source path so that
/// equal capture times keep a reproducible order downstream.
pub fn index(
    root: &Path,
    backend: &impl ImageBackend,
    threads: usize,
) -> Result<Vec<PhotoRecord>, ScanError> {
    let root = std::path::absolute(root)?;
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()?;

    let mut photos = pool.install(|| {
        discover(&root)
            .par_bridge()
            .map(|path| index_photo(backend, &path?))
            .collect::<Result<Vec<_>, ScanError>>()
    })?;

    photos.sort_by(|a, b| a.source_path.cmp(&b.source_path));
    Ok(photos)
}
