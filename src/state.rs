//! Persisted gallery state for incremental builds.
//!
//! Every build ends by writing the final, ordered photo list to
//! `<output>/photos.json`. The next build reads it back as the "existing"
//! gallery and reconciles the fresh scan against it (see
//! [`reconcile`](crate::reconcile)), so only new content is transformed and
//! user edits to captions and authors survive rebuilds.
//!
//! # Format
//!
//! A pretty-printed JSON array of [`PhotoRecord`]s with camelCase keys:
//!
//! ```json
//! [
//!     {
//!         "sourcePath": "/home/me/photos/IMG_0042.jpg",
//!         "contentHash": "3f9a…",
//!         "capturedAt": "2019-05-04T13:04:00Z",
//!         "caption": "Harbour at dusk",
//!         "stableId": "photo-3",
//!         "slide": { "relativePath": "slides/photo-3.jpg", "width": 1200, "height": 900 },
//!         …
//!     }
//! ]
//! ```
//!
//! # Schema evolution
//!
//! There is no version field. Missing keys take their defaults and unknown
//! keys are ignored, so files written by older or newer builds load as long
//! as they are valid JSON arrays. A file that does not parse at all is an
//! error: silently starting from an empty gallery would schedule every
//! published photo for removal in replace mode.

use crate::types::PhotoRecord;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the state file within the output directory.
pub const STATE_FILENAME: &str = "photos.json";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to access {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

pub fn state_path(output_dir: &Path) -> PathBuf {
    output_dir.join(STATE_FILENAME)
}

/// Load the persisted gallery. A missing file is an empty gallery.
pub fn load_state(output_dir: &Path) -> Result<Vec<PhotoRecord>, StateError> {
    let path = state_path(output_dir);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(StateError::Io { path, source }),
    };
    serde_json::from_str(&content).map_err(|source| StateError::Json { path, source })
}

/// Write the gallery as pretty-printed JSON.
pub fn save_state(output_dir: &Path, photos: &[PhotoRecord]) -> Result<(), StateError> {
    let path = state_path(output_dir);
    let json = serde_json::to_string_pretty(photos).map_err(|source| StateError::Json {
        path: path.clone(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| StateError::Io { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{produced_record, record};
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_empty_gallery() {
        let tmp = TempDir::new().unwrap();
        assert!(load_state(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn save_then_load_preserves_order_and_fields() {
        let tmp = TempDir::new().unwrap();
        let mut first = produced_record("/in/b.jpg", "bbbb", 5, "photo-b");
        first.caption = "Harbour".into();
        first.tags = vec!["sea".into()];
        first.tag_names = vec!["tag-0".into()];
        let photos = vec![first, record("/in/a.jpg", "aaaa", 10)];

        save_state(tmp.path(), &photos).unwrap();
        let loaded = load_state(tmp.path()).unwrap();

        assert_eq!(loaded, photos);
    }

    #[test]
    fn saved_file_is_pretty_printed() {
        let tmp = TempDir::new().unwrap();
        save_state(tmp.path(), &[record("/in/a.jpg", "aaaa", 0)]).unwrap();

        let content = std::fs::read_to_string(state_path(tmp.path())).unwrap();
        assert!(content.starts_with("[\n"));
        assert!(content.contains("\"contentHash\": \"aaaa\""));
    }

    #[test]
    fn lenient_about_unknown_and_missing_fields() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            state_path(tmp.path()),
            r#"[{"contentHash": "abcd", "Md5sum": "legacy", "buildHost": "x"}]"#,
        )
        .unwrap();

        let loaded = load_state(tmp.path()).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].content_hash, "abcd");
        assert!(loaded[0].stable_id.is_empty());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(state_path(tmp.path()), "{ not json").unwrap();

        assert!(matches!(load_state(tmp.path()), Err(StateError::Json { .. })));
    }

    #[test]
    fn save_into_missing_dir_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = save_state(&tmp.path().join("missing"), &[]);
        assert!(matches!(result, Err(StateError::Io { .. })));
    }
}
