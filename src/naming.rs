//! Centralized naming for stable ids and output files.
//!
//! Every photo gets a short id derived from its content hash: the shortest
//! prefix of the hash that no other photo in the gallery already uses,
//! prefixed with `photo-`. The id names the photo's output files in all three
//! variant directories:
//!
//! ```text
//! 3f9a…  → photo-3    → originals/photo-3.jpg, slides/photo-3.jpg, thumbs/photo-3.jpg
//! 3c01…  → photo-3c   (the prefix "3" is taken)
//! ```

use crate::types::VariantKind;
use std::collections::HashSet;

/// Prefix of every stable id.
pub const ID_PREFIX: &str = "photo-";

/// Extension of every output file.
pub const OUTPUT_EXTENSION: &str = "jpg";

/// Build a stable id from a hash prefix: `"3c"` → `"photo-3c"`.
pub fn photo_id(prefix: &str) -> String {
    format!("{ID_PREFIX}{prefix}")
}

/// Recover the hash prefix from a stable id: `"photo-3c"` → `Some("3c")`.
pub fn id_suffix(id: &str) -> Option<&str> {
    id.strip_prefix(ID_PREFIX).filter(|s| !s.is_empty())
}

/// The hash prefix of `id`, if `id` was derived from `hash`.
///
/// `photos.json` is hand-editable, so an id read from it only names files
/// when it passes this check.
pub fn id_prefix_of<'a>(id: &'a str, hash: &str) -> Option<&'a str> {
    id_suffix(id).filter(|suffix| hash.starts_with(suffix))
}

/// Shortest prefix of `hash` (length 1 up to the full hash) not in `taken`.
///
/// Returns `None` when every prefix, including the full hash, is taken.
pub fn shortest_unique_prefix<'a>(hash: &'a str, taken: &HashSet<String>) -> Option<&'a str> {
    (1..=hash.len())
        .filter(|&len| hash.is_char_boundary(len))
        .map(|len| &hash[..len])
        .find(|prefix| !taken.contains(*prefix))
}

/// Output file name of a photo: `photo-3c.jpg`.
pub fn output_filename(stable_id: &str) -> String {
    format!("{stable_id}.{OUTPUT_EXTENSION}")
}

/// Path of a variant relative to the output root: `slides/photo-3c.jpg`.
pub fn variant_relative_path(kind: VariantKind, stable_id: &str) -> String {
    format!("{}/{}", kind.dir_name(), output_filename(stable_id))
}
