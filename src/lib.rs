//! # Photo Album
//!
//! An incremental static gallery generator for directories of JPEG files.
//! Point it at a folder of photos and it produces a single HTML page with a
//! thumbnail grid, a tag filter and a lightbox, plus three sized copies of
//! every photo.
//!
//! # Architecture: Incremental Pipeline
//!
//! A build is one pass through five stages. The only state carried between
//! builds is `photos.json` in the output directory:
//!
//! ```text
//! 1. Index       photos/          →  scanned records   (hash, capture time, tags)
//! 2. Reconcile   scanned + state  →  final list, to add / repair / remove
//! 3. Process     to add + repair  →  originals/ slides/ thumbs/
//! 4. Generate    final list       →  index.html + assets
//! 5. Persist     final list       →  photos.json
//! ```
//!
//! Only photos that are new (or whose variants are missing) are decoded and
//! encoded, so rebuilding a large gallery after adding a few photos is fast.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: walks the source directory and indexes every JPEG |
//! | [`reconcile`] | Stage 2: content-hash set algebra, ordering, tags and stable ids |
//! | [`process`] | Stage 3: worker pool running the per-photo transform |
//! | [`generate`] | Stage 4: renders the gallery page using Maud |
//! | [`state`] | Stage 5: `photos.json` load and save |
//! | [`pipeline`] | Runs the stages in order; output layout and stale file removal |
//! | [`config`] | `config.toml` loading, validation, merging and CLI overrides |
//! | [`types`] | `PhotoRecord`, variants and the output directory layout |
//! | [`naming`] | Stable ids and variant file names |
//! | [`metadata`] | Capture time resolution and date formatting |
//! | [`imaging`] | Decode, orientation, resample, encode; EXIF/IPTC; exiftool |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Identity Is Content
//!
//! A photo is identified by the SHA-256 of its bytes. Renaming or moving a
//! file does not make it new, and two copies of the same file are one photo.
//! Stable ids (`photo-3c`) are the shortest unused prefix of that hash, and a
//! published id is never reassigned while its photo remains.
//!
//! ## Captions Belong to the Gallery
//!
//! `photos.json` is meant to be edited: captions and authors set there are
//! merged into every later build, and only empty fields are filled in. The
//! default caption is the filename and capture time.
//!
//! ## Failures Are Per Photo
//!
//! A photo that fails to decode or write is reported and left out of the
//! page; everything else is published. Its record stays in `photos.json`
//! without variants, and the next build retries it.
//!
//! ## Pure-Rust Imaging
//!
//! The [`imaging`] module uses the `image` crate for JPEG decode, Lanczos3
//! resampling and encode, and `kamadak-exif` for orientation and capture
//! time. The only external program, `exiftool`, is optional and used to copy
//! metadata onto the full-size copies.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod process;
pub mod reconcile;
pub mod scan;
pub mod state;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
