//! Capture time and caption resolution.
//!
//! ## Capture time
//!
//! Every photo needs a timestamp before the gallery can be sorted. Sources are
//! tried in priority order and the first usable one wins:
//!
//! 1. EXIF `DateTimeOriginal` (or `DateTime`) read by the metadata backend
//! 2. The file's modification time
//! 3. The current wall-clock time
//!
//! A zero timestamp (the Unix epoch) counts as missing, so a camera that
//! writes `0000:00:00 00:00:00` or a filesystem that reports epoch mtimes
//! falls through to the next source.
//!
//! EXIF stores local wall-clock time without a zone; it is interpreted in the
//! local time zone of the machine running the build.
//!
//! ## Captions
//!
//! Photos without a caption get one generated from the filename and the
//! capture date, e.g. `IMG_0042.jpg: Saturday, May 4, 2019 at 3:04pm`.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

/// Pick the first present, non-zero timestamp.
///
/// ```text
/// captured_at = resolve_captured_at(exif, mtime, now)
/// ```
pub fn resolve_captured_at(
    exif: Option<DateTime<Utc>>,
    mtime: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    [exif, mtime]
        .into_iter()
        .flatten()
        .find(|t| t.timestamp() != 0)
        .unwrap_or(now)
}

/// Interpret a zone-less EXIF timestamp as local time.
///
/// Returns `None` for times that do not exist locally (DST gaps). Ambiguous
/// times (DST overlaps) resolve to the earlier instant.
pub fn exif_local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|t| t.with_timezone(&Utc))
}

/// Convert a filesystem timestamp.
pub fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

/// Caption for photos the user never captioned.
pub fn default_caption(filename: &str, captured_at: DateTime<Utc>) -> String {
    let local = captured_at.with_timezone(&Local);
    format!("{}: {}", filename, local.format("%A, %B %-d, %Y at %-I:%M%P"))
}

/// Human-readable build date shown in the gallery footer.
pub fn format_build_date(at: DateTime<Local>) -> String {
    at.format("%A, %B %-d, %Y").to_string()
}
