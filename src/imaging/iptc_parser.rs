//! Minimal IPTC-IIM keyword reader for JPEG files.
//!
//! Photo managers (Lightroom, Capture One, digiKam) write keywords as IPTC
//! Record 2 dataset 25, repeated once per keyword. In a JPEG they live in the
//! APP13 marker, inside the Photoshop 8BIM resource `0x0404`.
//!
//! Every failure yields an empty keyword list: keywords are decoration, never
//! a reason to reject a photo.

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;
const APPLICATION_RECORD: u8 = 2;
const KEYWORDS_DATASET: u8 = 25;

/// Keywords from a JPEG file's bytes, in stored order, trimmed and with
/// empties and duplicates dropped.
pub fn read_keywords(jpeg: &[u8]) -> Vec<String> {
    find_jpeg_app13_iptc(jpeg)
        .map(parse_keywords)
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// IPTC-IIM record parsing
// ---------------------------------------------------------------------------

/// Collect Keywords (2:25) from raw IPTC-IIM bytes.
///
/// IIM record format (each dataset):
///   Byte 0:    0x1C (tag marker)
///   Byte 1:    Record number (we want 0x02)
///   Byte 2:    Dataset number (0x19 = Keywords)
///   Bytes 3-4: Data length (big-endian u16)
///   Bytes 5+:  Data (UTF-8/ASCII string)
fn parse_keywords(data: &[u8]) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        if pos + length > data.len() {
            break;
        }

        if record == APPLICATION_RECORD && dataset == KEYWORDS_DATASET {
            let value = String::from_utf8_lossy(&data[pos..pos + length])
                .trim()
                .to_string();
            if !value.is_empty() && !keywords.contains(&value) {
                keywords.push(value);
            }
        }

        pos += length;
    }

    keywords
}

// ---------------------------------------------------------------------------
// JPEG: extract IPTC from APP13 / Photoshop 8BIM
// ---------------------------------------------------------------------------

/// Find the raw IPTC-IIM bytes inside a JPEG's APP13 segment.
fn find_jpeg_app13_iptc(data: &[u8]) -> Option<&[u8]> {
    let mut pos = 0;
    while pos + 4 < data.len() {
        if data[pos] == 0xFF && data[pos + 1] == 0xED {
            let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            let seg_start = pos + 4;
            let seg_end = (pos + 2 + seg_len).min(data.len());
            if seg_start <= seg_end
                && let Some(iptc) = extract_iptc_from_8bim(&data[seg_start..seg_end])
            {
                return Some(iptc);
            }
        }

        // Advance: if 0xFF, skip marker + length; otherwise byte-by-byte
        if data[pos] == 0xFF && data[pos + 1] != 0x00 {
            let marker = data[pos + 1];
            // SOS (0xDA): entropy-coded data follows, no more metadata
            if marker == 0xDA {
                break;
            }
            if marker == 0xD8 || marker == 0xD9 || (0xD0..=0xD7).contains(&marker) {
                pos += 2;
            } else {
                let len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
                pos += 2 + len;
            }
        } else {
            pos += 1;
        }
    }
    None
}

/// Extract IPTC-IIM bytes from a Photoshop 8BIM resource block.
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        // Each resource: "8BIM" (4) + resource_id (2) + pascal_string + data_len (4) + data
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        // Pascal string: 1 byte length + string, padded to even
        let pascal_len = data[pos] as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        if pos + 4 > data.len() {
            break;
        }
        let res_len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        if pos + res_len > data.len() {
            break;
        }

        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..pos + res_len]);
        }

        pos += res_len + (res_len % 2);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{jpeg_bytes, with_iptc};

    fn dataset(record: u8, dataset: u8, value: &[u8]) -> Vec<u8> {
        let mut out = vec![0x1C, record, dataset];
        out.extend_from_slice(&(value.len() as u16).to_be_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn parse_empty_returns_nothing() {
        assert!(parse_keywords(&[]).is_empty());
    }

    #[test]
    fn parse_multiple_keywords() {
        let mut data = dataset(2, 25, b"snow");
        data.extend(dataset(2, 25, b"winter"));
        assert_eq!(parse_keywords(&data), vec!["snow", "winter"]);
    }

    #[test]
    fn parse_ignores_other_datasets_and_records() {
        let mut data = dataset(2, 5, b"Title");
        data.extend(dataset(2, 120, b"A caption"));
        data.extend(dataset(1, 25, b"envelope"));
        data.extend(dataset(2, 25, b"art"));
        assert_eq!(parse_keywords(&data), vec!["art"]);
    }

    #[test]
    fn parse_trims_and_drops_blank_and_repeated() {
        let mut data = dataset(2, 25, b"  sea ");
        data.extend(dataset(2, 25, b"   "));
        data.extend(dataset(2, 25, b"sea"));
        assert_eq!(parse_keywords(&data), vec!["sea"]);
    }

    #[test]
    fn parse_stops_on_truncated_dataset() {
        let mut data = dataset(2, 25, b"ok");
        data.extend_from_slice(&[0x1C, 0x02, 0x19, 0x00, 0x40, b'x']);
        assert_eq!(parse_keywords(&data), vec!["ok"]);
    }

    #[test]
    fn reads_keywords_from_jpeg_app13() {
        let jpeg = with_iptc(&jpeg_bytes(8, 8), &["harbour", "night"]);
        assert_eq!(read_keywords(&jpeg), vec!["harbour", "night"]);
    }

    #[test]
    fn plain_jpeg_has_no_keywords() {
        assert!(read_keywords(&jpeg_bytes(8, 8)).is_empty());
    }

    #[test]
    fn garbage_has_no_keywords() {
        assert!(read_keywords(b"not a jpeg at all").is_empty());
        assert!(read_keywords(&[0xFF, 0xED, 0xFF]).is_empty());
    }
}
