//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Calculate dimensions that fit a source inside a bounding box.
///
/// Aspect ratio is preserved and the result is never larger than the source:
/// a source that already fits is returned unchanged. The side that does not
/// touch the box edge is rounded to the nearest pixel, with a 1px minimum.
///
/// # Arguments
/// * `source` - Original image dimensions (width, height)
/// * `max` - Bounding box (width, height)
///
/// # Examples
/// ```
/// # use photo_album::imaging::calculate_fit_dimensions;
/// // 4000x3000 landscape into a 1200 box → 1200x900
/// assert_eq!(calculate_fit_dimensions((4000, 3000), (1200, 1200)), (1200, 900));
///
/// // Already small enough → untouched
/// assert_eq!(calculate_fit_dimensions((640, 480), (1200, 1200)), (640, 480));
/// ```
pub fn calculate_fit_dimensions(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = max;

    if src_w <= max_w && src_h <= max_h {
        return source;
    }

    let src_aspect = src_w as f64 / src_h as f64;
    let max_aspect = max_w as f64 / max_h as f64;

    if src_aspect > max_aspect {
        // Source is wider: width touches the box
        let h = (max_w as f64 / src_aspect).round() as u32;
        (max_w.max(1), h.max(1))
    } else {
        // Source is taller (or same shape): height touches the box
        let w = (max_h as f64 * src_aspect).round() as u32;
        (w.max(1), max_h.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // calculate_fit_dimensions tests
    // =========================================================================

    #[test]
    fn fit_landscape_into_square_box() {
        // 4000x3000 → width matches, height = 1200 / (4/3) = 900
        assert_eq!(calculate_fit_dimensions((4000, 3000), (1200, 1200)), (1200, 900));
    }

    #[test]
    fn fit_portrait_into_square_box() {
        // 3000x4000 → height matches, width = 300 * 0.75 = 225
        assert_eq!(calculate_fit_dimensions((3000, 4000), (300, 300)), (225, 300));
    }

    #[test]
    fn fit_square_source() {
        assert_eq!(calculate_fit_dimensions((2000, 2000), (300, 300)), (300, 300));
    }

    #[test]
    fn fit_never_upscales() {
        assert_eq!(calculate_fit_dimensions((200, 150), (1200, 1200)), (200, 150));
        assert_eq!(calculate_fit_dimensions((300, 300), (300, 300)), (300, 300));
    }

    #[test]
    fn fit_only_one_side_too_large() {
        // 1500x100 into 1200 → width matches, height = 1200 / 15 = 80
        assert_eq!(calculate_fit_dimensions((1500, 100), (1200, 1200)), (1200, 80));
    }

    #[test]
    fn fit_rounds_to_nearest() {
        // 1000x333 into 300 → 300 / 3.003 = 99.9 → 100
        assert_eq!(calculate_fit_dimensions((1000, 333), (300, 300)), (300, 100));
    }

    #[test]
    fn fit_extreme_panorama_keeps_one_pixel() {
        assert_eq!(calculate_fit_dimensions((10000, 2), (300, 300)), (300, 1));
    }
}
