//! Bounds of rotated rectangles.

use super::Size;
use crate::util::math::abs_sin_cos_deg;

/// Axis-aligned bounding box of a `width × height` rect rotated by
/// `angle_deg` about its center.
///
/// Multiples of 90 degrees are exact (dimensions kept or swapped).
pub fn rotated_bounds(size: Size, angle_deg: f64) -> Size {
    let (sin, cos) = abs_sin_cos_deg(angle_deg);
    if sin == 0.0 {
        return size;
    }
    if cos == 0.0 {
        return Size::new(size.height, size.width);
    }
    Size::new(
        size.width * cos + size.height * sin,
        size.width * sin + size.height * cos,
    )
}

/// Largest rect with aspect ratio `aspect` (width / height) whose rotation by
/// `angle_deg` fits inside `bounds`.
///
/// Returns the unrotated size. At 0 degrees this is a plain "contain" fit.
/// Empty bounds or a non-positive aspect produce an empty size.
pub fn largest_rotated_rect_within(bounds: Size, aspect: f64, angle_deg: f64) -> Size {
    if bounds.is_empty() || !aspect.is_finite() || aspect <= 0.0 {
        return Size::default();
    }
    let (sin, cos) = abs_sin_cos_deg(angle_deg);
    // Rotated footprint of a rect with height h is
    // (h * (aspect * cos + sin)) × (h * (aspect * sin + cos)).
    let h_for_width = bounds.width / (aspect * cos + sin);
    let h_for_height = bounds.height / (aspect * sin + cos);
    let height = h_for_width.min(h_for_height);
    Size::new(height * aspect, height)
}
