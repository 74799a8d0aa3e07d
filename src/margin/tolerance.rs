//! Tolerance-based margin pixel classification

use super::types::{RgbColor, Tolerance};

/// Whether `pixel` lies within `tolerance` of the margin color.
///
/// Compares squared Euclidean distance against `tolerance²`, so no square
/// root is taken per pixel.
#[inline]
pub fn is_margin(pixel: RgbColor, margin: RgbColor, tolerance: Tolerance) -> bool {
    pixel.distance_sq(&margin) <= tolerance.squared()
}
