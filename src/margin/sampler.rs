//! Pixel sampling
//!
//! The scanner and estimator read pixels through [`PixelSampler`] so they
//! stay independent of the concrete image buffer.

use image::{DynamicImage, RgbImage};

use super::types::RgbColor;

/// Read access to an RGB pixel grid
pub trait PixelSampler {
    /// Image dimensions as (width, height)
    fn dimensions(&self) -> (u32, u32);

    /// Color at (x, y). Callers keep coordinates in bounds.
    fn sample(&self, x: u32, y: u32) -> RgbColor;

    /// Corner colors in order: top-left, top-right, bottom-left, bottom-right
    fn corners(&self) -> [RgbColor; 4] {
        let (width, height) = self.dimensions();
        let (max_x, max_y) = (width.saturating_sub(1), height.saturating_sub(1));
        [
            self.sample(0, 0),
            self.sample(max_x, 0),
            self.sample(0, max_y),
            self.sample(max_x, max_y),
        ]
    }
}

impl PixelSampler for RgbImage {
    fn dimensions(&self) -> (u32, u32) {
        RgbImage::dimensions(self)
    }

    #[inline]
    fn sample(&self, x: u32, y: u32) -> RgbColor {
        RgbColor::from(*self.get_pixel(x, y))
    }
}

/// Normalize any decoded image to 8-bit RGB, dropping alpha and palette data
pub fn to_rgb(image: DynamicImage) -> RgbImage {
    match image {
        DynamicImage::ImageRgb8(rgb) => rgb,
        other => other.to_rgb8(),
    }
}
