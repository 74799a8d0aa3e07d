//! Margin color estimation
//!
//! The margin color is either given explicitly or inferred from the four
//! corner pixels.
//!
//! # Algorithm
//!
//! 1. Sample corners in order: top-left, top-right, bottom-left, bottom-right
//! 2. A color seen on two or more corners wins. On a 2-2 split the color
//!    whose second occurrence comes first in sampling order wins.
//! 3. Otherwise average the corners (truncating per channel). If the average
//!    is light, pick the corner closest to white, else the corner closest to
//!    black. Distance ties go to the earlier corner.

use super::sampler::PixelSampler;
use super::types::{Result, RgbColor, TrimError};

/// Minimum number of matching corners to accept a color outright
const MAJORITY_COUNT: usize = 2;

/// Margin color estimator
pub struct MarginColorEstimator;

impl MarginColorEstimator {
    /// Estimate the margin color, honoring an explicit hex override
    pub fn estimate<S: PixelSampler + ?Sized>(
        sampler: &S,
        override_color: Option<&str>,
    ) -> Result<RgbColor> {
        match override_color {
            Some(hex) => hex.parse(),
            None => Self::from_corners_of(sampler),
        }
    }

    /// Same as [`estimate`](Self::estimate) with an already parsed override
    pub fn resolve<S: PixelSampler + ?Sized>(
        sampler: &S,
        override_color: Option<RgbColor>,
    ) -> Result<RgbColor> {
        match override_color {
            Some(color) => Ok(color),
            None => Self::from_corners_of(sampler),
        }
    }

    /// Estimate the margin color from a sampler's corner pixels
    pub fn from_corners_of<S: PixelSampler + ?Sized>(sampler: &S) -> Result<RgbColor> {
        let (width, height) = sampler.dimensions();
        if width == 0 || height == 0 {
            return Err(TrimError::Scan { width, height });
        }
        Ok(Self::from_corners(&sampler.corners()))
    }

    /// Pick the margin color from four corner samples
    pub fn from_corners(corners: &[RgbColor; 4]) -> RgbColor {
        Self::majority_color(corners).unwrap_or_else(|| Self::extreme_corner(corners))
    }

    /// First color to be seen `MAJORITY_COUNT` times in sampling order
    fn majority_color(corners: &[RgbColor; 4]) -> Option<RgbColor> {
        corners.iter().enumerate().find_map(|(idx, color)| {
            let seen = corners[..=idx].iter().filter(|c| *c == color).count();
            (seen >= MAJORITY_COUNT).then_some(*color)
        })
    }

    /// Corner nearest to white or black, depending on the average brightness
    fn extreme_corner(corners: &[RgbColor; 4]) -> RgbColor {
        let mean = Self::mean_color(corners);
        let target = if mean.is_light() {
            RgbColor::WHITE
        } else {
            RgbColor::BLACK
        };

        // min_by_key keeps the first of equal elements
        corners
            .iter()
            .copied()
            .min_by_key(|c| c.distance_sq(&target))
            .unwrap_or(target)
    }

    fn mean_color(corners: &[RgbColor; 4]) -> RgbColor {
        let n = corners.len() as u32;
        let sum = corners.iter().fold([0u32; 3], |mut acc, c| {
            acc[0] += c.r as u32;
            acc[1] += c.g as u32;
            acc[2] += c.b as u32;
            acc
        });
        RgbColor::new((sum[0] / n) as u8, (sum[1] / n) as u8, (sum[2] / n) as u8)
    }
}
