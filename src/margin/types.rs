//! Margin module core types
//!
//! Contains the color, tolerance and crop box types shared by the
//! estimator, scanner and crop executor.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

// ============================================================
// Constants
// ============================================================

/// Default tolerance for single-image trimming
pub const DEFAULT_TOLERANCE: u8 = 10;

/// Default tolerance used by the batch `trim` command
pub const DEFAULT_BATCH_TOLERANCE: u8 = 150;

/// Brightness midpoint separating "light" from "dark" corner averages
const BRIGHTNESS_MIDPOINT: f64 = 127.5;

// ============================================================
// Error Types
// ============================================================

/// Trimming error types
#[derive(Debug, Error)]
pub enum TrimError {
    #[error("Image not found: {0}")]
    ImageNotFound(PathBuf),

    #[error("Failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid margin color: {0}")]
    ColorParse(String),

    #[error("Cannot scan degenerate image ({width}x{height})")]
    Scan { width: u32, height: u32 },

    #[error("Failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrimError>;

// ============================================================
// Color
// ============================================================

/// An 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);
    pub const BLACK: RgbColor = RgbColor::new(0, 0, 0);

    /// Create a color from its channels
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Channels as an array
    pub fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Squared Euclidean distance to another color
    #[inline]
    pub fn distance_sq(&self, other: &RgbColor) -> u32 {
        let dr = self.r.abs_diff(other.r) as u32;
        let dg = self.g.abs_diff(other.g) as u32;
        let db = self.b.abs_diff(other.b) as u32;
        dr * dr + dg * dg + db * db
    }

    /// Whether the average channel value lies above the midpoint
    pub fn is_light(&self) -> bool {
        let sum = self.r as f64 + self.g as f64 + self.b as f64;
        sum / 3.0 > BRIGHTNESS_MIDPOINT
    }
}

impl From<image::Rgb<u8>> for RgbColor {
    fn from(pixel: image::Rgb<u8>) -> Self {
        let [r, g, b] = pixel.0;
        Self { r, g, b }
    }
}

impl From<RgbColor> for image::Rgb<u8> {
    fn from(color: RgbColor) -> Self {
        image::Rgb(color.channels())
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for RgbColor {
    type Err = TrimError;

    /// Parse `#RRGGBB` or `RRGGBB` (case-insensitive)
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TrimError::ColorParse(format!(
                "expected 6 hex digits like #ffffff, got '{}'",
                s
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|e| TrimError::ColorParse(format!("'{}': {}", s, e)))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

// ============================================================
// Tolerance
// ============================================================

/// Maximum color distance for a pixel to still count as margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tolerance(pub u8);

impl Tolerance {
    /// Squared threshold compared against squared color distance
    #[inline]
    pub fn squared(self) -> u32 {
        let t = self.0 as u32;
        t * t
    }

    /// Raw tolerance value
    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance(DEFAULT_TOLERANCE)
    }
}

impl From<u8> for Tolerance {
    fn from(value: u8) -> Self {
        Tolerance(value)
    }
}

impl fmt::Display for Tolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================
// Crop Box
// ============================================================

/// Half-open content rectangle `[left, right) x [top, bottom)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropBox {
    /// Box covering a whole image
    pub fn full(width: u32, height: u32) -> Self {
        Self {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether this box covers the entire image (no-op crop)
    pub fn is_full(&self, width: u32, height: u32) -> bool {
        *self == Self::full(width, height)
    }

    /// Check the box is non-empty and lies inside the image
    pub fn is_valid_for(&self, width: u32, height: u32) -> bool {
        self.left < self.right
            && self.right <= width
            && self.top < self.bottom
            && self.bottom <= height
    }
}

impl fmt::Display for CropBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}
