//! Margin Detection & Trimming module
//!
//! Detects the uniform margin color of a scanned page and crops the page to
//! the bounding box of everything that is not margin.
//!
//! # Pipeline
//!
//! ```text
//! decode -> estimate margin color -> scan bounds -> crop -> atomic save
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use pagetrim::{ImageTrimmer, TrimOptions};
//! use std::path::Path;
//!
//! let options = TrimOptions::builder()
//!     .margin_color_hex("#ffffff")
//!     .unwrap()
//!     .tolerance(10)
//!     .build();
//!
//! let result = ImageTrimmer::trim_file(Path::new("page.png"), &options).unwrap();
//! println!("Crop box: {}", result.crop_box);
//! ```

// Submodules
mod color;
mod crop;
mod sampler;
mod scan;
mod tolerance;
mod types;

// Re-export public API
pub use color::MarginColorEstimator;
pub use crop::{CropExecutor, TEMP_FILE_PREFIX};
pub use sampler::{to_rgb, PixelSampler};
pub use scan::BoundsScanner;
pub use tolerance::is_margin;
pub use types::{
    CropBox, Result, RgbColor, Tolerance, TrimError, DEFAULT_BATCH_TOLERANCE, DEFAULT_TOLERANCE,
};

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::progress::ProcessingStage;

// ============================================================
// Options
// ============================================================

/// Trimming options for a single image
#[derive(Debug, Clone, Default)]
pub struct TrimOptions {
    /// Explicit margin color; corner sampling is used when `None`
    pub margin_color: Option<RgbColor>,
    /// Color distance still counted as margin
    pub tolerance: Tolerance,
    /// Compute the crop box without writing anything
    pub dry_run: bool,
}

impl TrimOptions {
    /// Create a new options builder
    pub fn builder() -> TrimOptionsBuilder {
        TrimOptionsBuilder::default()
    }

    /// Options matching the batch command's default run mode
    pub fn batch_default() -> Self {
        Self {
            tolerance: Tolerance(DEFAULT_BATCH_TOLERANCE),
            ..Default::default()
        }
    }
}

/// Builder for TrimOptions
#[derive(Debug, Default)]
pub struct TrimOptionsBuilder {
    options: TrimOptions,
}

impl TrimOptionsBuilder {
    /// Set an explicit margin color
    #[must_use]
    pub fn margin_color(mut self, color: Option<RgbColor>) -> Self {
        self.options.margin_color = color;
        self
    }

    /// Parse and set an explicit margin color from `#RRGGBB`
    pub fn margin_color_hex(mut self, hex: &str) -> Result<Self> {
        self.options.margin_color = Some(hex.parse()?);
        Ok(self)
    }

    /// Set color tolerance (0-255)
    #[must_use]
    pub fn tolerance(mut self, tolerance: u8) -> Self {
        self.options.tolerance = Tolerance(tolerance);
        self
    }

    /// Enable or disable dry-run mode
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    /// Build the options
    #[must_use]
    pub fn build(self) -> TrimOptions {
        self.options
    }
}

// ============================================================
// Results
// ============================================================

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimAction {
    /// Cropped and overwritten
    Trimmed,
    /// No margin to remove; file left as is
    Unchanged,
    /// Dry run; crop box computed only
    Planned,
}

/// Result of trimming one image
#[derive(Debug, Clone, Serialize)]
pub struct TrimResult {
    #[serde(skip_serializing)]
    pub path: PathBuf,
    pub action: TrimAction,
    pub margin_color: RgbColor,
    pub crop_box: CropBox,
    pub original_size: (u32, u32),
    pub trimmed_size: (u32, u32),
}

impl TrimError {
    /// Pipeline stage this error belongs to
    pub fn stage(&self) -> ProcessingStage {
        match self {
            TrimError::ImageNotFound(_) | TrimError::Decode { .. } | TrimError::Io(_) => {
                ProcessingStage::Decoding
            }
            TrimError::ColorParse(_) => ProcessingStage::Estimating,
            TrimError::Scan { .. } => ProcessingStage::Scanning,
            TrimError::Save { .. } => ProcessingStage::Saving,
        }
    }
}

// ============================================================
// Trimmer
// ============================================================

/// Runs the full per-image pipeline
pub struct ImageTrimmer;

impl ImageTrimmer {
    /// Margin color and crop box for an in-memory image
    pub fn analyze<S: PixelSampler + ?Sized>(
        image: &S,
        options: &TrimOptions,
    ) -> Result<(RgbColor, CropBox)> {
        let margin = MarginColorEstimator::resolve(image, options.margin_color)?;
        let crop_box = BoundsScanner::find_crop_bounds(image, margin, options.tolerance)?;
        Ok((margin, crop_box))
    }

    /// Decode, trim and overwrite `path` in place
    pub fn trim_file(path: &Path, options: &TrimOptions) -> Result<TrimResult> {
        let (image, format) = CropExecutor::load(path)?;
        let original_size = image.dimensions();
        let (margin_color, crop_box) = Self::analyze(&image, options)?;

        tracing::debug!(
            path = %path.display(),
            margin = %margin_color,
            crop_box = %crop_box,
            "Content bounds found"
        );

        let action = if crop_box.is_full(original_size.0, original_size.1) {
            TrimAction::Unchanged
        } else if options.dry_run {
            TrimAction::Planned
        } else {
            let cropped = CropExecutor::crop(&image, &crop_box);
            CropExecutor::save_atomic(&cropped, path, format)?;
            TrimAction::Trimmed
        };

        Ok(TrimResult {
            path: path.to_path_buf(),
            action,
            margin_color,
            crop_box,
            original_size,
            trimmed_size: (crop_box.width(), crop_box.height()),
        })
    }
}
