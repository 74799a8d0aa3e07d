//! pagetrim - Margin trimming for scanned page images
//!
//! Detects the uniform background color around a scanned page and crops
//! the page to the bounding box of its content, in place.
//!
//! # Features
//!
//! - **Margin Detection** ([`margin`]) - Corner-based margin color estimation,
//!   tolerance classification and four-sided bounds scanning
//! - **Atomic Cropping** ([`margin::CropExecutor`]) - All-or-nothing in-place overwrite
//! - **Directory Walking** ([`walker`]) - Lazy recursive image discovery
//! - **Batch Processing** ([`batch`]) - Parallel trimming with cancellation
//! - **Configuration** ([`config`]) - TOML config files merged with CLI flags
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pagetrim::{BatchOptions, BatchTrimmer, ImageWalker, SilentProgress, TrimOptions};
//!
//! let walker = ImageWalker::new("scans");
//! let trimmer = BatchTrimmer::new(BatchOptions {
//!     trim: TrimOptions::batch_default(),
//!     threads: None,
//! });
//!
//! let report = trimmer.run(walker.iter(), &SilentProgress).unwrap();
//! println!("Processed {} of {} files", report.processed(), report.total);
//! ```
//!
//! # Architecture
//!
//! ```text
//! ImageWalker -> BatchTrimmer -> decode -> MarginColorEstimator
//!                                              |
//!                                        BoundsScanner -> CropExecutor -> overwrite
//! ```
//!
//! # License
//!
//! AGPL-3.0

pub mod batch;
pub mod cli;
pub mod config;
pub mod margin;
pub mod progress;
pub mod walker;

// Re-exports for convenience
pub use batch::{
    BatchError, BatchOptions, BatchProgress, BatchReport, BatchTrimmer, CancelFlag, FileOutcome,
    FileReport, SilentProgress,
};
pub use cli::{Cli, Commands, DetectArgs, ExitCode, MarginArgs, TrimArgs};
pub use config::{CliOverrides, Config, ConfigError};
pub use margin::{
    is_margin, BoundsScanner, CropBox, CropExecutor, ImageTrimmer, MarginColorEstimator,
    PixelSampler, RgbColor, Tolerance, TrimAction, TrimError, TrimOptions, TrimOptionsBuilder,
    TrimResult, DEFAULT_BATCH_TOLERANCE, DEFAULT_TOLERANCE,
};
pub use progress::{create_progress_bar, print_summary, OutputMode, ProcessingStage};
pub use walker::{is_supported_image, ImageWalker, SUPPORTED_EXTENSIONS};

/// Exit codes for CLI (prefer using the `ExitCode` enum)
pub mod exit_codes {
    use super::ExitCode;

    pub const SUCCESS: i32 = ExitCode::Success as i32;
    pub const GENERAL_ERROR: i32 = ExitCode::GeneralError as i32;
    pub const INVALID_ARGS: i32 = ExitCode::InvalidArgs as i32;
    pub const INPUT_NOT_FOUND: i32 = ExitCode::InputNotFound as i32;
    pub const OUTPUT_ERROR: i32 = ExitCode::OutputError as i32;
}
