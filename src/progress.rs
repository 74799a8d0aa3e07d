//! Progress reporting for batch trimming.
//!
//! Provides the per-file processing stages, output verbosity modes, the
//! indicatif progress bar used by the CLI and the final summary block.

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::fmt;

use crate::batch::BatchReport;

/// Per-file processing stages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ProcessingStage {
    /// Reading and decoding the image
    #[default]
    Decoding,
    /// Determining the margin color
    Estimating,
    /// Scanning for content bounds
    Scanning,
    /// Writing the cropped image back
    Saving,
}

impl ProcessingStage {
    /// Stage name
    pub fn name(&self) -> &'static str {
        match self {
            ProcessingStage::Decoding => "Decoding",
            ProcessingStage::Estimating => "Estimating",
            ProcessingStage::Scanning => "Scanning",
            ProcessingStage::Saving => "Saving",
        }
    }
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Output verbosity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Failures and summary only
    Quiet,
    /// One line per file
    #[default]
    Normal,
    /// Chosen colors and boxes
    Verbose,
    /// Everything, including walker decisions
    VeryVerbose,
}

impl OutputMode {
    /// Create OutputMode from CLI flags
    pub fn from_flags(verbosity: u8, quiet: bool) -> Self {
        if quiet {
            return OutputMode::Quiet;
        }
        match verbosity {
            0 => OutputMode::Normal,
            1 => OutputMode::Verbose,
            _ => OutputMode::VeryVerbose,
        }
    }

    /// Check if output should be shown at this mode
    pub fn should_show(&self, required: OutputMode) -> bool {
        use OutputMode::*;
        match (self, required) {
            (Quiet, _) => false,
            (Normal, Quiet | Normal) => true,
            (Verbose, Quiet | Normal | Verbose) => true,
            (VeryVerbose, _) => true,
            _ => false,
        }
    }

    /// Most detailed tracing level to emit in this mode
    pub fn log_level(&self) -> tracing::Level {
        match self {
            OutputMode::Quiet => tracing::Level::WARN,
            OutputMode::Normal => tracing::Level::INFO,
            OutputMode::Verbose => tracing::Level::DEBUG,
            OutputMode::VeryVerbose => tracing::Level::TRACE,
        }
    }
}

/// Create a styled progress bar for file processing
pub fn create_progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb
}

/// Print final summary
pub fn print_summary(report: &BatchReport) {
    println!();
    println!("{}", "=".repeat(80));
    println!("Processing Summary");
    println!("{}", "=".repeat(80));
    println!("  Total files:  {}", report.total);
    println!("  Processed:    {}", report.processed());
    println!("    Trimmed:    {}", report.trimmed);
    println!("    Unchanged:  {}", report.unchanged);
    println!("  Errors:       {}", report.failed);
    if report.cancelled > 0 {
        println!("  Cancelled:    {}", report.cancelled);
    }
    println!("{}", "=".repeat(80));
    println!();
}
