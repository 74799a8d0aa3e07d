//! CLI interface module
//!
//! Provides command-line interface using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CliOverrides;
use crate::margin::RgbColor;
use crate::progress::OutputMode;

/// Exit codes for the CLI
///
/// A batch that visits every file exits with `Success` even when some
/// files failed; failures are reported per file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Normal completion
    Success = 0,
    /// General error
    GeneralError = 1,
    /// Invalid arguments or configuration
    InvalidArgs = 2,
    /// Input file or directory not found
    InputNotFound = 3,
    /// Output error (report file could not be written)
    OutputError = 4,
}

impl ExitCode {
    /// Convert to process exit code
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.code()
    }
}

/// Trim uniform margins from scanned page images
#[derive(Parser, Debug)]
#[command(name = "pagetrim")]
#[command(version)]
#[command(about = "Trim uniform margins from scanned page images", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Trim every image under a directory in place
    Trim(TrimArgs),
    /// Report margin color and crop box for one image without writing
    Detect(DetectArgs),
    /// Show version, defaults and config locations
    Info,
}

/// Options shared by commands that analyze images
#[derive(clap::Args, Debug, Clone)]
pub struct MarginArgs {
    /// Margin color as hex (e.g. #FFFFFF); sampled from corners when omitted
    #[arg(long, value_parser = parse_margin_color)]
    pub margin_color: Option<String>,

    /// Color tolerance (0-255); trim defaults to 150, detect to 10
    #[arg(long)]
    pub tolerance: Option<u8>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the trim command
#[derive(clap::Args, Debug)]
pub struct TrimArgs {
    /// Root directory to search for images
    pub root: PathBuf,

    #[command(flatten)]
    pub margin: MarginArgs,

    /// Number of parallel threads
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Compute crop boxes without modifying files
    #[arg(long)]
    pub dry_run: bool,

    /// Write a JSON report of every file to this path
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show a progress bar instead of per-file lines
    #[arg(long)]
    pub progress: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print failures and the summary
    #[arg(short, long)]
    pub quiet: bool,
}

impl TrimArgs {
    /// Output mode derived from -v / -q
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_flags(self.verbose, self.quiet)
    }

    /// Values that override the configuration file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            margin_color: self.margin.margin_color.clone(),
            tolerance: self.margin.tolerance,
            threads: self.threads,
            dry_run: self.dry_run,
        }
    }
}

/// Arguments for the detect command
#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    /// Image file to analyze
    pub image: PathBuf,

    #[command(flatten)]
    pub margin: MarginArgs,
}

impl DetectArgs {
    /// Values that override the configuration file
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            margin_color: self.margin.margin_color.clone(),
            tolerance: self.margin.tolerance,
            threads: None,
            dry_run: true,
        }
    }
}

/// Validate a hex color argument while keeping it as text
fn parse_margin_color(s: &str) -> Result<String, String> {
    s.parse::<RgbColor>()
        .map(|_| s.to_string())
        .map_err(|e| e.to_string())
}
