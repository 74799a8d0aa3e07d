//! pagetrim - Margin trimming for scanned page images
//!
//! CLI entry point

use anyhow::Context;
use clap::Parser;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::time::Instant;
use pagetrim::{
    exit_codes,
    // Batch
    BatchProgress, BatchTrimmer, FileReport, SilentProgress,
    // CLI
    Cli, Commands, DetectArgs, MarginArgs, TrimArgs,
    // Config
    Config,
    // Margin
    CropExecutor, ImageTrimmer, DEFAULT_BATCH_TOLERANCE, DEFAULT_TOLERANCE,
    // Walking & progress
    create_progress_bar, print_summary, ImageWalker, OutputMode, SUPPORTED_EXTENSIONS,
};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Trim(args) => run_trim(&args),
        Commands::Detect(args) => run_detect(&args),
        Commands::Info => run_info(),
    };

    std::process::exit(match result {
        Ok(()) => exit_codes::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_codes::GENERAL_ERROR
        }
    });
}

fn init_logging(level: tracing::Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ============ Progress Callback Implementation ============

/// Progress bar callback for `--progress`
///
/// Failures are left to the WARN log line so each is reported once.
struct BarProgress {
    bar: ProgressBar,
}

impl BatchProgress for BarProgress {
    fn on_file_done(&self, _report: &FileReport) {
        self.bar.inc(1);
    }
}

// ============ Trim Command ============

fn run_trim(args: &TrimArgs) -> anyhow::Result<()> {
    let start_time = Instant::now();
    let mode = args.output_mode();

    init_logging(if args.progress {
        tracing::Level::WARN
    } else {
        mode.log_level()
    });

    // Validate input path
    if !args.root.exists() {
        eprintln!("Error: Input path does not exist: {}", args.root.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }
    if !args.root.is_dir() {
        eprintln!("Error: Input path is not a directory: {}", args.root.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    let config = load_config(&args.margin);
    let options = match config.batch_options(&args.overrides()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_codes::INVALID_ARGS);
        }
    };

    // Collect image files to process
    let walker = ImageWalker::new(&args.root);
    let image_paths: Vec<PathBuf> = walker.iter().collect();
    if image_paths.is_empty() {
        println!(
            "No images found in {} or its subdirectories.",
            args.root.display()
        );
        return Ok(());
    }

    if mode.should_show(OutputMode::Normal) {
        println!("Found {} images to process.", image_paths.len());
        if options.trim.dry_run {
            println!("Dry run: no files will be modified.");
        }
    }
    tracing::debug!(
        tolerance = %options.trim.tolerance,
        margin_color = ?options.trim.margin_color.map(|c| c.to_string()),
        threads = options.thread_count(),
        "Batch options"
    );

    let trimmer = BatchTrimmer::new(options);
    let report = if args.progress {
        let progress = BarProgress {
            bar: create_progress_bar(image_paths.len() as u64),
        };
        let report = trimmer.run(image_paths, &progress)?;
        progress.bar.finish_and_clear();
        report
    } else {
        trimmer.run(image_paths, &SilentProgress)?
    };

    print_summary(&report);
    println!("Processing complete.");
    println!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());

    if let Some(report_path) = &args.report {
        if let Err(e) = write_report(report_path, &report.to_json()) {
            eprintln!("Error: {:#}", e);
            std::process::exit(exit_codes::OUTPUT_ERROR);
        }
    }

    Ok(())
}

fn write_report(path: &Path, json: &str) -> anyhow::Result<()> {
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

// ============ Detect Command ============

fn run_detect(args: &DetectArgs) -> anyhow::Result<()> {
    init_logging(tracing::Level::INFO);

    if !args.image.exists() {
        eprintln!("Error: Input path does not exist: {}", args.image.display());
        std::process::exit(exit_codes::INPUT_NOT_FOUND);
    }

    let config = load_config(&args.margin);
    let options = match config.single_options(&args.overrides()) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(exit_codes::INVALID_ARGS);
        }
    };

    let (image, format) = CropExecutor::load(&args.image)?;
    let (width, height) = image.dimensions();
    let (margin_color, crop_box) = ImageTrimmer::analyze(&image, &options)?;

    println!("Image:        {}", args.image.display());
    println!("Format:       {:?}", format);
    println!("Size:         {}x{}", width, height);
    println!(
        "Margin color: {}{}",
        margin_color,
        if options.margin_color.is_some() { " (explicit)" } else { " (sampled)" }
    );
    println!("Tolerance:    {}", options.tolerance);
    println!("Crop box:     {}", crop_box);
    println!("Content size: {}x{}", crop_box.width(), crop_box.height());
    if crop_box.is_full(width, height) {
        println!("No margin to trim.");
    }

    Ok(())
}

// ============ Info Command ============

fn run_info() -> anyhow::Result<()> {
    println!("pagetrim v{}", env!("CARGO_PKG_VERSION"));
    println!();

    println!("System Information:");
    println!("  Platform: {}", std::env::consts::OS);
    println!("  Arch: {}", std::env::consts::ARCH);
    println!("  CPUs: {}", num_cpus::get());

    println!();
    println!("Supported Extensions:");
    println!("  {}", SUPPORTED_EXTENSIONS.join(" "));

    println!();
    println!("Default Tolerance:");
    println!("  trim (batch):  {}", DEFAULT_BATCH_TOLERANCE);
    println!("  detect:        {}", DEFAULT_TOLERANCE);

    println!();
    println!("Config File Locations:");
    for path in Config::search_paths() {
        println!("  {}", path.display());
    }

    Ok(())
}

// ============ Helper Functions ============

/// Load the explicit config file, or search the default locations
fn load_config(args: &MarginArgs) -> Config {
    match &args.config {
        Some(config_path) => match Config::load_from_path(config_path) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("Error: Failed to load config file: {}", e);
                std::process::exit(exit_codes::INVALID_ARGS);
            }
        },
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring config file: {}", e);
            Config::default()
        }),
    }
}
