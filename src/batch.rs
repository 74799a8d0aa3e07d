//! Parallel batch trimming
//!
//! Files are dispatched lazily onto a dedicated rayon pool. Each file runs
//! the full decode/estimate/scan/crop/save pipeline on its own; a failure is
//! recorded for that file and never stops the batch.

use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

use crate::margin::{ImageTrimmer, TrimAction, TrimOptions, TrimResult};
use crate::progress::ProcessingStage;

/// Batch setup errors
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Batch options
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Per-image trimming options
    pub trim: TrimOptions,
    /// Worker count; defaults to the number of CPUs
    pub threads: Option<usize>,
}

impl BatchOptions {
    /// Effective worker count
    pub fn thread_count(&self) -> usize {
        self.threads.filter(|&n| n > 0).unwrap_or_else(num_cpus::get)
    }
}

/// Shared cancellation flag; once set no new files are started
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Callback invoked as files finish
pub trait BatchProgress: Sync {
    fn on_file_done(&self, _report: &FileReport) {}
}

/// No-op progress callback
pub struct SilentProgress;

impl BatchProgress for SilentProgress {}

/// Outcome for one file
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// Pipeline completed (trimmed, unchanged or planned)
    Done(TrimResult),
    /// Pipeline failed at `stage`
    Failed {
        stage: ProcessingStage,
        error: String,
    },
    /// Not started because the batch was cancelled
    Cancelled,
}

/// Per-file entry of a batch report
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub total: usize,
    pub trimmed: usize,
    pub unchanged: usize,
    pub planned: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub elapsed_seconds: f64,
    pub files: Vec<FileReport>,
}

impl BatchReport {
    /// Files that went through the pipeline successfully
    pub fn processed(&self) -> usize {
        self.trimmed + self.unchanged + self.planned
    }

    fn from_files(mut files: Vec<FileReport>, elapsed_seconds: f64) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));

        let mut report = BatchReport {
            total: files.len(),
            elapsed_seconds,
            ..Default::default()
        };
        for file in &files {
            match &file.outcome {
                FileOutcome::Done(result) => match result.action {
                    TrimAction::Trimmed => report.trimmed += 1,
                    TrimAction::Unchanged => report.unchanged += 1,
                    TrimAction::Planned => report.planned += 1,
                },
                FileOutcome::Failed { .. } => report.failed += 1,
                FileOutcome::Cancelled => report.cancelled += 1,
            }
        }
        report.files = files;
        report
    }

    /// Serialize the report as pretty JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Batch trimmer
pub struct BatchTrimmer {
    options: BatchOptions,
    cancel: CancelFlag,
}

impl BatchTrimmer {
    pub fn new(options: BatchOptions) -> Self {
        Self {
            options,
            cancel: CancelFlag::new(),
        }
    }

    /// Use an externally owned cancellation flag
    #[must_use]
    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Trim every path, in parallel, without stopping on failures
    pub fn run<I>(&self, paths: I, progress: &dyn BatchProgress) -> Result<BatchReport, BatchError>
    where
        I: IntoIterator<Item = PathBuf>,
        I::IntoIter: Send,
    {
        let start = Instant::now();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.thread_count())
            .thread_name(|idx| format!("pagetrim-worker-{}", idx))
            .build()?;

        let paths = paths.into_iter();
        let files: Vec<FileReport> = pool.install(|| {
            paths
                .par_bridge()
                .map(|path| {
                    let report = self.process_one(path);
                    progress.on_file_done(&report);
                    report
                })
                .collect()
        });

        Ok(BatchReport::from_files(
            files,
            start.elapsed().as_secs_f64(),
        ))
    }

    fn process_one(&self, path: PathBuf) -> FileReport {
        if self.cancel.is_cancelled() {
            tracing::debug!(path = %path.display(), "Skipped after cancellation");
            return FileReport {
                path,
                outcome: FileOutcome::Cancelled,
            };
        }

        let outcome = match ImageTrimmer::trim_file(&path, &self.options.trim) {
            Ok(result) => {
                match result.action {
                    TrimAction::Trimmed => tracing::info!(
                        "Processed and overwritten: {} ({}x{} -> {}x{})",
                        path.display(),
                        result.original_size.0,
                        result.original_size.1,
                        result.trimmed_size.0,
                        result.trimmed_size.1
                    ),
                    TrimAction::Unchanged => {
                        tracing::info!("No margin to trim: {}", path.display())
                    }
                    TrimAction::Planned => tracing::info!(
                        "Would crop {} to {}",
                        path.display(),
                        result.crop_box
                    ),
                }
                FileOutcome::Done(result)
            }
            Err(e) => {
                tracing::warn!("Error processing {}: {}", path.display(), e);
                FileOutcome::Failed {
                    stage: e.stage(),
                    error: e.to_string(),
                }
            }
        };

        FileReport { path, outcome }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::margin::Tolerance;
    use crate::walker::ImageWalker;
    use image::{Rgb, RgbImage};
    use std::path::Path;
    use std::sync::atomic::AtomicUsize;

    fn framed_page(path: &Path, border: u32, size: u32) {
        let img = RgbImage::from_fn(size, size, |x, y| {
            let inside = |v: u32| v >= border && v < size - border;
            if inside(x) && inside(y) {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        img.save(path).unwrap();
    }

    fn options(tolerance: u8) -> BatchOptions {
        BatchOptions {
            trim: TrimOptions {
                tolerance: Tolerance(tolerance),
                ..Default::default()
            },
            threads: Some(2),
        }
    }

    struct CountingProgress(AtomicUsize);

    impl BatchProgress for CountingProgress {
        fn on_file_done(&self, _report: &FileReport) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_thread_count_defaults_to_cpus() {
        let opts = BatchOptions::default();
        assert_eq!(opts.thread_count(), num_cpus::get());

        let opts = BatchOptions {
            threads: Some(0),
            ..Default::default()
        };
        assert_eq!(opts.thread_count(), num_cpus::get());

        let opts = BatchOptions {
            threads: Some(3),
            ..Default::default()
        };
        assert_eq!(opts.thread_count(), 3);
    }

    #[test]
    fn test_batch_trims_all_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        framed_page(&dir.path().join("a.png"), 5, 40);
        framed_page(&dir.path().join("sub/b.png"), 12, 60);

        let walker = ImageWalker::new(dir.path());
        let progress = CountingProgress(AtomicUsize::new(0));
        let report = BatchTrimmer::new(options(10))
            .run(walker.iter(), &progress)
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.trimmed, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(progress.0.load(Ordering::SeqCst), 2);

        let a = image::open(dir.path().join("a.png")).unwrap();
        assert_eq!((a.width(), a.height()), (30, 30));
        let b = image::open(dir.path().join("sub/b.png")).unwrap();
        assert_eq!((b.width(), b.height()), (36, 36));
    }

    #[test]
    fn test_batch_continues_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        framed_page(&dir.path().join("good.png"), 4, 20);
        std::fs::write(dir.path().join("bad.png"), b"garbage").unwrap();

        let walker = ImageWalker::new(dir.path());
        let report = BatchTrimmer::new(options(10))
            .run(walker.iter(), &SilentProgress)
            .unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.trimmed, 1);
        assert_eq!(report.failed, 1);

        let bad = report
            .files
            .iter()
            .find(|f| f.path.ends_with("bad.png"))
            .unwrap();
        assert!(matches!(
            bad.outcome,
            FileOutcome::Failed {
                stage: ProcessingStage::Decoding,
                ..
            }
        ));
        // the corrupt file is left as it was
        assert_eq!(
            std::fs::read(dir.path().join("bad.png")).unwrap(),
            b"garbage"
        );
    }

    #[test]
    fn test_cancelled_batch_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        framed_page(&dir.path().join("a.png"), 4, 20);
        framed_page(&dir.path().join("b.png"), 4, 20);
        let before = std::fs::read(dir.path().join("a.png")).unwrap();

        let trimmer = BatchTrimmer::new(options(10));
        trimmer.cancel_flag().cancel();
        let report = trimmer
            .run(ImageWalker::new(dir.path()).iter(), &SilentProgress)
            .unwrap();

        assert_eq!(report.cancelled, 2);
        assert_eq!(report.processed(), 0);
        assert_eq!(std::fs::read(dir.path().join("a.png")).unwrap(), before);
    }

    #[test]
    fn test_cancel_midway_keeps_files_intact() {
        struct CancelAfterFirst(CancelFlag);

        impl BatchProgress for CancelAfterFirst {
            fn on_file_done(&self, _report: &FileReport) {
                self.0.cancel();
            }
        }

        let dir = tempfile::tempdir().unwrap();
        for i in 0..6 {
            framed_page(&dir.path().join(format!("{}.png", i)), 3, 16);
        }

        let cancel = CancelFlag::new();
        let trimmer = BatchTrimmer::new(BatchOptions {
            threads: Some(1),
            ..options(10)
        })
        .with_cancel_flag(cancel.clone());
        let report = trimmer
            .run(
                ImageWalker::new(dir.path()).iter(),
                &CancelAfterFirst(cancel),
            )
            .unwrap();

        assert_eq!(report.total, 6);
        assert!(report.trimmed >= 1);
        assert_eq!(report.trimmed + report.cancelled, 6);

        // every file is either fully trimmed or untouched
        for file in &report.files {
            let img = image::open(&file.path).unwrap();
            match file.outcome {
                FileOutcome::Done(_) => assert_eq!(img.width(), 10),
                FileOutcome::Cancelled => assert_eq!(img.width(), 16),
                FileOutcome::Failed { .. } => panic!("unexpected failure"),
            }
        }
    }

    #[test]
    fn test_dry_run_batch_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        framed_page(&path, 4, 20);
        let before = std::fs::read(&path).unwrap();

        let mut opts = options(10);
        opts.trim.dry_run = true;
        let report = BatchTrimmer::new(opts)
            .run(ImageWalker::new(dir.path()).iter(), &SilentProgress)
            .unwrap();

        assert_eq!(report.planned, 1);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_report_json() {
        let dir = tempfile::tempdir().unwrap();
        framed_page(&dir.path().join("a.png"), 4, 20);
        std::fs::write(dir.path().join("bad.png"), b"garbage").unwrap();

        let report = BatchTrimmer::new(options(10))
            .run(ImageWalker::new(dir.path()).iter(), &SilentProgress)
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();

        assert_eq!(json["total"], 2);
        assert_eq!(json["trimmed"], 1);
        assert_eq!(json["failed"], 1);
        let statuses: Vec<&str> = json["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["status"].as_str().unwrap())
            .collect();
        assert!(statuses.contains(&"done"));
        assert!(statuses.contains(&"failed"));
    }

    #[test]
    fn test_empty_batch() {
        let report = BatchTrimmer::new(options(10))
            .run(Vec::<PathBuf>::new(), &SilentProgress)
            .unwrap();
        assert_eq!(report.total, 0);
        assert_eq!(report.processed(), 0);
    }
}
