//! Recursive image discovery
//!
//! [`ImageWalker`] yields every supported image below a root directory.
//! Iteration is lazy across directories and can be restarted by calling
//! [`ImageWalker::iter`] again.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::margin::TEMP_FILE_PREFIX;

/// Recognized image extensions (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "tiff", "webp"];

/// Check whether a path has a supported image extension
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

/// Image file walker rooted at a directory
#[derive(Debug, Clone)]
pub struct ImageWalker {
    root: PathBuf,
}

impl ImageWalker {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Start a fresh traversal
    pub fn iter(&self) -> ImageWalk {
        ImageWalk {
            entries: WalkDir::new(&self.root)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter(),
        }
    }
}

impl IntoIterator for &ImageWalker {
    type Item = PathBuf;
    type IntoIter = ImageWalk;

    fn into_iter(self) -> ImageWalk {
        self.iter()
    }
}

/// Lazy depth-first traversal; each directory is read in full when reached
pub struct ImageWalk {
    entries: walkdir::IntoIter,
}

impl Iterator for ImageWalk {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for entry in self.entries.by_ref() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Cannot read directory entry: {}", e);
                    continue;
                }
            };

            // symlinks are reported as such with follow_links(false)
            if !entry.file_type().is_file() {
                continue;
            }
            if entry
                .file_name()
                .to_string_lossy()
                .starts_with(TEMP_FILE_PREFIX)
            {
                tracing::trace!(path = %entry.path().display(), "Skipping temporary file");
                continue;
            }
            if is_supported_image(entry.path()) {
                return Some(entry.into_path());
            }
        }
        None
    }
}
