//! Crop application and atomic in-place saving
//!
//! Encoded output goes to a hidden temporary file next to the target and is
//! renamed over it only after the write fully succeeded, so a failed save
//! leaves the original file untouched.

use image::{ImageFormat, ImageReader, RgbImage};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::sampler::to_rgb;
use super::types::{CropBox, Result, TrimError};

/// Prefix of temporary files written next to the target during a save
pub const TEMP_FILE_PREFIX: &str = ".pagetrim-";

/// Crop executor
pub struct CropExecutor;

impl CropExecutor {
    /// Decode an image file, returning its RGB pixels and detected format
    pub fn load(path: &Path) -> Result<(RgbImage, ImageFormat)> {
        if !path.exists() {
            return Err(TrimError::ImageNotFound(path.to_path_buf()));
        }

        let decode_err = |source| TrimError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let reader = ImageReader::open(path)?
            .with_guessed_format()
            .map_err(|e| decode_err(image::ImageError::IoError(e)))?;
        let format = match reader.format() {
            Some(format) => format,
            None => ImageFormat::from_path(path).map_err(decode_err)?,
        };
        let image = reader.decode().map_err(decode_err)?;

        Ok((to_rgb(image), format))
    }

    /// Copy the boxed region into a new image
    pub fn crop(image: &RgbImage, crop_box: &CropBox) -> RgbImage {
        image::imageops::crop_imm(
            image,
            crop_box.left,
            crop_box.top,
            crop_box.width(),
            crop_box.height(),
        )
        .to_image()
    }

    /// Replace `path` with `image` encoded as `format`, all or nothing
    pub fn save_atomic(image: &RgbImage, path: &Path, format: ImageFormat) -> Result<()> {
        let save_err = |source| TrimError::Save {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let suffix = path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let temp = tempfile::Builder::new()
            .prefix(TEMP_FILE_PREFIX)
            .suffix(&suffix)
            .tempfile_in(dir)
            .map_err(save_err)?;

        // Keep the original file's permissions
        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(save_err)?;
        }

        {
            let mut writer = BufWriter::new(temp.as_file());
            image
                .write_to(&mut writer, format)
                .map_err(|e| save_err(std::io::Error::other(e)))?;
            writer.flush().map_err(save_err)?;
        }
        temp.as_file().sync_all().map_err(save_err)?;

        // On error the temporary is dropped and deleted
        temp.persist(path).map_err(|e| save_err(e.error))?;
        Ok(())
    }
}
