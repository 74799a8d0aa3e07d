//! Content bounds scanning
//!
//! Four linear scans move inward from each edge and stop at the first
//! row or column holding a non-margin pixel. Sides that never hit content
//! keep the image edge, so an all-margin image yields the full box.

use super::sampler::PixelSampler;
use super::tolerance::is_margin;
use super::types::{CropBox, Result, RgbColor, Tolerance, TrimError};

/// Bounds scanner
pub struct BoundsScanner;

impl BoundsScanner {
    /// Find the half-open box bounding all non-margin pixels
    pub fn find_crop_bounds<S: PixelSampler + ?Sized>(
        sampler: &S,
        margin: RgbColor,
        tolerance: Tolerance,
    ) -> Result<CropBox> {
        let (width, height) = sampler.dimensions();
        if width == 0 || height == 0 {
            return Err(TrimError::Scan { width, height });
        }

        let row_has_content = |y: u32, xs: std::ops::Range<u32>| {
            xs.into_iter()
                .any(|x| !is_margin(sampler.sample(x, y), margin, tolerance))
        };
        let column_has_content = |x: u32, ys: std::ops::Range<u32>| {
            ys.into_iter()
                .any(|y| !is_margin(sampler.sample(x, y), margin, tolerance))
        };

        let top = (0..height)
            .find(|&y| row_has_content(y, 0..width))
            .unwrap_or(0);

        let bottom = (0..height)
            .rev()
            .find(|&y| row_has_content(y, 0..width))
            .unwrap_or(height - 1)
            + 1;

        // Rows outside [top, bottom) are all margin, so the column scans
        // only need to look inside that band.
        let left = (0..width)
            .find(|&x| column_has_content(x, top..bottom))
            .unwrap_or(0);

        let right = (0..width)
            .rev()
            .find(|&x| column_has_content(x, top..bottom))
            .unwrap_or(width - 1)
            + 1;

        Ok(CropBox {
            left,
            top,
            right,
            bottom,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn bordered(width: u32, height: u32, content: (u32, u32, u32, u32)) -> RgbImage {
        let (left, top, right, bottom) = content;
        RgbImage::from_fn(width, height, |x, y| {
            if x >= left && x < right && y >= top && y < bottom {
                BLACK
            } else {
                WHITE
            }
        })
    }

    fn scan(img: &RgbImage, tolerance: u8) -> CropBox {
        let margin = RgbColor::from(*img.get_pixel(0, 0));
        BoundsScanner::find_crop_bounds(img, margin, Tolerance(tolerance)).unwrap()
    }

    #[test]
    fn test_centered_content() {
        let img = bordered(100, 100, (10, 10, 90, 90));
        assert_eq!(
            scan(&img, 10),
            CropBox {
                left: 10,
                top: 10,
                right: 90,
                bottom: 90
            }
        );
    }

    #[test]
    fn test_box_independent_of_border_width() {
        for border in [1u32, 3, 17, 40] {
            let size = 2 * border + 20;
            let img = bordered(size, size + 5, (border, border + 2, border + 20, border + 9));
            let bbox = scan(&img, 0);
            assert_eq!(bbox.left, border);
            assert_eq!(bbox.top, border + 2);
            assert_eq!(bbox.right, border + 20);
            assert_eq!(bbox.bottom, border + 9);
        }
    }

    #[test]
    fn test_uniform_image_keeps_full_box() {
        let img = RgbImage::from_pixel(37, 21, Rgb([120, 130, 140]));
        assert_eq!(scan(&img, 0), CropBox::full(37, 21));
    }

    #[test]
    fn test_content_touching_edges() {
        let img = bordered(50, 40, (0, 0, 50, 40));
        // uniform black: margin is black, nothing to trim
        assert_eq!(scan(&img, 10), CropBox::full(50, 40));

        let mut img = RgbImage::from_pixel(50, 40, WHITE);
        img.put_pixel(0, 0, BLACK);
        img.put_pixel(49, 39, BLACK);
        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(10)).unwrap();
        assert_eq!(bbox, CropBox::full(50, 40));
    }

    #[test]
    fn test_single_content_pixel() {
        let mut img = RgbImage::from_pixel(30, 30, WHITE);
        img.put_pixel(7, 22, BLACK);
        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(10)).unwrap();
        assert_eq!(
            bbox,
            CropBox {
                left: 7,
                top: 22,
                right: 8,
                bottom: 23
            }
        );
        assert_eq!((bbox.width(), bbox.height()), (1, 1));
    }

    #[test]
    fn test_tolerance_absorbs_near_margin_noise() {
        let mut img = bordered(40, 40, (10, 10, 30, 30));
        // light gray specks in the border
        img.put_pixel(2, 2, Rgb([250, 250, 250]));
        img.put_pixel(37, 35, Rgb([248, 252, 250]));

        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(10)).unwrap();
        assert_eq!(
            bbox,
            CropBox {
                left: 10,
                top: 10,
                right: 30,
                bottom: 30
            }
        );

        // zero tolerance treats the specks as content
        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(0)).unwrap();
        assert_eq!(
            bbox,
            CropBox {
                left: 2,
                top: 2,
                right: 38,
                bottom: 36
            }
        );
    }

    #[test]
    fn test_single_pixel_image() {
        let img = RgbImage::from_pixel(1, 1, BLACK);
        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(0)).unwrap();
        assert_eq!(bbox, CropBox::full(1, 1));

        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::BLACK, Tolerance(0)).unwrap();
        assert_eq!(bbox, CropBox::full(1, 1));
    }

    #[test]
    fn test_single_row_and_column_images() {
        let mut row = RgbImage::from_pixel(10, 1, WHITE);
        row.put_pixel(4, 0, BLACK);
        row.put_pixel(6, 0, BLACK);
        let bbox = BoundsScanner::find_crop_bounds(&row, RgbColor::WHITE, Tolerance(0)).unwrap();
        assert_eq!(
            bbox,
            CropBox {
                left: 4,
                top: 0,
                right: 7,
                bottom: 1
            }
        );

        let mut column = RgbImage::from_pixel(1, 10, WHITE);
        column.put_pixel(0, 9, BLACK);
        let bbox =
            BoundsScanner::find_crop_bounds(&column, RgbColor::WHITE, Tolerance(0)).unwrap();
        assert_eq!(
            bbox,
            CropBox {
                left: 0,
                top: 9,
                right: 1,
                bottom: 10
            }
        );
    }

    #[test]
    fn test_degenerate_dimensions() {
        let img = RgbImage::new(0, 0);
        let result = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(10));
        assert!(matches!(
            result,
            Err(TrimError::Scan {
                width: 0,
                height: 0
            })
        ));
    }

    #[test]
    fn test_result_always_valid() {
        let img = bordered(64, 48, (5, 6, 60, 40));
        for tolerance in [0u8, 10, 150, 255] {
            let bbox = scan(&img, tolerance);
            assert!(bbox.is_valid_for(64, 48), "tolerance {}", tolerance);
        }
    }

    #[test]
    fn test_l_shaped_content_uses_extents() {
        let mut img = RgbImage::from_pixel(50, 50, WHITE);
        for x in 5..20 {
            img.put_pixel(x, 10, BLACK);
        }
        for y in 10..45 {
            img.put_pixel(5, y, BLACK);
        }
        let bbox = BoundsScanner::find_crop_bounds(&img, RgbColor::WHITE, Tolerance(10)).unwrap();
        assert_eq!(
            bbox,
            CropBox {
                left: 5,
                top: 10,
                right: 20,
                bottom: 45
            }
        );
    }
}
