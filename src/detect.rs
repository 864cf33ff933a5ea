//! Counts blue and red calibration dots in a single image.
//!
//! Per image: one shared median blur, then per color an inclusive in-range
//! mask, square-kernel dilation to heal anti-aliased dot edges, and circle
//! detection over the mask. The blue count is read downstream as the row
//! index and the red count as the column index.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use imageproc::distance_transform::Norm;
use imageproc::filter::median_filter;
use imageproc::morphology::dilate;

use crate::config::{ColorRange, DetectionConfig};
use crate::hough::detect_circles;

/// Number of detected dots per color for one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DotCount {
    pub blue: usize,
    pub red: usize,
}

impl DotCount {
    pub fn into_position(self) -> GridPosition {
        GridPosition {
            row: self.blue,
            col: self.red,
        }
    }
}

/// A dot count reinterpreted as a tile-grid coordinate. Zero is a valid,
/// degenerate position meaning no dots were detected for that color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

/// Counts blue and red dots in `image`.
///
/// Pure and deterministic: the same image and config always produce the same
/// counts. An image without matching pixels simply counts zero; load failures
/// are the caller's concern.
pub fn count_dots(image: &DynamicImage, config: &DetectionConfig) -> DotCount {
    let rgb = image.to_rgb8();
    let blurred = median_filter(&rgb, config.median_radius, config.median_radius);

    DotCount {
        blue: count_color(&blurred, &config.blue, config),
        red: count_color(&blurred, &config.red, config),
    }
}

fn count_color(rgb: &RgbImage, range: &ColorRange, config: &DetectionConfig) -> usize {
    let mask = in_range_mask(rgb, range);
    let mask = dilate_mask(mask, config.dilate_radius, config.dilate_iterations);
    detect_circles(&mask, &config.hough).len()
}

/// Binary mask: a pixel is on iff every channel lies within the range.
fn in_range_mask(rgb: &RgbImage, range: &ColorRange) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        if range.contains(rgb.get_pixel(x, y)) {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

fn dilate_mask(mut mask: GrayImage, radius: u8, iterations: u32) -> GrayImage {
    if radius == 0 {
        return mask;
    }
    for _ in 0..iterations {
        mask = dilate(&mask, Norm::LInf, radius);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn white_image(width: u32, height: u32) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))
    }

    fn draw_disc(img: &mut RgbImage, cx: i32, cy: i32, r: i32, color: Rgb<u8>) {
        for y in 0..img.height() as i32 {
            for x in 0..img.width() as i32 {
                let dx = x - cx;
                let dy = y - cy;
                if dx * dx + dy * dy <= r * r {
                    img.put_pixel(x as u32, y as u32, color);
                }
            }
        }
    }

    #[test]
    fn plain_image_counts_zero_for_both_colors() {
        let img = DynamicImage::ImageRgb8(white_image(96, 96));
        let count = count_dots(&img, &DetectionConfig::default());
        assert_eq!(count, DotCount { blue: 0, red: 0 });
    }

    #[test]
    fn in_range_mask_is_inclusive_per_channel() {
        let mut img = white_image(4, 1);
        img.put_pixel(0, 0, Rgb([0, 0, 200]));
        img.put_pixel(1, 0, Rgb([20, 20, 255]));
        img.put_pixel(2, 0, Rgb([0, 0, 199]));
        let range = DetectionConfig::default().blue;
        let mask = in_range_mask(&img, &range);
        assert_eq!(mask.get_pixel(0, 0)[0], 255);
        assert_eq!(mask.get_pixel(1, 0)[0], 255);
        assert_eq!(mask.get_pixel(2, 0)[0], 0);
        assert_eq!(mask.get_pixel(3, 0)[0], 0);
    }

    #[test]
    fn dilation_grows_a_lone_pixel_into_a_square() {
        let mut mask = GrayImage::new(9, 9);
        mask.put_pixel(4, 4, Luma([255]));
        let grown = dilate_mask(mask, 1, 2);
        // Two 3x3 passes reach every pixel within Chebyshev distance 2.
        assert_eq!(grown.get_pixel(2, 2)[0], 255);
        assert_eq!(grown.get_pixel(6, 6)[0], 255);
        assert_eq!(grown.get_pixel(1, 4)[0], 0);
    }

    #[test]
    fn counts_map_blue_to_row_and_red_to_col() {
        let mut img = white_image(160, 90);
        draw_disc(&mut img, 40, 45, 7, Rgb([0, 0, 255]));
        draw_disc(&mut img, 120, 45, 7, Rgb([255, 0, 0]));
        let count = count_dots(&DynamicImage::ImageRgb8(img), &DetectionConfig::default());
        assert_eq!(count, DotCount { blue: 1, red: 1 });
        assert_eq!(count.into_position(), GridPosition { row: 1, col: 1 });
    }
}
