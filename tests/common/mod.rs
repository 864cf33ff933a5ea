//! Synthetic calibration-dot images for integration tests.
#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use std::path::Path;

pub const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
pub const RED: Rgb<u8> = Rgb([255, 0, 0]);

pub fn draw_disc(img: &mut RgbImage, cx: i32, cy: i32, r: i32, color: Rgb<u8>) {
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

/// White image with filled blue and red discs of radius 7 at the given centers.
pub fn dot_image(width: u32, height: u32, blue: &[(i32, i32)], red: &[(i32, i32)]) -> DynamicImage {
    let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    for &(cx, cy) in blue {
        draw_disc(&mut img, cx, cy, 7, BLUE);
    }
    for &(cx, cy) in red {
        draw_disc(&mut img, cx, cy, 7, RED);
    }
    DynamicImage::ImageRgb8(img)
}

/// Writes a dot image encoding (row, col) as row blue dots and col red dots.
/// Dots sit on two well-separated horizontal bands.
pub fn write_position_image(path: &Path, row: usize, col: usize) {
    let width = 300;
    let height = 140;
    let blue: Vec<(i32, i32)> = (0..row).map(|i| (30 + 55 * i as i32, 35)).collect();
    let red: Vec<(i32, i32)> = (0..col).map(|i| (30 + 55 * i as i32, 105)).collect();
    dot_image(width, height, &blue, &red)
        .save(path)
        .expect("failed to write fixture image");
}
