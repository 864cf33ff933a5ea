//! Infers a grid position for each image in a folder by counting blue and red
//! calibration dots, then stitches the images into one composite grid image.
//!
//! The blue dot count is the row index and the red dot count the column
//! index. Detection runs color thresholding, dilation, and Hough-style circle
//! detection per image; assembly sorts the images by (row, col) and tiles
//! them onto a single canvas.

pub mod config;
pub mod detect;
pub mod error;
pub mod folder;
pub mod grid;
pub mod hough;

pub use config::{ColorRange, DetectionConfig, GridConfig, OverflowPolicy};
pub use detect::{DotCount, GridPosition, count_dots};
pub use error::StitchError;
pub use grid::{CompositeLayout, GridEntry, assemble, build_layout, render};
pub use hough::HoughCircleParams;
