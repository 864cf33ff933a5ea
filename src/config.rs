//! Tunable configuration for dot detection and grid layout.
//!
//! Defaults carry the stock tuning for the blue/red calibration dots; a
//! JSON file can override any subset of fields for per-dataset tuning. All
//! bounds are validated once at startup, never per image.

use std::fs;
use std::path::Path;

use image::Rgb;
use serde::Deserialize;

use crate::error::StitchError;
use crate::hough::HoughCircleParams;

/// Inclusive per-channel RGB intensity range identifying one dot color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub fn contains(&self, pixel: &Rgb<u8>) -> bool {
        (0..3).all(|c| self.lower[c] <= pixel[c] && pixel[c] <= self.upper[c])
    }

    fn validate(&self, name: &str) -> Result<(), StitchError> {
        for c in 0..3 {
            if self.lower[c] > self.upper[c] {
                return Err(StitchError::InvalidConfig(format!(
                    "{name} range: lower bound {} exceeds upper bound {} in channel {c}",
                    self.lower[c], self.upper[c]
                )));
            }
        }
        Ok(())
    }
}

/// Detection tuning shared by every image in a run.
///
/// Dilation uses a small square kernel applied over several iterations
/// (radius 1, two passes by default); a larger kernel with fewer passes is an
/// equally valid tuning reachable through `dilate_radius`/`dilate_iterations`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Blue dot range; the blue count becomes the row index.
    pub blue: ColorRange,
    /// Red dot range; the red count becomes the column index.
    pub red: ColorRange,
    /// Median smoothing radius (1 means a 3x3 neighborhood).
    pub median_radius: u32,
    /// Structuring-element radius for dilation (1 means a 3x3 square).
    pub dilate_radius: u8,
    pub dilate_iterations: u32,
    pub hough: HoughCircleParams,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            blue: ColorRange {
                lower: [0, 0, 200],
                upper: [20, 20, 255],
            },
            red: ColorRange {
                lower: [200, 0, 0],
                upper: [255, 20, 20],
            },
            median_radius: 1,
            dilate_radius: 1,
            dilate_iterations: 2,
            hough: HoughCircleParams::default(),
        }
    }
}

impl DetectionConfig {
    pub fn validate(&self) -> Result<(), StitchError> {
        self.blue.validate("blue")?;
        self.red.validate("red")?;
        if self.hough.max_radius < self.hough.min_radius {
            return Err(StitchError::InvalidConfig(format!(
                "max_radius {} is below min_radius {}",
                self.hough.max_radius, self.hough.min_radius
            )));
        }
        if self.hough.accumulator_scale < 1.0 {
            return Err(StitchError::InvalidConfig(format!(
                "accumulator_scale {} must be at least 1",
                self.hough.accumulator_scale
            )));
        }
        if self.hough.min_center_distance <= 0.0 {
            return Err(StitchError::InvalidConfig(
                "min_center_distance must be positive".to_string(),
            ));
        }
        if self.hough.center_threshold == 0 {
            return Err(StitchError::InvalidConfig(
                "center_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads a config from a JSON file; missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, StitchError> {
        let text = fs::read_to_string(path).map_err(|source| StitchError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self =
            serde_json::from_str(&text).map_err(|source| StitchError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }
}

/// What to do when more images arrive than the tile grid has cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Drop trailing entries.
    #[default]
    Truncate,
    /// Refuse to assemble.
    Error,
}

/// Layout options for the composite grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridConfig {
    /// When set, both grid dimensions use the maximum observed row value.
    /// When cleared the column extent uses the maximum observed column
    /// instead.
    pub force_square: bool,
    pub overflow: OverflowPolicy,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            force_square: true,
            overflow: OverflowPolicy::Truncate,
        }
    }
}
