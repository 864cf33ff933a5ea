//! Assembles counted images into a single composite grid image.
//!
//! Entries are stably sorted by (row, col), placed row-major into consecutive
//! cells, and rendered onto a white canvas with zero inter-tile spacing. By
//! default both grid dimensions equal the maximum observed row value, which
//! assumes datasets with equal row and column counts; `GridConfig` can opt
//! into a max-row by max-col extent instead.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage, imageops};

use crate::config::{GridConfig, OverflowPolicy};
use crate::detect::GridPosition;
use crate::error::StitchError;

/// One image queued for placement, keyed by its source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridEntry {
    pub path: PathBuf,
    pub position: GridPosition,
}

/// A sorted set of entries plus the derived tile-grid extent.
#[derive(Debug, Clone)]
pub struct CompositeLayout {
    entries: Vec<GridEntry>,
    rows: usize,
    cols: usize,
}

impl CompositeLayout {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn entries(&self) -> &[GridEntry] {
        &self.entries
    }

    /// Entries that actually fit into the grid, in placement order.
    pub fn placed(&self) -> &[GridEntry] {
        let take = self.entries.len().min(self.rows * self.cols);
        &self.entries[..take]
    }
}

/// Sorts entries and derives the grid extent.
///
/// Ties between identical positions keep enumeration order (stable sort);
/// duplicate positions are not a dot-counting concern and must not fail here.
pub fn build_layout(
    mut entries: Vec<GridEntry>,
    config: &GridConfig,
) -> Result<CompositeLayout, StitchError> {
    if entries.is_empty() {
        return Err(StitchError::EmptyGrid);
    }

    entries.sort_by_key(|e| e.position);

    let rows = entries[entries.len() - 1].position.row;
    let cols = if config.force_square {
        rows
    } else {
        entries.iter().map(|e| e.position.col).max().unwrap_or(0)
    };

    if config.overflow == OverflowPolicy::Error && entries.len() > rows * cols {
        return Err(StitchError::GridOverflow {
            capacity: rows * cols,
            entries: entries.len(),
        });
    }

    Ok(CompositeLayout { entries, rows, cols })
}

/// Re-loads every placed image at full resolution and tiles it onto a white
/// canvas. Cell size is the largest tile width/height among placed tiles; a
/// zero-capacity layout renders a 1x1 white canvas so the write still happens.
pub fn render(layout: &CompositeLayout) -> Result<RgbImage, StitchError> {
    let mut tiles = Vec::with_capacity(layout.placed().len());
    for entry in layout.placed() {
        let img = image::open(&entry.path).map_err(|source| StitchError::ImageLoad {
            path: entry.path.clone(),
            source,
        })?;
        tiles.push(img.to_rgb8());
    }

    let (rows, cols) = layout.shape();
    if tiles.is_empty() || rows == 0 || cols == 0 {
        return Ok(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])));
    }

    let cell_w = tiles.iter().map(RgbImage::width).max().unwrap_or(1).max(1);
    let cell_h = tiles.iter().map(RgbImage::height).max().unwrap_or(1).max(1);

    let mut canvas = RgbImage::from_pixel(
        cols as u32 * cell_w,
        rows as u32 * cell_h,
        Rgb([255, 255, 255]),
    );
    for (i, tile) in tiles.iter().enumerate() {
        let row = i / cols;
        let col = i % cols;
        imageops::replace(
            &mut canvas,
            tile,
            (col as u32 * cell_w) as i64,
            (row as u32 * cell_h) as i64,
        );
    }

    Ok(canvas)
}

/// Builds the layout, renders it, writes the composite to `out_path`, and
/// returns the rendered image for display.
pub fn assemble(
    entries: Vec<GridEntry>,
    config: &GridConfig,
    out_path: &Path,
) -> Result<RgbImage, StitchError> {
    let layout = build_layout(entries, config)?;
    let composite = render(&layout)?;
    composite
        .save(out_path)
        .map_err(|source| StitchError::CompositeWrite {
            path: out_path.to_path_buf(),
            source,
        })?;
    Ok(composite)
}
