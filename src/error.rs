//! Error taxonomy for the dot-counting and grid-assembly pipeline.

use std::path::PathBuf;

/// Errors that can occur while counting dots and assembling the composite grid.
///
/// The pipeline is fail-fast: any image-level failure aborts the whole run,
/// since a composite grid with a missing tile has no well-defined placement.
#[derive(Debug, thiserror::Error)]
pub enum StitchError {
    #[error("failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("empty grid: no usable images to assemble")]
    EmptyGrid,

    #[error("invalid detection config: {0}")]
    InvalidConfig(String),

    #[error("failed to read input folder {path}: {source}")]
    FolderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("grid holds {capacity} cells but {entries} images were given")]
    GridOverflow { capacity: usize, entries: usize },

    #[error("failed to write composite {path}: {source}")]
    CompositeWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
