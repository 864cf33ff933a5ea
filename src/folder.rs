//! Input-folder enumeration and output naming.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::StitchError;

/// Lists the direct file children of `dir`, sorted lexicographically so the
/// enumeration order is deterministic across platforms. File types are not
/// validated here; unreadable entries fail later at load time. An entry that
/// cannot be read at all is a `FolderRead` error: skipping it would silently
/// drop an image from the composite.
pub fn scan(dir: &Path) -> Result<Vec<PathBuf>, StitchError> {
    let read_dir = fs::read_dir(dir).map_err(|source| StitchError::FolderRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|source| StitchError::FolderRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Derives the composite filename from the input folder's first normal path
/// component, e.g. `fumo/run1` becomes `fumo_final_img.jpg` in the current
/// working directory.
pub fn output_name(input_folder: &Path) -> PathBuf {
    let stem = input_folder
        .components()
        .find_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .unwrap_or_else(|| "grid".to_string());
    PathBuf::from(format!("{stem}_final_img.jpg"))
}
