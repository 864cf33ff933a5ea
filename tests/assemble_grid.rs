mod common;

use std::path::PathBuf;

use common::write_position_image;
use dot_grid_stitcher::config::{DetectionConfig, GridConfig};
use dot_grid_stitcher::detect::{GridPosition, count_dots};
use dot_grid_stitcher::error::StitchError;
use dot_grid_stitcher::grid::{GridEntry, assemble};
use dot_grid_stitcher::folder;

fn entry(path: impl Into<PathBuf>, row: usize, col: usize) -> GridEntry {
    GridEntry {
        path: path.into(),
        position: GridPosition { row, col },
    }
}

#[test]
fn single_entry_composite_is_exactly_that_image() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tile_path = dir.path().join("tile.png");
    write_position_image(&tile_path, 1, 1);
    let tile = image::open(&tile_path).expect("reload tile").to_rgb8();

    let out_path = dir.path().join("single_final_img.jpg");
    let composite = assemble(
        vec![entry(&tile_path, 1, 1)],
        &GridConfig::default(),
        &out_path,
    )
    .expect("assemble");

    assert_eq!(composite.dimensions(), tile.dimensions());
    assert_eq!(composite.as_raw(), tile.as_raw());
    assert!(out_path.is_file());
}

#[test]
fn empty_entries_raise_empty_grid() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out_path = dir.path().join("never_written.jpg");
    let err = assemble(Vec::new(), &GridConfig::default(), &out_path).unwrap_err();
    assert!(matches!(err, StitchError::EmptyGrid));
    assert!(!out_path.exists());
}

#[test]
fn missing_tile_aborts_with_image_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ghost = dir.path().join("ghost.png");
    let out_path = dir.path().join("never_written.jpg");
    let err = assemble(
        vec![entry(&ghost, 1, 1)],
        &GridConfig::default(),
        &out_path,
    )
    .unwrap_err();
    match err {
        StitchError::ImageLoad { path, .. } => assert_eq!(path, ghost),
        other => panic!("expected ImageLoad, got {other}"),
    }
}

#[test]
fn end_to_end_folder_becomes_a_two_by_two_composite() {
    let dir = tempfile::tempdir().expect("tempdir");
    // Names chosen so enumeration order differs from grid order.
    write_position_image(&dir.path().join("a.png"), 2, 2);
    write_position_image(&dir.path().join("b.png"), 1, 1);
    write_position_image(&dir.path().join("c.png"), 2, 1);
    write_position_image(&dir.path().join("d.png"), 1, 2);

    let detection = DetectionConfig::default();
    let mut entries = Vec::new();
    for path in folder::scan(dir.path()).expect("scan") {
        let img = image::open(&path).expect("load fixture");
        let position = count_dots(&img, &detection).into_position();
        entries.push(GridEntry { path, position });
    }

    let positions: Vec<(usize, usize)> = entries
        .iter()
        .map(|e| (e.position.row, e.position.col))
        .collect();
    assert_eq!(positions, [(2, 2), (1, 1), (2, 1), (1, 2)]);

    let out_path = dir.path().join("dataset_final_img.jpg");
    let composite = assemble(entries, &GridConfig::default(), &out_path).expect("assemble");

    // Max row is 2, so the forced-square grid is 2x2 of 300x140 tiles.
    assert_eq!(composite.dimensions(), (600, 280));
    assert!(out_path.is_file());
}
