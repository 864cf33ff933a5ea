use std::path::PathBuf;
use std::process;

use clap::Parser;

use dot_grid_stitcher::config::{DetectionConfig, GridConfig, OverflowPolicy};
use dot_grid_stitcher::detect::count_dots;
use dot_grid_stitcher::error::StitchError;
use dot_grid_stitcher::folder;
use dot_grid_stitcher::grid::{GridEntry, assemble};

#[derive(Parser, Debug)]
#[command(
    name = "stitch",
    about = "Count blue/red calibration dots per image and stitch a composite grid",
    version
)]
struct Cli {
    /// Directory whose direct children are the candidate images
    #[arg(long = "input_folder")]
    input_folder: PathBuf,

    /// Optional JSON file overriding detection parameters
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Size the grid max(row) x max(col) instead of the square max(row) extent
    #[arg(long = "exact-grid")]
    exact_grid: bool,

    /// Fail instead of silently dropping images that exceed the grid capacity
    #[arg(long = "strict-capacity")]
    strict_capacity: bool,
}

fn run(cli: &Cli) -> Result<(), StitchError> {
    let detection = match &cli.config {
        Some(path) => DetectionConfig::from_json_file(path)?,
        None => {
            let config = DetectionConfig::default();
            config.validate()?;
            config
        }
    };
    let layout = GridConfig {
        force_square: !cli.exact_grid,
        overflow: if cli.strict_capacity {
            OverflowPolicy::Error
        } else {
            OverflowPolicy::Truncate
        },
    };

    let paths = folder::scan(&cli.input_folder)?;

    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let img = image::open(&path).map_err(|source| StitchError::ImageLoad {
            path: path.clone(),
            source,
        })?;
        let count = count_dots(&img, &detection);
        let position = count.into_position();
        println!("{}: row {} col {}", path.display(), position.row, position.col);
        entries.push(GridEntry { path, position });
    }

    let out_path = folder::output_name(&cli.input_folder);
    let composite = assemble(entries, &layout, &out_path)?;
    println!(
        "wrote {} ({}x{})",
        out_path.display(),
        composite.width(),
        composite.height()
    );
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        eprintln!("{err}");
        process::exit(1);
    }
}
