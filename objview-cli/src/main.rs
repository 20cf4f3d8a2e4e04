//! objview - load an OBJ model or generate a cube and summarize the geometry
//!
//! Examples:
//!   objview cube --size 3
//!   objview --color 1,0.2,0.2 load model.obj
//!   objview --verbose load first.obj second.obj --flat-normals

use anyhow::{Context, Result};
use log::error;
use objview_core::MaterialColor;
use objview_cli::{write_summary, Viewer};
use std::io;
use std::path::PathBuf;
use structopt::StructOpt;

// Cli arguments
#[derive(StructOpt, Debug)]
#[structopt(name = "objview")]
struct CliArgs {
    /// Material color as r,g,b[,a] with components in 0..1
    #[structopt(short = "c", long = "color")]
    color: Option<MaterialColor>,
    /// Output debug info
    #[structopt(long = "verbose")]
    verbose: bool,
    #[structopt(subcommand)]
    command: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Generate a flat-shaded cube
    Cube {
        /// Edge length
        #[structopt(short = "s", long = "size", default_value = "2")]
        size: f32,
    },
    /// Load OBJ files in order; a file that fails to load keeps the previous model
    Load {
        #[structopt(parse(from_os_str), required = true)]
        paths: Vec<PathBuf>,
        /// Compute per-face normals when a file has no complete normal stream
        #[structopt(long = "flat-normals")]
        flat_normals: bool,
    },
}

fn main() -> Result<()> {
    let args = CliArgs::from_args();

    if !args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    } else {
        env_logger::Builder::new()
            .filter(None, log::LevelFilter::Debug)
            .init();
    }

    let mut viewer = Viewer::new();
    match args.command {
        Command::Cube { size } => {
            viewer.generate_cube(size);
        }
        Command::Load {
            paths,
            flat_normals,
        } => {
            for path in &paths {
                if let Err(err) = viewer.load_path(path, flat_normals) {
                    error!("Failed to load {}: {}", path.display(), err);
                }
            }
        }
    }

    if let Some(color) = args.color {
        viewer.change_material_color(color);
    }

    let model = viewer.model().context("No model could be loaded")?;
    write_summary(&mut io::stdout(), viewer.source(), model)?;

    Ok(())
}
