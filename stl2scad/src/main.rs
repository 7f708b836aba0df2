//! stl2scad: convert STL meshes into OpenSCAD polyhedron modules.
//!
//! Each input file becomes one `.scad` module next to it. With `--split`,
//! every disjoint surface of the mesh gets its own module file, and a wrapper
//! file `use`s and instantiates all of them.
//!
//! # Usage
//!
//! ```text
//! stl2scad [OPTIONS] <FILE>...
//! ```

mod convert;
mod info;
mod naming;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use mesh_io::{DEFAULT_PRECISION, ScadOptions, ScadVersion};
use rayon::prelude::*;
use tracing::{Level, debug, error};
use tracing_subscriber::FmtSubscriber;

use crate::convert::Settings;

/// Convert STL files to OpenSCAD polyhedron modules
#[derive(Parser)]
#[command(name = "stl2scad")]
#[command(version, about, long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    #[allow(dead_code)]
    version: Option<bool>,

    /// Show mesh details and debug logging
    #[arg(short = 'V', long)]
    verbose: bool,

    /// Check the integrity of the model surfaces
    #[arg(short, long)]
    analyze: bool,

    /// Write each disjoint surface as its own module
    #[arg(short, long)]
    split: bool,

    /// Target OpenSCAD version (2014.03 or current)
    #[arg(short = 'C', long, default_value = "current")]
    scad_version: ScadVersion,

    /// Indentation for generated files
    #[arg(short, long, default_value = "\t")]
    indent: String,

    /// Significant digits for point coordinates
    #[arg(short, long, default_value_t = DEFAULT_PRECISION)]
    precision: usize,

    /// STL files to convert
    #[arg(required = true, name = "FILE")]
    files: Vec<PathBuf>,
}

impl Cli {
    fn settings(&self) -> Settings {
        Settings {
            verbose: self.verbose,
            analyze: self.analyze,
            split: self.split,
            scad: ScadOptions::default()
                .with_indent(self.indent.clone())
                .with_version(self.scad_version)
                .with_precision(self.precision),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    debug!("stl2scad converter version {}", env!("CARGO_PKG_VERSION"));
    let settings = cli.settings();

    // Mesh work in parallel, file output in argument order
    let prepared: Vec<_> = cli
        .files
        .par_iter()
        .map(|path| convert::prepare(path, &settings))
        .collect();

    let mut failed = 0usize;
    for (path, result) in cli.files.iter().zip(prepared) {
        let outcome = result.and_then(|model| {
            if let Some(info) = &model.info {
                println!("{info}");
            }
            if let Some(report) = &model.integrity {
                println!("{report}");
            }
            convert::write_outputs(&model, &settings.scad)
        });

        if let Err(err) = outcome {
            failed += 1;
            error!("{}: {err:#}", path.display());
        }
    }

    if failed > 0 {
        error!("{failed} of {} files failed to convert", cli.files.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
