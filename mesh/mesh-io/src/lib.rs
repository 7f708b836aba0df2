//! Mesh file I/O for stl2scad.
//!
//! - **STL** (Stereolithography) - binary and ASCII loading, with the solid
//!   name preserved; saving is available for producing test data
//! - **OpenSCAD** - polyhedron modules and wrapper files that `use` them
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{load_stl, save_scad_module, ScadOptions};
//!
//! let solid = load_stl("model.stl").unwrap();
//! save_scad_module("model.scad", "model", &solid.mesh, &ScadOptions::default()).unwrap();
//! ```
//!
//! Output files are created, never overwritten: writing to an existing path
//! fails with [`IoError::OutputExists`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod scad;
mod stl;

pub use error::{IoError, IoResult};
pub use scad::{
    DEFAULT_PRECISION, ScadOptions, ScadVersion, WrapperEntry, format_number, save_scad_module,
    save_scad_wrapper, write_polyhedron_module, write_wrapper,
};
pub use stl::{StlSolid, load_stl, parse_stl, save_stl};
