//! Disjoint surface detection for indexed triangle meshes.
//!
//! One STL file may hold several separate solids in a single facet list.
//! This crate finds them and copies each into its own mesh:
//!
//! - [`edge`] packs directed edges into `u64` keys
//! - [`EdgeIndex`] maps each directed edge to the one face that owns it
//! - [`find_surfaces`] groups faces connected through reverse-edge pairs
//! - [`extract_surface`] copies one group out as a compact mesh
//! - [`split_disjoint_surfaces`] runs the whole pipeline
//!
//! Two faces belong to the same surface only if one walks an edge `a -> b`
//! and the other walks `b -> a`. Solids touching at a single vertex are
//! therefore kept apart.
//!
//! Meshes loaded from STL have three fresh vertices per facet; call
//! [`merge_duplicate_vertices`] first so adjacent faces share indices, or
//! [`merge_vertices_at_precision`] when the mesh will be written with a
//! fixed number of significant digits.
//!
//! # Example
//!
//! ```
//! use mesh_types::{IndexedMesh, Vertex};
//! use mesh_surfaces::{merge_duplicate_vertices, split_disjoint_surfaces};
//!
//! // Triangle soup: two faces of a quad, each with its own corners
//! let mut mesh = IndexedMesh::new();
//! for [x, y] in [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0], [1.0, 1.0], [0.0, 1.0]] {
//!     mesh.vertices.push(Vertex::from_coords(x, y, 0.0));
//! }
//! mesh.faces.push([0, 1, 2]);
//! mesh.faces.push([3, 4, 5]);
//!
//! // Unshared corners: each face is its own surface
//! assert_eq!(split_disjoint_surfaces(&mesh).unwrap().len(), 2);
//!
//! merge_duplicate_vertices(&mut mesh);
//! assert_eq!(split_disjoint_surfaces(&mesh).unwrap().len(), 1);
//! ```
//!
//! # Errors
//!
//! Surface detection assumes each directed edge has one owner. Meshes with
//! inconsistent winding, duplicated faces or edges shared by three faces are
//! rejected with [`SurfaceError::MalformedIndex`] rather than repaired. Use
//! [`analyze_integrity`] to inspect such meshes without failing.

#![warn(missing_docs)]
// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod adjacency;
pub mod edge;
mod error;
mod extract;
mod split;
mod traverse;
mod validate;
mod weld;

pub use adjacency::EdgeIndex;
pub use error::{SurfaceError, SurfaceResult};
pub use extract::{extract_faces, extract_surface};
pub use split::{split_disjoint_surfaces, split_meshes};
pub use traverse::{Surface, find_surfaces, find_surfaces_seeded};
pub use validate::{IntegrityReport, analyze_integrity, check_face_indices};
pub use weld::{merge_duplicate_vertices, merge_vertices_at_precision};
