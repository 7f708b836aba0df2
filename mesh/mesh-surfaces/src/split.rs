//! Split meshes into their disjoint surfaces.

use std::time::Instant;

use mesh_types::IndexedMesh;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::adjacency::EdgeIndex;
use crate::error::SurfaceResult;
use crate::extract::extract_surface;
use crate::traverse::find_surfaces;
use crate::validate::check_face_indices;

/// Split one mesh into one standalone mesh per disjoint surface.
///
/// Surfaces come out ordered by their lowest face index. Each output mesh
/// holds only the vertices its faces reference. A mesh that is a single
/// surface already comes back as one mesh equal to the input, minus any
/// unreferenced vertices.
///
/// Vertices must already be shared between adjacent faces; see
/// [`merge_duplicate_vertices`](crate::merge_duplicate_vertices) for meshes
/// loaded from STL.
///
/// # Errors
///
/// - [`SurfaceError::InvalidIndex`](crate::SurfaceError::InvalidIndex) if a
///   face references a missing vertex
/// - [`SurfaceError::MalformedIndex`](crate::SurfaceError::MalformedIndex)
///   if a directed edge is claimed twice
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology, Vertex};
/// use mesh_surfaces::split_disjoint_surfaces;
///
/// // Two cubes in one mesh
/// let mut mesh = unit_cube();
/// let offset = mesh.vertices.len() as u32;
/// let second = unit_cube();
/// mesh.vertices.extend(second.vertices.iter().map(|v| {
///     Vertex::from_coords(v.position.x + 3.0, v.position.y, v.position.z)
/// }));
/// mesh.faces.extend(second.faces.iter().map(|f| f.map(|i| i + offset)));
///
/// let parts = split_disjoint_surfaces(&mesh).unwrap();
/// assert_eq!(parts.len(), 2);
/// assert_eq!(parts[1].face_count(), 12);
/// assert_eq!(parts[1].vertex_count(), 8);
/// ```
pub fn split_disjoint_surfaces(mesh: &IndexedMesh) -> SurfaceResult<Vec<IndexedMesh>> {
    let start = Instant::now();

    check_face_indices(mesh)?;
    let index = EdgeIndex::build(&mesh.faces)?;
    debug!(
        faces = index.face_count(),
        edges = index.edge_count(),
        boundary_edges = index.boundary_edge_count(),
        "built edge index"
    );

    let surfaces = find_surfaces(&index)?;
    let parts: Vec<IndexedMesh> = surfaces
        .iter()
        .map(|surface| extract_surface(mesh, surface))
        .collect();

    info!(
        faces = mesh.faces.len(),
        surfaces = parts.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "split mesh into disjoint surfaces"
    );
    Ok(parts)
}

/// Split several independent meshes in parallel.
///
/// Results are returned in input order. A failure in one mesh does not
/// affect the others.
#[must_use]
pub fn split_meshes(meshes: &[IndexedMesh]) -> Vec<SurfaceResult<Vec<IndexedMesh>>> {
    meshes.par_iter().map(split_disjoint_surfaces).collect()
}
