//! Surface extraction into standalone meshes.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use mesh_types::IndexedMesh;

use crate::traverse::Surface;

/// Copy one surface out of a mesh as a compact standalone mesh.
///
/// Vertices are renumbered `0..k` in the order they are first referenced
/// while walking the surface's faces; only referenced vertices are copied.
/// Face order and winding are preserved.
///
/// # Panics
///
/// Panics if a face of the surface references a vertex outside the mesh.
/// Meshes that passed [`check_face_indices`](crate::check_face_indices)
/// never do.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
/// use mesh_surfaces::{EdgeIndex, extract_surface, find_surfaces};
///
/// let cube = unit_cube();
/// let index = EdgeIndex::build(&cube.faces).unwrap();
/// let surfaces = find_surfaces(&index).unwrap();
///
/// let copy = extract_surface(&cube, &surfaces[0]);
/// assert_eq!(copy.face_count(), cube.face_count());
/// ```
#[must_use]
pub fn extract_surface(mesh: &IndexedMesh, surface: &Surface) -> IndexedMesh {
    extract_faces(mesh, surface.faces())
}

/// Copy an arbitrary list of faces out of a mesh.
///
/// Same renumbering rules as [`extract_surface`], with faces emitted in the
/// order given.
///
/// # Panics
///
/// Panics if a face index is out of range, or a face references a vertex
/// outside the mesh.
#[must_use]
pub fn extract_faces(mesh: &IndexedMesh, faces: &[usize]) -> IndexedMesh {
    let mut remap: HashMap<u32, u32> = HashMap::with_capacity(faces.len());
    let mut out = IndexedMesh::with_capacity(faces.len(), faces.len());

    for &face_idx in faces {
        let face = mesh.faces[face_idx];
        let mut new_face = [0u32; 3];
        for (slot, &old) in new_face.iter_mut().zip(&face) {
            *slot = match remap.entry(old) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    #[allow(clippy::cast_possible_truncation)]
                    // Truncation: at most as many new vertices as the u32-indexed source
                    let new_idx = out.vertices.len() as u32;
                    out.vertices.push(mesh.vertices[old as usize]);
                    *entry.insert(new_idx)
                }
            };
        }
        out.faces.push(new_face);
    }

    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::adjacency::EdgeIndex;
    use crate::traverse::find_surfaces;
    use mesh_types::{MeshTopology, Vertex};

    fn tetrahedron_mesh(offset: f64) -> IndexedMesh {
        let mut mesh = IndexedMesh::new();
        mesh.vertices.push(Vertex::from_coords(offset, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(offset + 1.0, 0.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(offset, 1.0, 0.0));
        mesh.vertices.push(Vertex::from_coords(offset, 0.0, 1.0));
        mesh.faces = vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]];
        mesh
    }

    #[test]
    fn single_surface_round_trips_unchanged() {
        let mesh = tetrahedron_mesh(0.0);
        let index = EdgeIndex::build(&mesh.faces).unwrap();
        let surfaces = find_surfaces(&index).unwrap();

        assert_eq!(extract_surface(&mesh, &surfaces[0]), mesh);
    }

    #[test]
    fn renumbers_in_first_seen_order() {
        let mut mesh = IndexedMesh::new();
        for i in 0..6 {
            mesh.vertices.push(Vertex::from_coords(f64::from(i), 0.0, 0.0));
        }
        mesh.faces = vec![[5, 3, 4], [4, 3, 1]];

        let out = extract_faces(&mesh, &[0, 1]);

        assert_eq!(out.faces, vec![[0, 1, 2], [2, 1, 3]]);
        let xs: Vec<f64> = out.vertices.iter().map(|v| v.position.x).collect();
        assert_eq!(xs, vec![5.0, 3.0, 4.0, 1.0]);
    }

    #[test]
    fn unreferenced_vertices_are_dropped() {
        let mut mesh = tetrahedron_mesh(0.0);
        mesh.vertices.push(Vertex::from_coords(9.0, 9.0, 9.0));

        let out = extract_faces(&mesh, &[0, 1, 2, 3]);
        assert_eq!(out.vertex_count(), 4);
    }

    #[test]
    fn second_surface_is_compacted() {
        let mut mesh = tetrahedron_mesh(0.0);
        let other = tetrahedron_mesh(5.0);
        mesh.vertices.extend(other.vertices.iter().copied());
        mesh.faces
            .extend(other.faces.iter().map(|f| [f[0] + 4, f[1] + 4, f[2] + 4]));

        let index = EdgeIndex::build(&mesh.faces).unwrap();
        let surfaces = find_surfaces(&index).unwrap();
        let second = extract_surface(&mesh, &surfaces[1]);

        assert_eq!(second, other);
    }

    #[test]
    fn shared_vertex_is_copied_into_both() {
        // Two tetrahedra touching at vertex 3
        let mut mesh = tetrahedron_mesh(0.0);
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 1.0));
        mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 2.0));
        mesh.faces
            .extend([[3, 4, 5], [3, 6, 4], [4, 6, 5], [5, 6, 3]]);

        let index = EdgeIndex::build(&mesh.faces).unwrap();
        let surfaces = find_surfaces(&index).unwrap();
        assert_eq!(surfaces.len(), 2);

        let first = extract_surface(&mesh, &surfaces[0]);
        let second = extract_surface(&mesh, &surfaces[1]);
        assert_eq!(first.vertex_count(), 4);
        assert_eq!(second.vertex_count(), 4);
        assert_eq!(first.vertices[3], second.vertices[0]);
    }

    #[test]
    fn empty_face_list() {
        let out = extract_faces(&tetrahedron_mesh(0.0), &[]);
        assert!(out.is_empty());
    }
}
