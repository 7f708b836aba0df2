//! Duplicate vertex merging.
//!
//! STL stores three fresh corners per facet, so a loaded mesh shares no
//! vertex indices at all. Merging points with identical coordinates turns
//! that triangle soup into an indexed mesh whose faces share edges.

use std::hash::Hash;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
use mesh_types::{IndexedMesh, Vertex};
use tracing::debug;

/// Fold `-0.0` onto `0.0` so both produce the same key.
fn unsigned_zero(c: f64) -> f64 {
    if c == 0.0 { 0.0 } else { c }
}

/// Bit pattern of a position, with `-0.0` folded onto `0.0`.
fn position_key(vertex: &Vertex) -> [u64; 3] {
    vertex.coords().map(|c| unsigned_zero(c).to_bits())
}

/// Position rounded to `digits` significant decimal digits.
///
/// Two coordinates get the same key exactly when `%.<digits>g` prints them
/// the same way.
fn rounded_key(vertex: &Vertex, digits: usize) -> [String; 3] {
    let digits = digits.max(1);
    vertex
        .coords()
        .map(|c| format!("{:.*e}", digits - 1, unsigned_zero(c)))
}

/// Merge vertices whose coordinates are exactly equal.
///
/// The first occurrence of each position is kept and survivors stay in their
/// original relative order. Face indices are rewritten to point at the
/// survivors. Comparison is bitwise except that `-0.0` equals `0.0`.
///
/// Returns the number of vertices removed.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_surfaces::merge_duplicate_vertices;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // Same as 1
/// mesh.faces.push([0, 1, 2]);
/// mesh.faces.push([2, 3, 0]);
///
/// assert_eq!(merge_duplicate_vertices(&mut mesh), 1);
/// assert_eq!(mesh.faces[1], [2, 1, 0]);
/// ```
pub fn merge_duplicate_vertices(mesh: &mut IndexedMesh) -> usize {
    merge_by_key(mesh, position_key)
}

/// Merge vertices that agree to `digits` significant decimal digits.
///
/// Points that would print identically with `%.<digits>g` become one
/// vertex, so a mesh written at that precision never lists the same point
/// twice. The first occurrence keeps its full-precision coordinates. A
/// `digits` of 0 is treated as 1.
///
/// Returns the number of vertices removed.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex};
/// use mesh_surfaces::merge_vertices_at_precision;
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.000_000_000_1, 0.0, 0.0));
///
/// assert_eq!(merge_vertices_at_precision(&mut mesh, 9), 1);
/// assert_eq!(mesh.vertices[0].position.x, 1.0);
/// ```
pub fn merge_vertices_at_precision(mesh: &mut IndexedMesh, digits: usize) -> usize {
    merge_by_key(mesh, |vertex| rounded_key(vertex, digits))
}

fn merge_by_key<K, F>(mesh: &mut IndexedMesh, key: F) -> usize
where
    K: Hash + Eq,
    F: Fn(&Vertex) -> K,
{
    let original_count = mesh.vertices.len();
    if original_count == 0 {
        return 0;
    }

    let mut seen: HashMap<K, u32> = HashMap::with_capacity(original_count);
    let mut remap: Vec<u32> = Vec::with_capacity(original_count);
    let mut unique: Vec<Vertex> = Vec::with_capacity(original_count);

    for vertex in &mesh.vertices {
        let new_idx = match seen.entry(key(vertex)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                #[allow(clippy::cast_possible_truncation)]
                // Truncation: faces index vertices with u32
                let idx = unique.len() as u32;
                unique.push(*vertex);
                *entry.insert(idx)
            }
        };
        remap.push(new_idx);
    }

    let removed = original_count - unique.len();
    if removed == 0 {
        return 0;
    }

    for face in &mut mesh.faces {
        for idx in face.iter_mut() {
            // Out-of-range indices are left for check_face_indices to report
            if let Some(&new_idx) = remap.get(*idx as usize) {
                *idx = new_idx;
            }
        }
    }
    mesh.vertices = unique;

    debug!(
        before = original_count,
        after = mesh.vertices.len(),
        removed,
        "merged duplicate vertices"
    );
    removed
}
