//! Directed edge index.
//!
//! Maps every directed edge to the one face that owns it. The neighbour
//! across an edge is found by looking up the edge's reverse, which is
//! recomputed on demand rather than stored.

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::edge::{self, EdgeKey};
use crate::error::{SurfaceError, SurfaceResult};

/// Edge ownership for one mesh. Read-only once built.
///
/// # Example
///
/// ```
/// use mesh_surfaces::{EdgeIndex, edge};
///
/// // Two triangles sharing the edge 1-2, walked in opposite directions
/// let faces = vec![[0, 1, 2], [2, 1, 3]];
/// let index = EdgeIndex::build(&faces).unwrap();
///
/// assert_eq!(index.owning_face(edge::encode(1, 2)), Some(0));
/// assert_eq!(index.owning_face(edge::encode(2, 1)), Some(1));
/// assert_eq!(index.boundary_edge_count(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct EdgeIndex {
    /// Forward directed edge to owning face.
    edge_to_face: HashMap<EdgeKey, usize>,
    /// The three directed edges of each face, in winding order.
    face_edges: Vec<[EdgeKey; 3]>,
}

impl EdgeIndex {
    /// Build the index for a list of faces.
    ///
    /// A face that repeats the same directed edge within itself (a fully
    /// collapsed triangle such as `[4, 4, 4]`) is tolerated; it simply owns
    /// that edge.
    ///
    /// # Errors
    ///
    /// Returns [`SurfaceError::MalformedIndex`] if two different faces
    /// produce the same directed edge. The existing mapping is never
    /// overwritten.
    pub fn build(faces: &[[u32; 3]]) -> SurfaceResult<Self> {
        let mut edge_to_face: HashMap<EdgeKey, usize> = HashMap::with_capacity(faces.len() * 3);
        let mut face_edges = Vec::with_capacity(faces.len());

        for (face_idx, &face) in faces.iter().enumerate() {
            let keys = edge::face_edges(face);
            for key in keys {
                match edge_to_face.entry(key) {
                    Entry::Vacant(slot) => {
                        slot.insert(face_idx);
                    }
                    Entry::Occupied(slot) if *slot.get() == face_idx => {}
                    Entry::Occupied(slot) => {
                        let (source_vertex, dest_vertex) = edge::decode(key);
                        return Err(SurfaceError::MalformedIndex {
                            source_vertex,
                            dest_vertex,
                            first_face: *slot.get(),
                            second_face: face_idx,
                        });
                    }
                }
            }
            face_edges.push(keys);
        }

        Ok(Self {
            edge_to_face,
            face_edges,
        })
    }

    /// The three directed edges of a face, in winding order.
    ///
    /// # Panics
    ///
    /// Panics if `face` is not a face of the indexed mesh.
    #[inline]
    #[must_use]
    pub fn edges_of(&self, face: usize) -> [EdgeKey; 3] {
        self.face_edges[face]
    }

    /// The face owning a forward directed edge, if any.
    #[inline]
    #[must_use]
    pub fn owning_face(&self, key: EdgeKey) -> Option<usize> {
        self.edge_to_face.get(&key).copied()
    }

    /// The face on the other side of a directed edge, if any.
    #[inline]
    #[must_use]
    pub fn neighbor_across(&self, key: EdgeKey) -> Option<usize> {
        self.owning_face(edge::reverse(key))
    }

    /// Number of indexed faces.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.face_edges.len()
    }

    /// Number of distinct directed edges.
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_to_face.len()
    }

    /// Iterate over directed edges whose reverse is owned by no face.
    pub fn boundary_edges(&self) -> impl Iterator<Item = EdgeKey> + '_ {
        self.edge_to_face
            .keys()
            .copied()
            .filter(|&key| !self.edge_to_face.contains_key(&edge::reverse(key)))
    }

    /// Count directed edges with no reverse-owning neighbour.
    #[must_use]
    pub fn boundary_edge_count(&self) -> usize {
        self.boundary_edges().count()
    }

    /// Whether every directed edge has a reverse-owning neighbour.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.boundary_edges().next().is_none()
    }
}
