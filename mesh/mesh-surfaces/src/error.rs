//! Error types for surface detection.

use thiserror::Error;

/// Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors that can occur while splitting a mesh into surfaces.
///
/// All of these are structural problems with one mesh. They are
/// deterministic, so retrying the same input gives the same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// A face references a vertex that does not exist.
    #[error("face {face} references invalid vertex index {index} (mesh has {vertex_count} vertices)")]
    InvalidIndex {
        /// The face holding the bad index.
        face: usize,
        /// The invalid index.
        index: u32,
        /// Total number of vertices in the mesh.
        vertex_count: usize,
    },

    /// A directed edge is claimed by two faces.
    ///
    /// Raised while building the edge index when two faces produce the same
    /// directed edge (inconsistent winding, duplicated geometry, or an edge
    /// shared by three or more faces), and during traversal when an edge's
    /// reverse belongs to a face already assigned to another surface.
    #[error(
        "malformed mesh: directed edge {source_vertex}->{dest_vertex} is claimed by faces {first_face} and {second_face}"
    )]
    MalformedIndex {
        /// Source vertex of the offending edge.
        source_vertex: u32,
        /// Destination vertex of the offending edge.
        dest_vertex: u32,
        /// Face that claimed the edge first.
        first_face: usize,
        /// Face that claimed it again.
        second_face: usize,
    },

    /// Traversal ended with faces that were never reached nor seeded.
    ///
    /// This is an internal invariant check and indicates a bug in seed
    /// iteration, not bad input.
    #[error("surface traversal left {count} faces unassigned (first: face {first_face})")]
    OrphanFaces {
        /// Number of unassigned faces.
        count: usize,
        /// Lowest unassigned face index.
        first_face: usize,
    },
}
