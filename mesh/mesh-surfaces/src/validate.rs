//! Mesh integrity checks.
//!
//! Reports the structural problems that keep a surface from closing:
//! vertices referenced too rarely, directed edges used twice, and edges
//! with no partner walking the other way.

use hashbrown::HashMap;
use mesh_types::IndexedMesh;

use crate::edge::{self, EdgeKey};
use crate::error::{SurfaceError, SurfaceResult};

/// Fewest faces that can meet at a vertex of a closed triangle mesh.
const MIN_CLOSED_REFERENCES: usize = 3;

/// Result of [`analyze_integrity`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegrityReport {
    /// Total number of vertices.
    pub vertex_count: usize,
    /// Total number of faces.
    pub face_count: usize,

    /// Fewest face corners referencing any one vertex.
    pub min_vertex_references: usize,
    /// Most face corners referencing any one vertex.
    pub max_vertex_references: usize,
    /// Vertices no face references.
    pub unreferenced_vertex_count: usize,
    /// Vertices referenced by fewer than three face corners, unreferenced
    /// ones included.
    pub underused_vertex_count: usize,
    /// Face corners pointing past the end of the vertex list.
    pub invalid_index_count: usize,

    /// Directed edge occurrences beyond the first for the same edge.
    pub duplicate_edge_count: usize,
    /// Directed edge occurrences with no edge walking the other way.
    pub missing_reverse_edge_count: usize,
}

impl IntegrityReport {
    /// Whether every directed edge is used once and has a reverse partner.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.duplicate_edge_count == 0 && self.missing_reverse_edge_count == 0
    }

    /// Check if any problem was found.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.underused_vertex_count > 0
            || self.invalid_index_count > 0
            || self.duplicate_edge_count > 0
            || self.missing_reverse_edge_count > 0
    }
}

impl std::fmt::Display for IntegrityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Integrity Report:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Faces: {}", self.face_count)?;
        writeln!(
            f,
            "  Each vertex is used from {} to {} times",
            self.min_vertex_references, self.max_vertex_references
        )?;
        writeln!(
            f,
            "  Closed: {}",
            if self.is_closed() { "Yes" } else { "No" }
        )?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            if self.underused_vertex_count > 0 {
                writeln!(
                    f,
                    "    Vertices with too few references to close the surface: {}",
                    self.underused_vertex_count
                )?;
            }
            if self.unreferenced_vertex_count > 0 {
                writeln!(
                    f,
                    "    Vertices not used by any face: {}",
                    self.unreferenced_vertex_count
                )?;
            }
            if self.invalid_index_count > 0 {
                writeln!(f, "    Invalid vertex references: {}", self.invalid_index_count)?;
            }
            if self.duplicate_edge_count > 0 {
                writeln!(f, "    Duplicate edges: {}", self.duplicate_edge_count)?;
            }
            if self.missing_reverse_edge_count > 0 {
                writeln!(
                    f,
                    "    Missing reverse direction edges: {}",
                    self.missing_reverse_edge_count
                )?;
            }
        }

        Ok(())
    }
}

/// Analyze vertex usage and directed edge pairing of a mesh.
///
/// Unlike building an [`EdgeIndex`](crate::EdgeIndex), this never fails:
/// malformed meshes are counted, not rejected.
///
/// # Example
///
/// ```
/// use mesh_types::unit_cube;
/// use mesh_surfaces::analyze_integrity;
///
/// let report = analyze_integrity(&unit_cube());
/// assert!(report.is_closed());
/// assert!(!report.has_issues());
/// ```
#[must_use]
pub fn analyze_integrity(mesh: &IndexedMesh) -> IntegrityReport {
    let vertex_count = mesh.vertices.len();
    let mut references = vec![0usize; vertex_count];
    let mut invalid_index_count = 0;
    let mut edge_uses: HashMap<EdgeKey, usize> = HashMap::with_capacity(mesh.faces.len() * 3);

    for &face in &mesh.faces {
        for idx in face {
            match references.get_mut(idx as usize) {
                Some(count) => *count += 1,
                None => invalid_index_count += 1,
            }
        }
        for key in edge::face_edges(face) {
            *edge_uses.entry(key).or_insert(0) += 1;
        }
    }

    let duplicate_edge_count: usize = edge_uses.values().map(|&uses| uses - 1).sum();
    let missing_reverse_edge_count: usize = edge_uses
        .iter()
        .filter(|(key, _)| !edge_uses.contains_key(&edge::reverse(**key)))
        .map(|(_, &uses)| uses)
        .sum();

    IntegrityReport {
        vertex_count,
        face_count: mesh.faces.len(),
        min_vertex_references: references.iter().copied().min().unwrap_or(0),
        max_vertex_references: references.iter().copied().max().unwrap_or(0),
        unreferenced_vertex_count: references.iter().filter(|&&n| n == 0).count(),
        underused_vertex_count: references
            .iter()
            .filter(|&&n| n < MIN_CLOSED_REFERENCES)
            .count(),
        invalid_index_count,
        duplicate_edge_count,
        missing_reverse_edge_count,
    }
}

/// Verify that every face references existing vertices.
///
/// # Errors
///
/// Returns [`SurfaceError::InvalidIndex`] for the first face corner that
/// points past the end of the vertex list.
pub fn check_face_indices(mesh: &IndexedMesh) -> SurfaceResult<()> {
    let vertex_count = mesh.vertices.len();
    for (face_idx, face) in mesh.faces.iter().enumerate() {
        if let Some(&index) = face.iter().find(|&&idx| idx as usize >= vertex_count) {
            return Err(SurfaceError::InvalidIndex {
                face: face_idx,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}
