//! Indexed triangle mesh.

use crate::{Aabb, MeshBounds, MeshTopology, Vertex};
use nalgebra::{Matrix3, Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An indexed triangle mesh.
///
/// Vertices and faces are stored separately, with faces referencing
/// vertices by index. A single mesh may hold several disjoint surfaces
/// that share the vertex array.
///
/// # Winding Order
///
/// Face winding is significant: `[i0, i1, i2]` defines the directed edges
/// `i0 -> i1`, `i1 -> i2` and `i2 -> i0`. Faces use counter-clockwise
/// winding when viewed from outside.
///
/// # Example
///
/// ```
/// use mesh_types::{IndexedMesh, Vertex, MeshTopology};
///
/// let mut mesh = IndexedMesh::new();
/// mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
/// mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
/// mesh.faces.push([0, 1, 2]);
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.face_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexedMesh {
    /// Vertex data.
    pub vertices: Vec<Vertex>,

    /// Triangle faces as indices into the vertex array.
    pub faces: Vec<[u32; 3]>,
}

impl IndexedMesh {
    /// Create a new empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[inline]
    #[must_use]
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    /// Create a mesh from vertices and faces.
    #[inline]
    #[must_use]
    pub const fn from_parts(vertices: Vec<Vertex>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    /// Create a mesh from raw coordinate and index data.
    ///
    /// * `positions` - Flat array of vertex positions `[x0, y0, z0, x1, ...]`
    /// * `indices` - Flat array of face indices `[a0, b0, c0, a1, ...]`
    ///
    /// Returns an empty mesh if either slice length is not a multiple of 3.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::{IndexedMesh, MeshTopology};
    ///
    /// let positions = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
    /// let indices = [0, 1, 2];
    ///
    /// let mesh = IndexedMesh::from_raw(&positions, &indices);
    /// assert_eq!(mesh.vertex_count(), 3);
    /// assert_eq!(mesh.face_count(), 1);
    /// ```
    #[must_use]
    pub fn from_raw(positions: &[f64], indices: &[u32]) -> Self {
        if positions.len() % 3 != 0 || indices.len() % 3 != 0 {
            return Self::new();
        }

        let vertices = positions
            .chunks_exact(3)
            .map(|c| Vertex::from_coords(c[0], c[1], c[2]))
            .collect();

        let faces = indices
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Self { vertices, faces }
    }

    /// Positions of the three corners of a face, in winding order.
    ///
    /// Returns `None` if the face or any of its vertices is out of range.
    #[must_use]
    pub fn face_positions(&self, face_index: usize) -> Option<[Point3<f64>; 3]> {
        let [i0, i1, i2] = *self.faces.get(face_index)?;
        Some([
            self.vertices.get(i0 as usize)?.position,
            self.vertices.get(i1 as usize)?.position,
            self.vertices.get(i2 as usize)?.position,
        ])
    }

    /// Compute the signed volume of the mesh.
    ///
    /// Sum of the signed volumes of the tetrahedra formed by each face and
    /// the origin. Positive for a closed mesh with outward winding; only
    /// meaningful for closed meshes.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        self.tetrahedra().map(|(volume, _)| volume).sum()
    }

    /// Compute the absolute volume of the mesh.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check if the mesh appears to be inside-out (negative signed volume).
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Centre of mass of the enclosed solid, assuming uniform density.
    ///
    /// Returns `None` when the enclosed volume is zero to within rounding,
    /// e.g. for open or flat meshes. The tolerance scales with the mesh
    /// extent, so very small solids still have a centre.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::unit_cube;
    ///
    /// let com = unit_cube().center_of_mass().unwrap();
    /// assert!((com.x - 0.5).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn center_of_mass(&self) -> Option<Point3<f64>> {
        let (total, weighted) = self.volume_moments();
        if total.abs() <= self.volume_tolerance() {
            return None;
        }
        Some(Point3::from(weighted / total))
    }

    /// Inertia tensor of the enclosed solid about its centre of mass.
    ///
    /// Density is 1, so the mass equals [`volume`](Self::volume). The
    /// tensor is positive for both windings. Returns `None` when
    /// [`center_of_mass`](Self::center_of_mass) does.
    ///
    /// # Example
    ///
    /// ```
    /// use mesh_types::unit_cube;
    ///
    /// let inertia = unit_cube().inertia_tensor().unwrap();
    /// assert!((inertia[(0, 0)] - 1.0 / 6.0).abs() < 1e-12);
    /// assert!(inertia[(0, 1)].abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn inertia_tensor(&self) -> Option<Matrix3<f64>> {
        // Second moments of the tetrahedron (0, e1, e2, e3)
        let canonical = Matrix3::new(2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 2.0) / 120.0;

        let mut total = 0.0;
        let mut weighted = Vector3::zeros();
        let mut covariance = Matrix3::zeros();
        for corners in self.corner_vectors() {
            let frame = Matrix3::from_columns(&corners);
            let det = frame.determinant();
            let [v0, v1, v2] = corners;
            total += det / 6.0;
            weighted += (v0 + v1 + v2) / 4.0 * (det / 6.0);
            covariance += frame * canonical * frame.transpose() * det;
        }

        if total.abs() <= self.volume_tolerance() {
            return None;
        }
        let com = weighted / total;
        let centered = (covariance - com * com.transpose() * total) * total.signum();
        Some(Matrix3::identity() * centered.trace() - centered)
    }

    /// Signed volume and first moment of the solid about the origin.
    fn volume_moments(&self) -> (f64, Vector3<f64>) {
        self.tetrahedra()
            .fold((0.0, Vector3::zeros()), |(total, weighted), (volume, centroid)| {
                (total + volume, weighted + centroid * volume)
            })
    }

    /// Volume below which the solid counts as empty.
    fn volume_tolerance(&self) -> f64 {
        let bounds = self.bounds();
        if bounds.is_empty() {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let faces = self.faces.len() as f64;
        f64::EPSILON * bounds.size().max().powi(3) * faces
    }

    /// Signed volume and centroid of each face/origin tetrahedron.
    fn tetrahedra(&self) -> impl Iterator<Item = (f64, Vector3<f64>)> + '_ {
        self.corner_vectors().map(|[v0, v1, v2]| {
            let volume = v0.dot(&v1.cross(&v2)) / 6.0;
            (volume, (v0 + v1 + v2) / 4.0)
        })
    }

    /// Corner positions of each face, skipping faces with missing vertices.
    fn corner_vectors(&self) -> impl Iterator<Item = [Vector3<f64>; 3]> + '_ {
        (0..self.faces.len())
            .filter_map(|face| self.face_positions(face))
            .map(|corners| corners.map(|p| p.coords))
    }
}

impl MeshTopology for IndexedMesh {
    #[inline]
    fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, index: usize) -> Option<&Vertex> {
        self.vertices.get(index)
    }

    fn face(&self, index: usize) -> Option<[u32; 3]> {
        self.faces.get(index).copied()
    }

    fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.iter()
    }

    fn faces(&self) -> impl Iterator<Item = [u32; 3]> {
        self.faces.iter().copied()
    }
}

impl MeshBounds for IndexedMesh {
    fn bounds(&self) -> Aabb {
        if self.vertices.is_empty() {
            return Aabb::empty();
        }

        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }
}

/// Helper function to create a unit cube mesh.
///
/// Creates a cube from (0,0,0) to (1,1,1) with outward-facing winding.
///
/// # Example
///
/// ```
/// use mesh_types::{unit_cube, MeshTopology};
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.face_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> IndexedMesh {
    let mut mesh = IndexedMesh::with_capacity(8, 12);

    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0)); // 0
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0)); // 1
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 0.0)); // 2
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0)); // 3
    mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0)); // 4
    mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 1.0)); // 5
    mesh.vertices.push(Vertex::from_coords(1.0, 1.0, 1.0)); // 6
    mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 1.0)); // 7

    // Bottom (z=0)
    mesh.faces.push([0, 2, 1]);
    mesh.faces.push([0, 3, 2]);
    // Top (z=1)
    mesh.faces.push([4, 5, 6]);
    mesh.faces.push([4, 6, 7]);
    // Front (y=0)
    mesh.faces.push([0, 1, 5]);
    mesh.faces.push([0, 5, 4]);
    // Back (y=1)
    mesh.faces.push([3, 7, 6]);
    mesh.faces.push([3, 6, 2]);
    // Left (x=0)
    mesh.faces.push([0, 4, 7]);
    mesh.faces.push([0, 7, 3]);
    // Right (x=1)
    mesh.faces.push([1, 2, 6]);
    mesh.faces.push([1, 6, 5]);

    mesh
}
