//! Mesh summary shown with `--verbose`.

use std::fmt;

use mesh_types::{Aabb, IndexedMesh, Matrix3, MeshBounds, Point3};

/// Properties of a loaded STL mesh, before any vertex merging.
#[derive(Debug, Clone)]
pub struct MeshInfo {
    pub name: String,
    pub facets: usize,
    pub vertices: usize,
    pub volume: f64,
    pub center_of_mass: Option<Point3<f64>>,
    /// About the centre of mass, unit density.
    pub inertia: Option<Matrix3<f64>>,
    pub bounds: Aabb,
}

impl MeshInfo {
    pub fn from_mesh(name: &str, mesh: &IndexedMesh) -> Self {
        Self {
            name: name.to_string(),
            facets: mesh.faces.len(),
            vertices: mesh.vertices.len(),
            volume: mesh.volume(),
            center_of_mass: mesh.center_of_mass(),
            inertia: mesh.inertia_tensor(),
            bounds: mesh.bounds(),
        }
    }
}

fn fmt_point(p: &Point3<f64>) -> String {
    format!("[{}, {}, {}]", p.x, p.y, p.z)
}

impl fmt::Display for MeshInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "STL Mesh properties:")?;
        writeln!(f, "  Name = \"{}\"", self.name)?;
        writeln!(f, "  {} Facets, {} Vertexes", self.facets, self.vertices)?;
        writeln!(f, "  Volume = {}", self.volume)?;
        match &self.center_of_mass {
            Some(center) => writeln!(f, "  Center of mass = {}", fmt_point(center))?,
            None => writeln!(f, "  Center of mass = undefined (zero volume)")?,
        }
        if let Some(inertia) = &self.inertia {
            writeln!(f, "  Inertia matrix expressed at the center of mass:")?;
            for row in inertia.row_iter() {
                writeln!(f, "    [{}, {}, {}]", row[0], row[1], row[2])?;
            }
        }

        if self.bounds.is_empty() {
            writeln!(f, "  Bounding box = empty")?;
            return Ok(());
        }
        writeln!(
            f,
            "  Bounding box = {} to {}",
            fmt_point(&self.bounds.min),
            fmt_point(&self.bounds.max)
        )?;
        if !self.bounds.is_in_positive_octant() {
            writeln!(f, "  Note: model is not entirely in the positive octant")?;
        }
        Ok(())
    }
}
