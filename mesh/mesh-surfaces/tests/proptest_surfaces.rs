//! Property-based tests for surface detection.
//!
//! Meshes are assembled from closed solids placed apart from each other, so
//! the expected number of surfaces is known up front.
//!
//! Run with: cargo test -p mesh-surfaces -- proptest

#![allow(clippy::unwrap_used, clippy::cast_possible_truncation)]

use mesh_surfaces::{
    EdgeIndex, Surface, analyze_integrity, edge, find_surfaces, find_surfaces_seeded,
    merge_duplicate_vertices, split_disjoint_surfaces,
};
use mesh_types::{IndexedMesh, MeshTopology, Vertex, unit_cube};
use proptest::prelude::*;

// =============================================================================
// Strategies for generating meshes
// =============================================================================

/// Closed solids to place in a mesh.
#[derive(Debug, Clone, Copy)]
enum Solid {
    Tetrahedron,
    Cube,
}

fn solid_mesh(solid: Solid) -> IndexedMesh {
    match solid {
        Solid::Cube => unit_cube(),
        Solid::Tetrahedron => {
            let mut mesh = IndexedMesh::new();
            mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 0.0));
            mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 0.0));
            mesh.vertices.push(Vertex::from_coords(0.0, 1.0, 0.0));
            mesh.vertices.push(Vertex::from_coords(0.0, 0.0, 1.0));
            mesh.faces = vec![[0, 1, 2], [0, 3, 1], [1, 3, 2], [2, 3, 0]];
            mesh
        }
    }
}

fn arb_solid() -> impl Strategy<Value = Solid> {
    prop_oneof![Just(Solid::Tetrahedron), Just(Solid::Cube)]
}

/// Place solids two units apart along x and shuffle the combined face list.
fn arb_scene(max_solids: usize) -> impl Strategy<Value = (IndexedMesh, usize)> {
    prop::collection::vec(arb_solid(), 1..=max_solids).prop_flat_map(|solids| {
        let count = solids.len();
        let mut mesh = IndexedMesh::new();
        for (i, &solid) in solids.iter().enumerate() {
            let part = solid_mesh(solid);
            let offset = mesh.vertices.len() as u32;
            let shift = 2.0 * i as f64;
            mesh.vertices.extend(part.vertices.iter().map(|v| {
                Vertex::from_coords(v.position.x + shift, v.position.y, v.position.z)
            }));
            mesh.faces.extend(part.faces.iter().map(|f| f.map(|idx| idx + offset)));
        }

        let vertices = mesh.vertices;
        Just(mesh.faces).prop_shuffle().prop_map(move |faces| {
            (IndexedMesh::from_parts(vertices.clone(), faces), count)
        })
    })
}

/// Unconstrained random faces over a small vertex set.
fn arb_random_mesh() -> impl Strategy<Value = IndexedMesh> {
    (3u32..20).prop_flat_map(|n| {
        prop::collection::vec(prop::array::uniform3(0..n), 0..40).prop_map(move |faces| {
            let vertices = (0..n)
                .map(|i| Vertex::from_coords(f64::from(i), 0.0, 0.0))
                .collect();
            IndexedMesh::from_parts(vertices, faces)
        })
    })
}

/// Split every face into three fresh corners, as an STL loader does.
fn explode(mesh: &IndexedMesh) -> IndexedMesh {
    let mut soup = IndexedMesh::new();
    for face in &mesh.faces {
        let base = soup.vertices.len() as u32;
        for &idx in face {
            soup.vertices.push(mesh.vertices[idx as usize]);
        }
        soup.faces.push([base, base + 1, base + 2]);
    }
    soup
}

fn partition(surfaces: &[Surface]) -> Vec<Vec<usize>> {
    let mut sets: Vec<Vec<usize>> = surfaces.iter().map(|s| s.faces().to_vec()).collect();
    sets.sort();
    sets
}

// =============================================================================
// Property Tests: Edge Keys
// =============================================================================

proptest! {
    /// Reversing twice gives back the original edge.
    #[test]
    fn reverse_is_an_involution(a in any::<u32>(), b in any::<u32>()) {
        let key = edge::encode(a, b);
        prop_assert_eq!(edge::reverse(edge::reverse(key)), key);
        prop_assert_eq!(edge::decode(edge::reverse(key)), (b, a));
    }
}

// =============================================================================
// Property Tests: Traversal
// =============================================================================

proptest! {
    /// Every face lands in exactly one surface.
    #[test]
    fn surfaces_partition_faces((mesh, _) in arb_scene(6)) {
        let index = EdgeIndex::build(&mesh.faces).unwrap();
        let surfaces = find_surfaces(&index).unwrap();

        let mut seen: Vec<usize> = surfaces.iter().flat_map(|s| s.faces().to_vec()).collect();
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..mesh.face_count()).collect::<Vec<_>>());
    }

    /// One surface per placed solid, regardless of face order.
    #[test]
    fn one_surface_per_solid((mesh, solids) in arb_scene(6)) {
        let index = EdgeIndex::build(&mesh.faces).unwrap();
        prop_assert_eq!(find_surfaces(&index).unwrap().len(), solids);
    }

    /// No edge connects two different surfaces.
    #[test]
    fn surfaces_are_closed_under_adjacency((mesh, _) in arb_scene(4)) {
        let index = EdgeIndex::build(&mesh.faces).unwrap();
        for surface in find_surfaces(&index).unwrap() {
            for &face in surface.faces() {
                for key in index.edges_of(face) {
                    if let Some(neighbor) = index.neighbor_across(key) {
                        prop_assert!(surface.faces().binary_search(&neighbor).is_ok());
                    }
                }
            }
        }
    }

    /// The partition does not depend on which faces are seeded first.
    #[test]
    fn partition_is_seed_order_independent(
        (mesh, _) in arb_scene(5),
        seeds in prop::collection::vec(0usize..60, 0..20),
    ) {
        let index = EdgeIndex::build(&mesh.faces).unwrap();
        let ascending = find_surfaces(&index).unwrap();
        let seeded = find_surfaces_seeded(&index, seeds).unwrap();
        let descending = find_surfaces_seeded(&index, (0..mesh.face_count()).rev()).unwrap();

        prop_assert_eq!(partition(&ascending), partition(&seeded));
        prop_assert_eq!(partition(&ascending), partition(&descending));
    }

    /// Arbitrary face lists either split cleanly or are rejected; never a panic.
    #[test]
    fn random_meshes_never_panic(mesh in arb_random_mesh()) {
        if let Ok(parts) = split_disjoint_surfaces(&mesh) {
            let total: usize = parts.iter().map(|p| p.face_count()).sum();
            prop_assert_eq!(total, mesh.face_count());
        }
        let _ = analyze_integrity(&mesh);
    }
}

// =============================================================================
// Property Tests: Extraction
// =============================================================================

proptest! {
    /// Output meshes hold exactly the vertices their faces reference.
    #[test]
    fn extraction_preserves_vertices((mesh, _) in arb_scene(5)) {
        let parts = split_disjoint_surfaces(&mesh).unwrap();

        let faces: usize = parts.iter().map(|p| p.face_count()).sum();
        let vertices: usize = parts.iter().map(|p| p.vertex_count()).sum();
        prop_assert_eq!(faces, mesh.face_count());
        prop_assert_eq!(vertices, mesh.vertex_count());

        for part in &parts {
            let mut used = vec![false; part.vertex_count()];
            for face in &part.faces {
                for &idx in face {
                    prop_assert!((idx as usize) < part.vertex_count());
                    used[idx as usize] = true;
                }
            }
            prop_assert!(used.iter().all(|&u| u));
        }
    }

    /// Every output surface is closed when the input solids are.
    #[test]
    fn extracted_solids_stay_closed((mesh, _) in arb_scene(4)) {
        for part in split_disjoint_surfaces(&mesh).unwrap() {
            prop_assert!(analyze_integrity(&part).is_closed());
        }
    }

    /// Triangle soup rejoins into the same solids after merging corners.
    #[test]
    fn soup_rejoins_after_merge((mesh, solids) in arb_scene(4)) {
        let mut soup = explode(&mesh);
        let removed = merge_duplicate_vertices(&mut soup);

        prop_assert_eq!(removed, 3 * mesh.face_count() - mesh.vertex_count());
        prop_assert_eq!(split_disjoint_surfaces(&soup).unwrap().len(), solids);
    }
}
