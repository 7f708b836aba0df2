//! Disjoint surface traversal.
//!
//! Faces are connected when one owns a directed edge and the other owns its
//! reverse. A breadth-first search from each unassigned seed face collects
//! everything reachable that way into one [`Surface`]. Faces that only share
//! a vertex are never connected, so solids touching at a point stay apart.
//!
//! All traversal state lives in one [`find_surfaces`] call; nothing is
//! shared between calls.

use std::collections::VecDeque;

use hashbrown::HashSet;
use tracing::debug;

use crate::adjacency::EdgeIndex;
use crate::edge::{self, EdgeKey};
use crate::error::{SurfaceError, SurfaceResult};

/// A maximal set of faces connected through reverse-edge pairs.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    /// Face indices, ascending.
    faces: Vec<usize>,
    /// Every directed edge owned by a face of this surface.
    edges: HashSet<EdgeKey>,
}

impl Surface {
    /// Face indices of this surface, in ascending order.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[usize] {
        &self.faces
    }

    /// Number of faces in this surface.
    #[inline]
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Directed edges owned by this surface's faces.
    #[inline]
    #[must_use]
    pub fn edges(&self) -> &HashSet<EdgeKey> {
        &self.edges
    }

    /// Whether a directed edge belongs to this surface.
    #[inline]
    #[must_use]
    pub fn contains_edge(&self, key: EdgeKey) -> bool {
        self.edges.contains(&key)
    }

    /// Consume the surface, keeping only its face indices.
    #[must_use]
    pub fn into_faces(self) -> Vec<usize> {
        self.faces
    }
}

/// Partition all indexed faces into disjoint surfaces.
///
/// Seeds are taken in ascending face order, so surfaces come out ordered by
/// their lowest face index.
///
/// # Errors
///
/// Returns [`SurfaceError::MalformedIndex`] if an edge's reverse belongs to a
/// face that was already assigned to a different surface, and
/// [`SurfaceError::OrphanFaces`] if any face ends up unassigned.
///
/// # Example
///
/// ```
/// use mesh_surfaces::{EdgeIndex, find_surfaces};
///
/// // Two separate triangles
/// let index = EdgeIndex::build(&[[0, 1, 2], [3, 4, 5]]).unwrap();
/// let surfaces = find_surfaces(&index).unwrap();
///
/// assert_eq!(surfaces.len(), 2);
/// assert_eq!(surfaces[1].faces(), &[1]);
/// ```
pub fn find_surfaces(index: &EdgeIndex) -> SurfaceResult<Vec<Surface>> {
    find_surfaces_seeded(index, std::iter::empty())
}

/// Partition all indexed faces, trying the given seeds first.
///
/// Seeds that are out of range or already absorbed are skipped. Faces not
/// reached from any given seed are seeded afterwards in ascending order.
/// The resulting partition is the same for every seed order; only the order
/// of the returned surfaces changes.
///
/// # Errors
///
/// Same as [`find_surfaces`].
pub fn find_surfaces_seeded<I>(index: &EdgeIndex, seeds: I) -> SurfaceResult<Vec<Surface>>
where
    I: IntoIterator<Item = usize>,
{
    let face_count = index.face_count();
    let mut traversal = Traversal::new(index);
    let mut surfaces = Vec::new();

    let preferred = seeds.into_iter().filter(|&seed| seed < face_count);
    for seed in preferred.chain(0..face_count) {
        if traversal.remaining == 0 {
            break;
        }
        if traversal.assignment[seed].is_none() {
            surfaces.push(traversal.grow(seed, surfaces.len())?);
        }
    }

    traversal.check_complete()?;
    debug!(
        faces = face_count,
        surfaces = surfaces.len(),
        "partitioned faces into surfaces"
    );
    Ok(surfaces)
}

/// Per-call traversal state.
struct Traversal<'a> {
    index: &'a EdgeIndex,
    /// Surface id of each face, `None` while unvisited.
    assignment: Vec<Option<usize>>,
    /// Number of faces still unvisited.
    remaining: usize,
}

impl<'a> Traversal<'a> {
    fn new(index: &'a EdgeIndex) -> Self {
        Self {
            index,
            assignment: vec![None; index.face_count()],
            remaining: index.face_count(),
        }
    }

    /// Collect every face reachable from `seed` into surface `surface_id`.
    fn grow(&mut self, seed: usize, surface_id: usize) -> SurfaceResult<Surface> {
        let mut surface = Surface::default();
        // Pending edges, each with the face that owns it
        let mut queue: VecDeque<(EdgeKey, usize)> = VecDeque::new();
        self.absorb(seed, surface_id, &mut surface, &mut queue);

        while let Some((key, owner)) = queue.pop_front() {
            let reverse = edge::reverse(key);
            if surface.contains_edge(reverse) {
                continue;
            }
            let Some(neighbor) = self.index.owning_face(reverse) else {
                // Boundary edge
                continue;
            };

            match self.assignment[neighbor] {
                None => self.absorb(neighbor, surface_id, &mut surface, &mut queue),
                // Already absorbed; its edges are in the set, so this is unreachable
                Some(id) if id == surface_id => {}
                Some(_) => {
                    let (source_vertex, dest_vertex) = edge::decode(reverse);
                    return Err(SurfaceError::MalformedIndex {
                        source_vertex,
                        dest_vertex,
                        first_face: neighbor,
                        second_face: owner,
                    });
                }
            }
        }

        surface.faces.sort_unstable();
        debug!(
            surface = surface_id,
            seed,
            faces = surface.faces.len(),
            "surface complete"
        );
        Ok(surface)
    }

    fn absorb(
        &mut self,
        face: usize,
        surface_id: usize,
        surface: &mut Surface,
        queue: &mut VecDeque<(EdgeKey, usize)>,
    ) {
        self.assignment[face] = Some(surface_id);
        self.remaining -= 1;
        surface.faces.push(face);
        for key in self.index.edges_of(face) {
            surface.edges.insert(key);
            queue.push_back((key, face));
        }
    }

    fn check_complete(&self) -> SurfaceResult<()> {
        let mut orphans = self
            .assignment
            .iter()
            .enumerate()
            .filter(|(_, owner)| owner.is_none())
            .map(|(face, _)| face);

        match orphans.next() {
            None => Ok(()),
            Some(first_face) => Err(SurfaceError::OrphanFaces {
                count: 1 + orphans.count(),
                first_face,
            }),
        }
    }
}
