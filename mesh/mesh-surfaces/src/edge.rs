//! Directed edge keys.
//!
//! A directed edge `source -> dest` packs into one `u64`: the source vertex
//! index in the high 32 bits and the destination in the low 32 bits. One
//! integer key keeps the edge index a flat hash map, and reversing an edge
//! is a single rotation.

/// A directed edge packed into 64 bits.
pub type EdgeKey = u64;

/// Pack `source -> dest` into a key.
///
/// # Example
///
/// ```
/// use mesh_surfaces::edge;
///
/// assert_eq!(edge::encode(1, 2), 0x0000_0001_0000_0002);
/// ```
#[inline]
#[must_use]
pub const fn encode(source: u32, dest: u32) -> EdgeKey {
    ((source as u64) << 32) | dest as u64
}

/// Unpack a key into `(source, dest)`.
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
// Truncation: each half of the key is exactly 32 bits
pub const fn decode(key: EdgeKey) -> (u32, u32) {
    ((key >> 32) as u32, key as u32)
}

/// Key of the same edge walked the other way.
///
/// # Example
///
/// ```
/// use mesh_surfaces::edge;
///
/// let key = edge::encode(7, 3);
/// assert_eq!(edge::reverse(key), edge::encode(3, 7));
/// ```
#[inline]
#[must_use]
pub const fn reverse(key: EdgeKey) -> EdgeKey {
    key.rotate_left(32)
}

/// The three directed edges of a face, in winding order.
#[inline]
#[must_use]
pub const fn face_edges(face: [u32; 3]) -> [EdgeKey; 3] {
    [
        encode(face[0], face[1]),
        encode(face[1], face[2]),
        encode(face[2], face[0]),
    ]
}
