//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL formats.
//!
//! # Format Detection
//!
//! - ASCII files start with "solid" (after optional whitespace)
//! - Binary files have an 80-byte header followed by a triangle count, and
//!   are exactly `84 + 50 * count` bytes long
//!
//! Some binary exporters write "solid" at the start of the header, so the
//! size check wins over the keyword.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header (often contains the solid name)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector (ignored on load)
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (usually 0)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid name
//! ```
//!
//! Every facet is loaded as three fresh vertices; STL has no shared vertex
//! indices. Merging identical points is a separate step.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{IndexedMesh, Point3, Vertex};
use tracing::{debug, warn};

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
const TRIANGLE_SIZE: usize = 50;

/// A named solid loaded from an STL file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StlSolid {
    /// Solid name from the `solid` line (ASCII) or the header text (binary).
    /// Empty when the file carries no usable name.
    pub name: String,
    /// Triangle soup, three vertices per facet.
    pub mesh: IndexedMesh,
}

/// Load a solid from an STL file.
///
/// Automatically detects ASCII vs binary format.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file content is not valid STL
///
/// # Example
///
/// ```no_run
/// use mesh_io::load_stl;
///
/// let solid = load_stl("model.stl").unwrap();
/// println!("Loaded {} faces from '{}'", solid.mesh.faces.len(), solid.name);
/// ```
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<StlSolid> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;

    let solid = parse_stl(&data)?;
    debug!(
        path = %path.display(),
        faces = solid.mesh.faces.len(),
        "loaded STL"
    );
    Ok(solid)
}

/// Parse STL data already in memory.
///
/// # Errors
///
/// Returns an error if the data is too small, truncated, or contains
/// malformed ASCII records.
pub fn parse_stl(data: &[u8]) -> IoResult<StlSolid> {
    if data.len() < 6 {
        return Err(IoError::invalid_content("file too small to be valid STL"));
    }

    if looks_like_ascii(data) {
        parse_stl_ascii(&String::from_utf8_lossy(data))
    } else {
        parse_stl_binary(data)
    }
}

/// ASCII when the data starts with "solid" and the length does not match
/// the binary layout implied by the header's triangle count.
fn looks_like_ascii(data: &[u8]) -> bool {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    let starts_with_solid = data[start..]
        .get(..5)
        .is_some_and(|word| word.eq_ignore_ascii_case(b"solid"));

    starts_with_solid && !binary_size_matches(data)
}

fn binary_size_matches(data: &[u8]) -> bool {
    binary_face_count(data).is_some_and(|count| {
        (count as usize)
            .checked_mul(TRIANGLE_SIZE)
            .and_then(|body| body.checked_add(HEADER_SIZE + 4))
            == Some(data.len())
    })
}

fn binary_face_count(data: &[u8]) -> Option<u32> {
    let bytes = data.get(HEADER_SIZE..HEADER_SIZE + 4)?;
    Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Parse a binary STL.
fn parse_stl_binary(data: &[u8]) -> IoResult<StlSolid> {
    let face_count = binary_face_count(data).ok_or(IoError::InvalidHeader {
        expected: HEADER_SIZE + 4,
        got: data.len(),
    })?;

    let body = &data[HEADER_SIZE + 4..];
    let available = body.len() / TRIANGLE_SIZE;
    if available < face_count as usize {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: available < face_count, which is a u32
        return Err(IoError::InvalidFaceCount {
            expected: face_count,
            got: available as u32,
        });
    }
    if body.len() > face_count as usize * TRIANGLE_SIZE {
        warn!(
            trailing = body.len() - face_count as usize * TRIANGLE_SIZE,
            "ignoring bytes after the last binary STL triangle"
        );
    }

    let mut mesh = IndexedMesh::with_capacity(face_count as usize * 3, face_count as usize);
    for record in body.chunks_exact(TRIANGLE_SIZE).take(face_count as usize) {
        // Skip normal (12 bytes), read 3 vertices (36 bytes total)
        let v0 = read_vertex(&record[12..24]);
        let v1 = read_vertex(&record[24..36]);
        let v2 = read_vertex(&record[36..48]);
        push_facet(&mut mesh, [v0, v1, v2]);
    }

    Ok(StlSolid {
        name: header_name(&data[..HEADER_SIZE]),
        mesh,
    })
}

/// Solid name from a binary header: text up to the first NUL, trimmed, and
/// only if it is printable ASCII.
fn header_name(header: &[u8]) -> String {
    let end = header.iter().position(|&b| b == 0).unwrap_or(header.len());
    let text = &header[..end];
    if text.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        String::from_utf8_lossy(text).trim().to_string()
    } else {
        String::new()
    }
}

/// Read a vertex from 12 bytes (3 f32s).
fn read_vertex(buf: &[u8]) -> Vertex {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Vertex::from_coords(f64::from(x), f64::from(y), f64::from(z))
}

fn push_facet(mesh: &mut IndexedMesh, corners: [Vertex; 3]) {
    #[allow(clippy::cast_possible_truncation)]
    // Truncation: mesh indices are u32, meshes with >4B vertices are unsupported
    let base_idx = mesh.vertices.len() as u32;
    mesh.vertices.extend(corners);
    mesh.faces.push([base_idx, base_idx + 1, base_idx + 2]);
}

/// Parse an ASCII STL.
fn parse_stl_ascii(text: &str) -> IoResult<StlSolid> {
    let mut solid = StlSolid::default();
    let mut in_facet = false;
    let mut in_loop = false;
    let mut corners: Vec<Vertex> = Vec::with_capacity(3);

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "solid" => {
                solid.name = line.trim().get(5..).unwrap_or_default().trim().to_string();
            }
            "facet" => {
                in_facet = true;
                corners.clear();
            }
            "outer" => {
                if parts.next().is_some_and(|w| w.eq_ignore_ascii_case("loop")) {
                    in_loop = true;
                    corners.clear();
                }
            }
            "vertex" if in_loop => {
                let coords: Vec<&str> = parts.collect();
                if coords.len() < 3 {
                    return Err(IoError::invalid_content(format!(
                        "line {}: vertex needs three coordinates",
                        line_no + 1
                    )));
                }
                let x: f64 = coords[0].parse()?;
                let y: f64 = coords[1].parse()?;
                let z: f64 = coords[2].parse()?;
                corners.push(Vertex::from_coords(x, y, z));
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if in_facet && corners.len() == 3 {
                    push_facet(&mut solid.mesh, [corners[0], corners[1], corners[2]]);
                } else {
                    warn!(
                        line = line_no + 1,
                        vertices = corners.len(),
                        "skipping facet that is not a triangle"
                    );
                }
                corners.clear();
                in_facet = false;
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(solid)
}

/// Save a mesh to an STL file.
///
/// * `binary` - If true, save as binary STL; if false, save as ASCII
///
/// # Errors
///
/// Returns an error if the file cannot be written, or
/// [`IoError::InvalidContent`] if a face references a missing vertex. In
/// that case no file is created.
///
/// # Example
///
/// ```no_run
/// use mesh_io::{load_stl, save_stl};
///
/// let solid = load_stl("input.stl").unwrap();
/// save_stl(&solid.mesh, &solid.name, "output.stl", true).unwrap();
/// ```
pub fn save_stl<P: AsRef<Path>>(
    mesh: &IndexedMesh,
    name: &str,
    path: P,
    binary: bool,
) -> IoResult<()> {
    // Resolve every corner before touching the file
    let facets = facet_corners(mesh)?;
    let file = File::create(path)?;
    let writer = BufWriter::new(file);

    if binary {
        write_stl_binary(&facets, name, writer)
    } else {
        write_stl_ascii(&facets, name, writer)
    }
}

/// Corner positions of every face.
fn facet_corners(mesh: &IndexedMesh) -> IoResult<Vec<[Point3<f64>; 3]>> {
    (0..mesh.faces.len())
        .map(|face| {
            mesh.face_positions(face).ok_or_else(|| {
                IoError::invalid_content(format!(
                    "face {face} references a vertex past the end of {} vertices",
                    mesh.vertices.len()
                ))
            })
        })
        .collect()
}

/// Unit normal of a facet, or zero for degenerate facets.
fn face_normal([v0, v1, v2]: &[Point3<f64>; 3]) -> [f64; 3] {
    let normal = (v1 - v0).cross(&(v2 - v0));
    let len = normal.norm();
    if len > f64::EPSILON {
        [normal.x / len, normal.y / len, normal.z / len]
    } else {
        [0.0; 3]
    }
}

fn write_stl_binary<W: Write>(
    facets: &[[Point3<f64>; 3]],
    name: &str,
    mut writer: W,
) -> IoResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = name.as_bytes();
    let len = text.len().min(HEADER_SIZE);
    header[..len].copy_from_slice(&text[..len]);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    // Face count: mesh faces limited to u32 range by design
    let face_count = facets.len() as u32;
    writer.write_all(&face_count.to_le_bytes())?;

    for corners in facets {
        write_f32_triplet(&mut writer, face_normal(corners))?;
        for corner in corners {
            write_f32_triplet(&mut writer, [corner.x, corner.y, corner.z])?;
        }
        writer.write_all(&0u16.to_le_bytes())?;
    }

    writer.flush()?;
    Ok(())
}

fn write_f32_triplet<W: Write>(writer: &mut W, values: [f64; 3]) -> IoResult<()> {
    for value in values {
        #[allow(clippy::cast_possible_truncation)]
        // Truncation: f64 to f32 is intentional for STL format which uses f32
        writer.write_all(&(value as f32).to_le_bytes())?;
    }
    Ok(())
}

fn write_stl_ascii<W: Write>(
    facets: &[[Point3<f64>; 3]],
    name: &str,
    mut writer: W,
) -> IoResult<()> {
    writeln!(writer, "solid {name}")?;

    for corners in facets {
        let [nx, ny, nz] = face_normal(corners);
        writeln!(writer, "  facet normal {nx:.6e} {ny:.6e} {nz:.6e}")?;
        writeln!(writer, "    outer loop")?;
        for corner in corners {
            let (x, y, z) = (corner.x, corner.y, corner.z);
            writeln!(writer, "      vertex {x:.6e} {y:.6e} {z:.6e}")?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid {name}")?;
    writer.flush()?;
    Ok(())
}
