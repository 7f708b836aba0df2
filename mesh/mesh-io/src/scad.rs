//! OpenSCAD polyhedron emission.
//!
//! Each mesh becomes a module wrapping a single `polyhedron`, followed by a
//! call to that module so the file renders on its own:
//!
//! ```text
//! module part() {
//!     polyhedron(
//!         points=[
//!             [0, 0, 0],
//!             [1, 0, 0],
//!             ...
//!         ],
//!         faces=[
//!             [0, 1, 2],
//!             ...
//!         ]
//!     );
//! }
//!
//! part();
//! ```
//!
//! OpenSCAD 2014.03 names the face list `triangles`; later releases use
//! `faces`.
//!
//! When a model is split into several files, a wrapper file `use`s each of
//! them and instantiates every module.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use mesh_types::IndexedMesh;
use tracing::debug;

use crate::error::{IoError, IoResult};

/// Default number of significant digits for coordinates.
pub const DEFAULT_PRECISION: usize = 9;

/// Target OpenSCAD language version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScadVersion {
    /// OpenSCAD 2014.03: polyhedron faces are passed as `triangles`.
    Legacy201403,
    /// Current OpenSCAD: polyhedron faces are passed as `faces`.
    #[default]
    Current,
}

impl ScadVersion {
    /// Keyword used for the polyhedron face list.
    #[must_use]
    pub const fn faces_keyword(self) -> &'static str {
        match self {
            Self::Legacy201403 => "triangles",
            Self::Current => "faces",
        }
    }
}

impl FromStr for ScadVersion {
    type Err = IoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "2014.03" => Ok(Self::Legacy201403),
            "current" => Ok(Self::Current),
            other => Err(IoError::invalid_content(format!(
                "unknown OpenSCAD version '{other}' (expected 2014.03 or current)"
            ))),
        }
    }
}

impl fmt::Display for ScadVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy201403 => f.write_str("2014.03"),
            Self::Current => f.write_str("current"),
        }
    }
}

/// Formatting options for emitted OpenSCAD text.
///
/// # Example
///
/// ```
/// use mesh_io::{ScadOptions, ScadVersion};
///
/// let options = ScadOptions::default()
///     .with_indent("  ")
///     .with_version(ScadVersion::Legacy201403)
///     .with_precision(6);
/// assert_eq!(options.precision, 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScadOptions {
    /// Prefix for each level of nested indentation.
    /// Default: a single tab
    pub indent: String,

    /// Target language version.
    /// Default: [`ScadVersion::Current`]
    pub version: ScadVersion,

    /// Significant digits for coordinates (`%g` style).
    /// Default: `9`
    pub precision: usize,
}

impl Default for ScadOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            version: ScadVersion::Current,
            precision: DEFAULT_PRECISION,
        }
    }
}

impl ScadOptions {
    /// Set the indentation prefix.
    #[must_use]
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// Set the target OpenSCAD version.
    #[must_use]
    pub fn with_version(mut self, version: ScadVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the number of significant digits for coordinates.
    ///
    /// Values below 1 are treated as 1.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision.max(1);
        self
    }

    fn indent(&self, level: usize) -> String {
        self.indent.repeat(level)
    }
}

/// A module living in its own file, referenced from a wrapper file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapperEntry {
    /// File name (no directory) passed to `use <...>`.
    pub file_name: String,
    /// Module defined in that file.
    pub module_name: String,
}

/// Format a number like C's `%.<precision>g`.
///
/// Uses fixed notation unless the decimal exponent is below -4 or at least
/// `precision`, and strips trailing zeros.
///
/// # Example
///
/// ```
/// use mesh_io::format_number;
///
/// assert_eq!(format_number(0.5, 9), "0.5");
/// assert_eq!(format_number(12.0, 9), "12");
/// assert_eq!(format_number(0.00001, 9), "1e-05");
/// assert_eq!(format_number(1.5e12, 9), "1.5e+12");
/// assert_eq!(format_number(-0.0, 9), "-0");
/// ```
#[must_use]
pub fn format_number(value: f64, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i64 = exponent.parse().unwrap_or(0);

    #[allow(clippy::cast_possible_wrap)]
    // Precision is a small digit count
    let precision_exp = precision as i64;
    if exponent < -4 || exponent >= precision_exp {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{sign}{:02}",
            trim_fraction(mantissa),
            exponent.unsigned_abs()
        )
    } else {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        // exponent < precision here, so the difference is non-negative
        let decimals = (precision_exp - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

fn format_point(coords: [f64; 3], precision: usize) -> String {
    format!(
        "[{}, {}, {}]",
        format_number(coords[0], precision),
        format_number(coords[1], precision),
        format_number(coords[2], precision)
    )
}

/// Write one mesh as an OpenSCAD module containing a polyhedron.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_polyhedron_module<W: Write>(
    mut writer: W,
    name: &str,
    mesh: &IndexedMesh,
    options: &ScadOptions,
) -> IoResult<()> {
    let i1 = options.indent(1);
    let i2 = options.indent(2);
    let i3 = options.indent(3);
    let join = format!(",\n{i3}");

    let points = mesh
        .vertices
        .iter()
        .map(|v| format_point(v.coords(), options.precision))
        .collect::<Vec<_>>()
        .join(&join);
    let faces = mesh
        .faces
        .iter()
        .map(|[a, b, c]| format!("[{a}, {b}, {c}]"))
        .collect::<Vec<_>>()
        .join(&join);

    writeln!(writer, "module {name}() {{")?;
    writeln!(writer, "{i1}polyhedron(")?;
    writeln!(writer, "{i2}points=[")?;
    writeln!(writer, "{i3}{points}")?;
    writeln!(writer, "{i2}],")?;
    writeln!(writer, "{i2}{}=[", options.version.faces_keyword())?;
    writeln!(writer, "{i3}{faces}")?;
    writeln!(writer, "{i2}]")?;
    writeln!(writer, "{i1});")?;
    writeln!(writer, "}}")?;
    writeln!(writer)?;
    writeln!(writer, "{name}();")?;
    writer.flush()?;
    Ok(())
}

/// Write a wrapper that loads and instantiates several module files.
///
/// All `use` statements come first, then one call per module.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_wrapper<W: Write>(mut writer: W, entries: &[WrapperEntry]) -> IoResult<()> {
    for entry in entries {
        writeln!(writer, "use <{}>", entry.file_name)?;
    }
    if !entries.is_empty() {
        writeln!(writer)?;
    }
    for entry in entries {
        writeln!(writer, "{}();", entry.module_name)?;
    }
    writer.flush()?;
    Ok(())
}

/// Save one mesh as an OpenSCAD module file.
///
/// The file must not exist yet.
///
/// # Errors
///
/// Returns [`IoError::OutputExists`] if the file already exists, or another
/// error if it cannot be written.
pub fn save_scad_module<P: AsRef<Path>>(
    path: P,
    name: &str,
    mesh: &IndexedMesh,
    options: &ScadOptions,
) -> IoResult<()> {
    let path = path.as_ref();
    write_polyhedron_module(create_new(path)?, name, mesh, options)?;
    debug!(path = %path.display(), module = name, "wrote OpenSCAD module");
    Ok(())
}

/// Save a wrapper file for several module files.
///
/// The file must not exist yet.
///
/// # Errors
///
/// Returns [`IoError::OutputExists`] if the file already exists, or another
/// error if it cannot be written.
pub fn save_scad_wrapper<P: AsRef<Path>>(path: P, entries: &[WrapperEntry]) -> IoResult<()> {
    let path = path.as_ref();
    write_wrapper(create_new(path)?, entries)?;
    debug!(path = %path.display(), modules = entries.len(), "wrote OpenSCAD wrapper");
    Ok(())
}

fn create_new(path: &Path) -> IoResult<BufWriter<File>> {
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                IoError::OutputExists {
                    path: path.to_path_buf(),
                }
            } else {
                IoError::Io(e)
            }
        })?;
    Ok(BufWriter::new(file))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use mesh_types::Vertex;

    fn triangle() -> IndexedMesh {
        IndexedMesh::from_parts(
            vec![
                Vertex::from_coords(0.0, 0.0, 0.0),
                Vertex::from_coords(1.5, 0.0, 0.0),
                Vertex::from_coords(0.0, 0.1, -2.0),
            ],
            vec![[0, 1, 2]],
        )
    }

    fn render(mesh: &IndexedMesh, options: &ScadOptions) -> String {
        let mut out = Vec::new();
        write_polyhedron_module(&mut out, "part", mesh, options).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn number_formatting_matches_printf_g() {
        assert_eq!(format_number(0.0, 9), "0");
        assert_eq!(format_number(-0.0, 9), "-0");
        assert_eq!(format_number(1.0, 9), "1");
        assert_eq!(format_number(-2.5, 9), "-2.5");
        assert_eq!(format_number(100.0, 9), "100");
        assert_eq!(format_number(0.0001, 9), "0.0001");
        assert_eq!(format_number(0.00001234, 9), "1.234e-05");
        assert_eq!(format_number(123_456_789.0, 9), "123456789");
        assert_eq!(format_number(1_234_567_890.0, 9), "1.23456789e+09");
        assert_eq!(format_number(f64::from(0.1_f32), 9), "0.100000001");
        assert_eq!(format_number(1.0 / 3.0, 3), "0.333");
        assert_eq!(format_number(f64::INFINITY, 9), "inf");
    }

    #[test]
    fn module_layout() {
        let text = render(&triangle(), &ScadOptions::default());
        let expected = "module part() {\n\
            \tpolyhedron(\n\
            \t\tpoints=[\n\
            \t\t\t[0, 0, 0],\n\
            \t\t\t[1.5, 0, 0],\n\
            \t\t\t[0, 0.1, -2]\n\
            \t\t],\n\
            \t\tfaces=[\n\
            \t\t\t[0, 1, 2]\n\
            \t\t]\n\
            \t);\n\
            }\n\
            \n\
            part();\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let mut mesh = triangle();
        mesh.vertices[0] = Vertex::from_coords(-0.0, 0.0, -0.0);
        let text = render(&mesh, &ScadOptions::default());
        assert!(text.contains("\t\t\t[-0, 0, -0],\n"));
    }

    #[test]
    fn legacy_version_uses_triangles() {
        let options = ScadOptions::default()
            .with_indent("  ")
            .with_version(ScadVersion::Legacy201403);
        let text = render(&triangle(), &options);
        assert!(text.contains("\n    triangles=[\n"));
        assert!(!text.contains("faces=["));
        assert!(text.contains("\n      [0, 1, 2]\n"));
    }

    #[test]
    fn version_parsing() {
        assert_eq!(
            "2014.03".parse::<ScadVersion>().unwrap(),
            ScadVersion::Legacy201403
        );
        assert_eq!(
            "Current".parse::<ScadVersion>().unwrap(),
            ScadVersion::Current
        );
        assert!("2019.05".parse::<ScadVersion>().is_err());
        assert_eq!(ScadVersion::Legacy201403.to_string(), "2014.03");
    }

    #[test]
    fn wrapper_puts_use_lines_first() {
        let entries = vec![
            WrapperEntry {
                file_name: "cube_001.scad".to_string(),
                module_name: "cube001".to_string(),
            },
            WrapperEntry {
                file_name: "cube_002.scad".to_string(),
                module_name: "cube002".to_string(),
            },
        ];
        let mut out = Vec::new();
        write_wrapper(&mut out, &entries).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "use <cube_001.scad>\nuse <cube_002.scad>\n\ncube001();\ncube002();\n"
        );
    }

    #[test]
    fn existing_output_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.scad");
        std::fs::write(&path, "keep me").unwrap();

        let err =
            save_scad_module(&path, "part", &triangle(), &ScadOptions::default()).unwrap_err();
        assert!(matches!(err, IoError::OutputExists { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }

    #[test]
    fn save_module_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.scad");
        save_scad_module(&path, "part", &triangle(), &ScadOptions::default()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("module part() {"));
        assert!(text.ends_with("part();\n"));
    }
}
