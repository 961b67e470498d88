//! STL (Stereolithography) file format support.
//!
//! Supports both ASCII and binary STL formats.
//!
//! # Binary Format
//!
//! ```text
//! UINT8[80]    – Header ("Binary STL Writer", NUL padded)
//! UINT32       – Number of triangles
//! foreach triangle
//!     REAL32[3] – Normal vector
//!     REAL32[3] – Vertex 1
//!     REAL32[3] – Vertex 2
//!     REAL32[3] – Vertex 3
//!     UINT16    – Attribute byte count (always 0)
//! end
//! ```
//!
//! # ASCII Format
//!
//! ```text
//! solid ffd_geom
//!   facet normal  ni  nj  nk
//!     outer loop
//!       vertex    v1x  v1y  v1z
//!       vertex    v2x  v2y  v2z
//!       vertex    v3x  v3y  v3z
//!     endloop
//!   endfacet
//!   ...
//! endsolid ffd_geom
//! ```
//!
//! Lines are joined with `\n` and the file ends right after the footer.
//! Every number is written as `d.dddddde±XX`.

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use mesh_types::{Facet, FacetMesh};
use tracing::debug;

use crate::error::{IoError, IoResult};

/// STL binary header size in bytes.
pub const HEADER_SIZE: usize = 80;

/// Size of one triangle in binary STL (normal + 3 vertices + attribute).
pub const FACET_RECORD_SIZE: usize = 50;

/// Identifying text at the start of every binary header.
pub const BINARY_HEADER_TEXT: &[u8] = b"Binary STL Writer";

/// Solid name used in the ASCII header and footer.
pub const SOLID_NAME: &str = "ffd_geom";

/// STL layout selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StlFormat {
    /// Compact little-endian binary layout.
    #[default]
    Binary,
    /// Human-readable text layout.
    Ascii,
}

impl StlFormat {
    /// Map an `ascii` option flag onto a format.
    #[must_use]
    pub const fn from_ascii_flag(ascii: bool) -> Self {
        if ascii { Self::Ascii } else { Self::Binary }
    }
}

impl std::fmt::Display for StlFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Ascii => write!(f, "ascii"),
        }
    }
}

/// Format a value in scientific notation with six fractional mantissa digits
/// and a signed exponent of at least two digits, e.g. `-2.500000e-03`.
///
/// # Example
///
/// ```
/// use mesh_io::format_scientific;
///
/// assert_eq!(format_scientific(1.0), "1.000000e+00");
/// assert_eq!(format_scientific(-0.0025), "-2.500000e-03");
/// ```
#[must_use]
pub fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let formatted = format!("{value:.6e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => formatted,
    }
}

/// Write a mesh to any writer in the given layout.
///
/// # Errors
///
/// Returns an error if the writer fails, or if a binary mesh has more facets
/// than fit in the 32-bit count field.
pub fn write_stl<W: Write>(mesh: &FacetMesh, writer: W, format: StlFormat) -> IoResult<()> {
    match format {
        StlFormat::Binary => write_stl_binary(mesh, writer),
        StlFormat::Ascii => write_stl_ascii(mesh, writer),
    }
}

/// Encode a mesh into an in-memory STL byte stream.
///
/// # Errors
///
/// Returns [`IoError::TooManyFacets`] if a binary mesh overflows the count field.
pub fn encode_stl(mesh: &FacetMesh, format: StlFormat) -> IoResult<Vec<u8>> {
    let capacity = match format {
        StlFormat::Binary => HEADER_SIZE + 4 + mesh.len() * FACET_RECORD_SIZE,
        // Roughly 340 bytes per ASCII facet block
        StlFormat::Ascii => 64 + mesh.len() * 340,
    };
    let mut buffer = Vec::with_capacity(capacity);
    write_stl(mesh, &mut buffer, format)?;
    Ok(buffer)
}

/// Save a mesh to an STL file.
///
/// The bytes go to a temporary file in the target directory which is renamed
/// onto `path` once complete. On any failure the temporary is removed and an
/// existing file at `path` is left untouched.
///
/// # Errors
///
/// Returns an error if the directory is not writable, encoding fails, or the
/// final rename fails.
pub fn save_stl<P: AsRef<Path>>(mesh: &FacetMesh, path: P, format: StlFormat) -> IoResult<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write_stl(mesh, &mut writer, format)?;
        writer.flush()?;
    }

    temp.persist(path).map_err(|e| IoError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    debug!(
        "Wrote {} facets as {} STL to {}",
        mesh.len(),
        format,
        path.display()
    );
    Ok(())
}

/// Save mesh as binary STL.
fn write_stl_binary<W: Write>(mesh: &FacetMesh, mut writer: W) -> IoResult<()> {
    let face_count = u32::try_from(mesh.len()).map_err(|_| IoError::TooManyFacets {
        count: mesh.len(),
    })?;

    let mut header = [0u8; HEADER_SIZE];
    header[..BINARY_HEADER_TEXT.len()].copy_from_slice(BINARY_HEADER_TEXT);
    writer.write_all(&header)?;
    writer.write_all(&face_count.to_le_bytes())?;

    let mut record = [0u8; FACET_RECORD_SIZE];
    for facet in mesh {
        for (i, value) in facet.to_array().iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            // Truncation: f64 to f32 is intentional for STL format which uses f32
            let narrowed = *value as f32;
            record[i * 4..i * 4 + 4].copy_from_slice(&narrowed.to_le_bytes());
        }
        // Attribute byte count stays zero
        record[48..].copy_from_slice(&0u16.to_le_bytes());
        writer.write_all(&record)?;
    }

    Ok(())
}

/// Save mesh as ASCII STL.
fn write_stl_ascii<W: Write>(mesh: &FacetMesh, mut writer: W) -> IoResult<()> {
    write!(writer, "solid {SOLID_NAME}")?;

    for facet in mesh {
        let values = facet.to_array().map(format_scientific);
        write!(
            writer,
            "\n  facet normal  {}  {}  {}\n    outer loop",
            values[0], values[1], values[2]
        )?;
        for vertex in values[3..].chunks_exact(3) {
            write!(
                writer,
                "\n      vertex    {}  {}  {}",
                vertex[0], vertex[1], vertex[2]
            )?;
        }
        write!(writer, "\n    endloop\n  endfacet")?;
    }

    write!(writer, "\nendsolid {SOLID_NAME}")?;
    Ok(())
}

/// Load a mesh from an STL file.
///
/// Automatically detects ASCII vs binary format.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file content is not valid STL
pub fn load_stl<P: AsRef<Path>>(path: P) -> IoResult<FacetMesh> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io(e)
        }
    })?;
    decode_stl(&bytes)
}

/// Decode an STL byte stream, detecting the layout.
///
/// ASCII is assumed when the data starts with `solid` and the would-be
/// binary header holds no NUL byte.
///
/// # Errors
///
/// Returns an error if the data is too short, truncated, or malformed.
pub fn decode_stl(bytes: &[u8]) -> IoResult<FacetMesh> {
    if bytes.len() < 6 {
        return Err(IoError::invalid_content("data too small to be valid STL"));
    }

    if is_ascii_stl(bytes) {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| IoError::invalid_content(format!("ASCII STL is not UTF-8: {e}")))?;
        decode_stl_ascii(text)
    } else {
        decode_stl_binary(bytes)
    }
}

/// Check whether the data looks like ASCII STL.
///
/// Some binary STLs happen to have "solid" in the header; binary headers
/// written here and by most tools contain NUL padding.
fn is_ascii_stl(bytes: &[u8]) -> bool {
    let header = &bytes[..bytes.len().min(HEADER_SIZE)];
    let starts_with_solid = header
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .is_some_and(|start| header[start..].starts_with(b"solid"));
    starts_with_solid && !header.contains(&0)
}

fn decode_stl_binary(bytes: &[u8]) -> IoResult<FacetMesh> {
    if bytes.len() < HEADER_SIZE + 4 {
        return Err(IoError::InvalidHeader {
            expected: HEADER_SIZE + 4,
            got: bytes.len(),
        });
    }

    // Face count is stored after the 80-byte header
    let face_count = u32::from_le_bytes([
        bytes[HEADER_SIZE],
        bytes[HEADER_SIZE + 1],
        bytes[HEADER_SIZE + 2],
        bytes[HEADER_SIZE + 3],
    ]);

    let body = &bytes[HEADER_SIZE + 4..];
    let available = body.len() / FACET_RECORD_SIZE;
    if available < face_count as usize {
        return Err(IoError::InvalidFaceCount {
            expected: face_count,
            got: u32::try_from(available).unwrap_or(u32::MAX),
        });
    }

    let facets: FacetMesh = body
        .chunks_exact(FACET_RECORD_SIZE)
        .take(face_count as usize)
        .map(|record| {
            let mut values = [0.0f64; 12];
            for (i, value) in values.iter_mut().enumerate() {
                let at = i * 4;
                *value = f64::from(f32::from_le_bytes([
                    record[at],
                    record[at + 1],
                    record[at + 2],
                    record[at + 3],
                ]));
            }
            Facet::from_array(values)
        })
        .collect();

    Ok(facets)
}

fn decode_stl_ascii(text: &str) -> IoResult<FacetMesh> {
    let mut mesh = FacetMesh::new();
    let mut normal = [0.0f64; 3];
    let mut corners: Vec<f64> = Vec::with_capacity(9);
    let mut in_facet = false;

    for line in text.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(keyword) = parts.first() else {
            continue;
        };

        match keyword.to_lowercase().as_str() {
            "facet" => {
                if parts.len() < 5 {
                    return Err(IoError::invalid_content(format!(
                        "malformed facet line: {line}"
                    )));
                }
                for (slot, token) in normal.iter_mut().zip(&parts[2..5]) {
                    *slot = token.parse()?;
                }
                corners.clear();
                in_facet = true;
            }
            "vertex" => {
                if !in_facet || parts.len() < 4 {
                    return Err(IoError::invalid_content(format!(
                        "malformed vertex line: {line}"
                    )));
                }
                for token in &parts[1..4] {
                    corners.push(token.parse()?);
                }
            }
            "endfacet" => {
                if corners.len() != 9 {
                    return Err(IoError::invalid_content(format!(
                        "facet {} has {} vertices",
                        mesh.len(),
                        corners.len() / 3
                    )));
                }
                let mut values = [0.0f64; 12];
                values[..3].copy_from_slice(&normal);
                values[3..].copy_from_slice(&corners);
                mesh.push(Facet::from_array(values));
                in_facet = false;
            }
            "endsolid" => break,
            // solid, outer loop, endloop
            _ => {}
        }
    }

    Ok(mesh)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::float_cmp,
    clippy::unnecessary_raw_string_hashes
)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::Point3;

    fn create_test_triangle() -> FacetMesh {
        FacetMesh::from_facets(vec![Facet::with_computed_normal(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )])
    }

    #[test]
    fn scientific_notation_matches_printf_style() {
        assert_eq!(format_scientific(0.0), "0.000000e+00");
        assert_eq!(format_scientific(-0.0), "-0.000000e+00");
        assert_eq!(format_scientific(1.0), "1.000000e+00");
        assert_eq!(format_scientific(-32.5), "-3.250000e+01");
        assert_eq!(format_scientific(0.0025), "2.500000e-03");
        assert_eq!(format_scientific(123_456_789.0), "1.234568e+08");
        assert_eq!(format_scientific(1e100), "1.000000e+100");
        assert_eq!(format_scientific(f64::NAN), "nan");
        assert_eq!(format_scientific(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn binary_layout() {
        let bytes = encode_stl(&create_test_triangle(), StlFormat::Binary).unwrap();
        assert_eq!(bytes.len(), HEADER_SIZE + 4 + FACET_RECORD_SIZE);
        assert!(bytes.starts_with(BINARY_HEADER_TEXT));
        assert!(bytes[BINARY_HEADER_TEXT.len()..HEADER_SIZE]
            .iter()
            .all(|&b| b == 0));
        assert_eq!(&bytes[80..84], &1u32.to_le_bytes());

        // normal z
        assert_eq!(&bytes[92..96], &1.0f32.to_le_bytes());
        // second vertex x
        assert_eq!(&bytes[108..112], &1.0f32.to_le_bytes());
        // attribute
        assert_eq!(&bytes[132..134], &[0, 0]);
    }

    #[test]
    fn empty_mesh_binary_is_header_only() {
        let bytes = encode_stl(&FacetMesh::new(), StlFormat::Binary).unwrap();
        assert_eq!(bytes.len(), 84);
        assert_eq!(&bytes[80..], &[0, 0, 0, 0]);
        assert!(decode_stl(&bytes).unwrap().is_empty());
    }

    #[test]
    fn ascii_layout() {
        let bytes = encode_stl(&create_test_triangle(), StlFormat::Ascii).unwrap();
        let expected = r#"solid ffd_geom
  facet normal  0.000000e+00  0.000000e+00  1.000000e+00
    outer loop
      vertex    0.000000e+00  0.000000e+00  0.000000e+00
      vertex    1.000000e+00  0.000000e+00  0.000000e+00
      vertex    0.000000e+00  1.000000e+00  0.000000e+00
    endloop
  endfacet
endsolid ffd_geom"#;
        assert_eq!(String::from_utf8(bytes).unwrap(), expected);
    }

    #[test]
    fn empty_mesh_ascii_has_header_and_footer() {
        let bytes = encode_stl(&FacetMesh::new(), StlFormat::Ascii).unwrap();
        assert_eq!(bytes, b"solid ffd_geom\nendsolid ffd_geom");
        assert!(decode_stl(&bytes).unwrap().is_empty());
    }

    #[test]
    fn binary_and_ascii_decode_to_same_geometry() {
        let mesh = FacetMesh::from_facets(vec![Facet::with_computed_normal(
            Point3::new(-3.5, 2.25, 0.125),
            Point3::new(1.0, -7.0, 4.0),
            Point3::new(0.5, 1.5, -2.0),
        )]);
        let from_binary = decode_stl(&encode_stl(&mesh, StlFormat::Binary).unwrap()).unwrap();
        let from_ascii = decode_stl(&encode_stl(&mesh, StlFormat::Ascii).unwrap()).unwrap();

        let a = from_binary.facets[0].to_array();
        let b = from_ascii.facets[0].to_array();
        for (x, y) in a.iter().zip(&b) {
            assert_relative_eq!(*x, *y, epsilon = 1e-6, max_relative = 1e-6);
        }
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut bytes = encode_stl(&create_test_triangle(), StlFormat::Binary).unwrap();
        bytes.truncate(bytes.len() - 10);
        match decode_stl(&bytes) {
            Err(IoError::InvalidFaceCount { expected, got }) => {
                assert_eq!(expected, 1);
                assert_eq!(got, 0);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn ascii_facet_with_missing_vertex_is_rejected() {
        let ascii_stl = br#"solid test
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
    endloop
  endfacet
endsolid test"#;
        assert!(matches!(
            decode_stl(ascii_stl),
            Err(IoError::InvalidContent { .. })
        ));
    }

    #[test]
    fn ascii_stl_parsing_keeps_normals() {
        let ascii_stl = br#"solid test
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
endsolid test"#;
        let mesh = decode_stl(ascii_stl).unwrap();
        assert_eq!(mesh.len(), 1);
        assert_eq!(mesh.facets[0].normal.z, -1.0);
        assert_eq!(mesh.facets[0].vertices[1], Point3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let original = create_test_triangle();

        for format in [StlFormat::Binary, StlFormat::Ascii] {
            let path = dir.path().join(format!("test_{format}.stl"));
            save_stl(&original, &path, format).unwrap();
            let loaded = load_stl(&path).unwrap();
            assert_eq!(loaded.len(), 1);
            assert_eq!(loaded.facets[0].vertices[2], Point3::new(0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.stl");
        fs::write(&path, b"stale").unwrap();

        save_stl(&create_test_triangle(), &path, StlFormat::Binary).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().len(), 134);
        // Only the target remains, no temporary files
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.stl");
        let result = save_stl(&create_test_triangle(), &path, StlFormat::Binary);
        assert!(matches!(result, Err(IoError::Io(_))));
        assert!(!path.exists());
    }

    #[test]
    fn load_nonexistent_file() {
        let result = load_stl("nonexistent_file_12345.stl");
        match result {
            Err(IoError::FileNotFound { path }) => {
                assert!(path.to_string_lossy().contains("nonexistent"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn format_from_flag() {
        assert_eq!(StlFormat::from_ascii_flag(true), StlFormat::Ascii);
        assert_eq!(StlFormat::from_ascii_flag(false), StlFormat::Binary);
        assert_eq!(StlFormat::default(), StlFormat::Binary);
    }
}
