//! STL file I/O for relief meshes.
//!
//! This crate writes and reads [`FacetMesh`](mesh_types::FacetMesh) values in
//! both STL layouts:
//!
//! - **Binary**: 80-byte header, little-endian facet count, 50-byte records
//! - **ASCII**: `solid ffd_geom` ... `endsolid ffd_geom` text blocks
//!
//! Output is byte-for-byte reproducible for a given mesh and format: no
//! timestamps, no reordering.
//!
//! # Example
//!
//! ```no_run
//! use mesh_io::{StlFormat, load_stl, save_stl};
//! use mesh_types::{Facet, FacetMesh, Point3};
//!
//! let mesh = FacetMesh::from_facets(vec![Facet::with_computed_normal(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! )]);
//!
//! save_stl(&mesh, "triangle.stl", StlFormat::Binary).unwrap();
//! let loaded = load_stl("triangle.stl").unwrap();
//! assert_eq!(loaded.len(), 1);
//! ```
//!
//! # Atomic Output
//!
//! [`save_stl`] encodes into a temporary file next to the target and renames
//! it into place only after every byte is written, so a failed write never
//! leaves a truncated STL behind.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod error;
mod stl;

pub use error::{IoError, IoResult};
pub use stl::{
    BINARY_HEADER_TEXT, FACET_RECORD_SIZE, HEADER_SIZE, SOLID_NAME, StlFormat, decode_stl,
    encode_stl, format_scientific, load_stl, save_stl, write_stl,
};
