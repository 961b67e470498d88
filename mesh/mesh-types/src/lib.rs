//! Core facet types for relief meshes.
//!
//! This crate provides the foundational types shared by the relief pipeline:
//!
//! - [`Facet`] - One triangle: a normal plus three vertex positions
//! - [`FacetMesh`] - An ordered, unindexed sequence of facets (STL "triangle soup")
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`Axis`] - Coordinate axis selector used by extent queries
//!
//! No I/O and no logging live here; the crate depends only on `nalgebra`
//! (and `serde` behind the `serde` feature).
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`; one lattice
//! step of a height field maps to one unit before build-volume fitting.
//!
//! # Coordinate System
//!
//! Uses a **right-handed coordinate system**:
//! - X: width (grid rows)
//! - Y: depth (grid columns)
//! - Z: height
//!
//! # Example
//!
//! ```
//! use mesh_types::{Facet, FacetMesh, Point3};
//!
//! let mut mesh = FacetMesh::new();
//! mesh.push(Facet::with_computed_normal(
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ));
//!
//! assert_eq!(mesh.len(), 1);
//! assert!((mesh.facets[0].normal.z - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod facet;
mod mesh;
mod traits;

// Re-export core types
pub use bounds::{Aabb, Axis};
pub use facet::Facet;
pub use mesh::FacetMesh;
pub use traits::MeshBounds;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
