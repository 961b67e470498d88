//! Height field to STL relief toolkit.
//!
//! This umbrella crate re-exports the relief crates behind one dependency:
//! foundation types, STL I/O and the conversion pipeline.
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh::prelude::*;
//!
//! let field = HeightField::from_rows(vec![
//!     vec![0.0, 128.0, 255.0],
//!     vec![128.0, 255.0, 128.0],
//!     vec![255.0, 128.0, 0.0],
//! ]).unwrap();
//!
//! // Closed solid, binary STL
//! let report = ReliefBuilder::new(&field)
//!     .scale(0.05)
//!     .solid(true)
//!     .write("relief.stl")
//!     .unwrap();
//! println!("{report}");
//!
//! // Inspect what was written
//! let mesh = load_stl("relief.stl").unwrap();
//! assert_eq!(mesh.len(), report.facet_count());
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core data structures: `Facet`, `FacetMesh`, `Aabb`
//! - [`io`] - Binary and ASCII STL encoding and decoding
//! - [`relief`] - Normalization, tessellation, solid shells, build-volume fitting
//!
//! # Feature Flags
//!
//! - `native` (default) - Optimized tessellator used by `Backend::Auto`
//! - `serde` - `Serialize`/`Deserialize` for value types and parameters

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

// =============================================================================
// Re-exports
// =============================================================================

/// Core data structures: `Facet`, `FacetMesh`, `Aabb`.
pub use mesh_types as types;

/// Binary and ASCII STL encoding and decoding.
pub use mesh_io as io;

/// Height field to relief mesh pipeline.
pub use mesh_relief as relief;

// =============================================================================
// Prelude
// =============================================================================

/// Common imports for relief conversion.
///
/// # Usage
///
/// ```
/// use mesh::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use mesh_types::{Aabb, Axis, Facet, FacetMesh, MeshBounds};

    // I/O
    pub use mesh_io::{StlFormat, load_stl, save_stl};

    // Pipeline
    pub use mesh_relief::{
        Backend, BuildVolume, ConversionParams, ConversionReport, HeightField, ReliefBuilder,
        ReliefError, build_mesh, heightfield_to_stl,
    };
}

// =============================================================================
// Tests
// =============================================================================
