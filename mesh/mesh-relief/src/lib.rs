//! Height field to STL relief meshes.
//!
//! This crate turns a 2D grid of heights (image intensities, rasterized text,
//! sampled terrain) into a printable STL. The pipeline is strictly
//! sequential:
//!
//! 1. **Normalize**: rotate so `rows >= cols`, shift the minimum to zero,
//!    multiply by `scale` ([`normalize`]).
//! 2. **Tessellate**: two triangles per lattice cell, filtered by a height
//!    threshold ([`MeshBuilder`]).
//! 3. **Shell** (optional): pull the rim down into walls and add a floor
//!    ([`build_shell`]).
//! 4. **Fit**: shrink the mesh into the print volume, x then y then z
//!    ([`fit_to_build_volume`]).
//! 5. **Serialize**: binary or ASCII STL via [`mesh_io`].
//!
//! # Quick Start
//!
//! ```no_run
//! use mesh_relief::{ConversionParams, HeightField, heightfield_to_stl};
//!
//! let field = HeightField::from_rows(vec![
//!     vec![0.0, 64.0, 128.0],
//!     vec![64.0, 128.0, 192.0],
//!     vec![128.0, 192.0, 255.0],
//! ]).unwrap();
//!
//! let params = ConversionParams::solid_print().with_scale(0.05);
//! let report = heightfield_to_stl(&field, "relief.stl", &params).unwrap();
//! println!("{report}");
//! ```
//!
//! # Tessellators
//!
//! | Backend | Availability | Notes |
//! |---------|--------------|-------|
//! | `Reference` | always | cell-by-cell loop |
//! | `Native` | `native` feature (default) | precomputed thresholds and coordinates |
//! | `Auto` | always | native when compiled in, reference otherwise |
//!
//! Both produce identical facets in identical order.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
// Allow some pedantic lints that conflict with API design choices
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
// Allow single-char names in grid code (i, k, m, n follow the lattice convention)
#![allow(clippy::many_single_char_names)]
#![allow(clippy::similar_names)]

mod builder;
mod convert;
mod error;
mod field;
mod fit;
mod mask;
mod params;
mod shell;
pub mod tessellate;

pub use builder::ReliefBuilder;
pub use convert::{ConversionReport, ReliefMesh, build_mesh, encode_stl, heightfield_to_stl};
pub use error::{ReliefError, ReliefResult};
pub use field::{HeightField, normalize};
pub use fit::{ScaleFactors, fit_to_build_volume};
pub use mask::{EdgeMask, OccupancyMask};
pub use params::{Backend, BuildVolume, ConversionParams};
pub use shell::{ShellStats, build_shell, floor_elevation};
pub use tessellate::{MeshBuilder, TessellateOptions, TopSurface, select_builder};

// Re-export mesh types for convenience
pub use mesh_io::StlFormat;
pub use mesh_types::{Aabb, Facet, FacetMesh, MeshBounds};
