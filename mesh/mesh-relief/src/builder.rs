//! Fluent builder API for relief conversion.
//!
//! # Example
//!
//! ```
//! use mesh_relief::{HeightField, ReliefBuilder};
//!
//! let field = HeightField::from_rows(vec![
//!     vec![0.0, 10.0, 0.0],
//!     vec![10.0, 20.0, 10.0],
//!     vec![0.0, 10.0, 0.0],
//! ]).unwrap();
//!
//! let bytes = ReliefBuilder::new(&field)
//!     .scale(0.5)
//!     .solid(true)
//!     .ascii(true)
//!     .encode()
//!     .unwrap();
//!
//! assert!(bytes.starts_with(b"solid ffd_geom"));
//! ```

use std::path::Path;

use crate::convert::{ConversionReport, ReliefMesh, build_mesh, encode_stl, heightfield_to_stl};
use crate::error::ReliefResult;
use crate::field::HeightField;
use crate::params::{Backend, BuildVolume, ConversionParams};

/// Chainable configuration for one conversion of a borrowed height field.
#[derive(Debug, Clone)]
pub struct ReliefBuilder<'a> {
    field: &'a HeightField,
    params: ConversionParams,
}

impl<'a> ReliefBuilder<'a> {
    /// Start from the default parameters.
    #[must_use]
    pub fn new(field: &'a HeightField) -> Self {
        Self {
            field,
            params: ConversionParams::default(),
        }
    }

    /// Start from an existing parameter set.
    #[must_use]
    pub const fn with_params(field: &'a HeightField, params: ConversionParams) -> Self {
        Self { field, params }
    }

    // =========================================================================
    // Surface
    // =========================================================================

    /// Height multiplier.
    #[must_use]
    pub const fn scale(mut self, scale: f64) -> Self {
        self.params.scale = scale;
        self
    }

    /// Inclusion threshold on scaled heights.
    #[must_use]
    pub const fn mask_val(mut self, mask_val: f64) -> Self {
        self.params.mask_val = Some(mask_val);
        self
    }

    /// Compute unit facet normals.
    #[must_use]
    pub const fn calc_normals(mut self, enable: bool) -> Self {
        self.params.calc_normals = enable;
        self
    }

    /// Tessellator selection.
    #[must_use]
    pub const fn backend(mut self, backend: Backend) -> Self {
        self.params.backend = backend;
        self
    }

    // =========================================================================
    // Solid
    // =========================================================================

    /// Extrude into a solid with walls and a floor.
    #[must_use]
    pub const fn solid(mut self, enable: bool) -> Self {
        self.params.solid = enable;
        self
    }

    /// Floor depth as a fraction of the top surface's z span.
    #[must_use]
    pub const fn min_thickness_percent(mut self, percent: f64) -> Self {
        self.params.min_thickness_percent = percent;
        self
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Print-bed limits.
    #[must_use]
    pub const fn build_volume(mut self, max_width: f64, max_depth: f64, max_height: f64) -> Self {
        self.params.build_volume = BuildVolume::new(max_width, max_depth, max_height);
        self
    }

    /// ASCII instead of binary STL.
    #[must_use]
    pub const fn ascii(mut self, enable: bool) -> Self {
        self.params.ascii = enable;
        self
    }

    /// The parameters accumulated so far.
    #[must_use]
    pub const fn params(&self) -> &ConversionParams {
        &self.params
    }

    /// Build the mesh without serializing it.
    ///
    /// # Errors
    ///
    /// See [`build_mesh`].
    pub fn build(self) -> ReliefResult<ReliefMesh> {
        build_mesh(self.field, &self.params)
    }

    /// Build and serialize into memory.
    ///
    /// # Errors
    ///
    /// See [`encode_stl`].
    pub fn encode(self) -> ReliefResult<Vec<u8>> {
        encode_stl(self.field, &self.params)
    }

    /// Build and write one STL file.
    ///
    /// # Errors
    ///
    /// See [`heightfield_to_stl`].
    pub fn write<P: AsRef<Path>>(self, path: P) -> ReliefResult<ConversionReport> {
        heightfield_to_stl(self.field, path, &self.params)
    }
}
