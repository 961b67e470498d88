//! Top-surface tessellation.
//!
//! Every interior lattice cell `(i, k)` of a normalized height field yields up
//! to two triangles. With corners
//!
//! ```text
//! this         = (i,   k)      top_right    = (i,   k+1)
//! bottom_left  = (i+1, k)      bottom_right = (i+1, k+1)
//! ```
//!
//! - triangle A is `(top_right, this, bottom_right)`, emitted when `this`,
//!   `top_right` and `bottom_left` are above the threshold;
//! - triangle B is `(bottom_right, this, bottom_left)`, emitted when `this`,
//!   `bottom_right` and `bottom_left` are above the threshold.
//!
//! Triangle A is tested against `bottom_left` but drawn through
//! `bottom_right`. Output files depend on this pairing at mask boundaries, so
//! both tessellators keep it, and occupancy follows the tested corners rather
//! than the drawn ones.
//!
//! Two implementations sit behind [`MeshBuilder`]: [`ReferenceBuilder`], a
//! direct cell-by-cell loop, and (with the `native` feature) [`NativeBuilder`],
//! which precomputes thresholds and coordinates. Both emit the same facets in
//! the same order.

use mesh_types::{Facet, FacetMesh, Point3};
use tracing::debug;

use crate::error::{ReliefError, ReliefResult};
use crate::field::HeightField;
use crate::mask::OccupancyMask;
use crate::params::Backend;

#[cfg(feature = "native")]
mod native;
mod reference;

#[cfg(feature = "native")]
pub use native::NativeBuilder;
pub use reference::ReferenceBuilder;

/// Options shared by every tessellator.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TessellateOptions {
    /// Inclusion threshold; `None` includes every cell.
    pub mask_val: Option<f64>,
    /// Compute unit normals instead of leaving them zero.
    pub calc_normals: bool,
    /// Record which lattice vertices the emitted facets occupy.
    pub track_occupancy: bool,
}

impl TessellateOptions {
    /// Threshold a corner height must exceed.
    ///
    /// Without an explicit mask value this sits one unit below the field's
    /// minimum, so every cell is included.
    #[must_use]
    pub fn threshold(&self, field: &HeightField) -> f64 {
        self.mask_val.unwrap_or_else(|| field.min() - 1.0)
    }
}

/// Output of a tessellator.
#[derive(Debug, Clone, Default)]
pub struct TopSurface {
    /// Top facets in cell order, triangle A before triangle B.
    pub mesh: FacetMesh,
    /// Lattice vertices covered by emitted facets, when tracking was requested.
    pub occupancy: Option<OccupancyMask>,
}

/// A strategy for turning a normalized height field into top-surface facets.
pub trait MeshBuilder {
    /// Which backend this builder implements.
    fn backend(&self) -> Backend;

    /// Tessellate a normalized field.
    fn tessellate(&self, field: &HeightField, options: &TessellateOptions) -> TopSurface;
}

/// Whether the native tessellator was compiled in.
#[must_use]
pub const fn native_available() -> bool {
    cfg!(feature = "native")
}

/// Pick the tessellator for a backend request.
///
/// `Auto` prefers the native tessellator and falls back to the reference one
/// when it is not compiled in.
///
/// # Errors
///
/// Returns [`ReliefError::NativeUnavailable`] when `Native` is requested
/// without the `native` feature.
pub fn select_builder(backend: Backend) -> ReliefResult<Box<dyn MeshBuilder>> {
    resolve_builder(backend, native_builder())
}

/// Resolve `backend` given the native tessellator, if one exists.
fn resolve_builder(
    backend: Backend,
    native: Option<Box<dyn MeshBuilder>>,
) -> ReliefResult<Box<dyn MeshBuilder>> {
    match backend {
        Backend::Reference => Ok(Box::new(ReferenceBuilder)),
        Backend::Native => native.ok_or(ReliefError::NativeUnavailable),
        Backend::Auto => Ok(native.unwrap_or_else(|| {
            debug!("Native tessellator not compiled in, using reference");
            Box::new(ReferenceBuilder)
        })),
    }
}

#[cfg(feature = "native")]
fn native_builder() -> Option<Box<dyn MeshBuilder>> {
    Some(Box::new(NativeBuilder))
}

#[cfg(not(feature = "native"))]
fn native_builder() -> Option<Box<dyn MeshBuilder>> {
    None
}

/// Upper bound on top facets for a field: two per interior cell.
#[must_use]
pub fn max_top_facets(field: &HeightField) -> usize {
    2 * field.rows().saturating_sub(1) * field.cols().saturating_sub(1)
}

/// Lattice vertices recorded for triangle A of cell `(i, k)`.
#[inline]
pub(crate) const fn triangle_a_occupancy(i: usize, k: usize) -> [(usize, usize); 3] {
    [(i, k), (i, k + 1), (i + 1, k)]
}

/// Lattice vertices recorded for triangle B of cell `(i, k)`.
#[inline]
pub(crate) const fn triangle_b_occupancy(i: usize, k: usize) -> [(usize, usize); 3] {
    [(i, k), (i + 1, k + 1), (i + 1, k)]
}

pub(crate) fn mark_all(occupancy: Option<&mut OccupancyMask>, vertices: [(usize, usize); 3]) {
    if let Some(mask) = occupancy {
        for (row, col) in vertices {
            mask.mark(row, col);
        }
    }
}

#[inline]
pub(crate) fn make_facet(
    v0: Point3<f64>,
    v1: Point3<f64>,
    v2: Point3<f64>,
    calc_normals: bool,
) -> Facet {
    if calc_normals {
        Facet::with_computed_normal(v0, v1, v2)
    } else {
        Facet::without_normal(v0, v1, v2)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reference_is_always_available() {
        let builder = select_builder(Backend::Reference).unwrap();
        assert_eq!(builder.backend(), Backend::Reference);
    }

    #[cfg(feature = "native")]
    #[test]
    fn auto_prefers_native() {
        assert!(native_available());
        assert_eq!(select_builder(Backend::Auto).unwrap().backend(), Backend::Native);
        assert_eq!(select_builder(Backend::Native).unwrap().backend(), Backend::Native);
    }

    #[cfg(not(feature = "native"))]
    #[test]
    fn auto_falls_back_and_forced_native_errors() {
        assert!(!native_available());
        assert_eq!(
            select_builder(Backend::Auto).unwrap().backend(),
            Backend::Reference
        );
        assert!(matches!(
            select_builder(Backend::Native),
            Err(ReliefError::NativeUnavailable)
        ));
    }

    #[test]
    fn missing_native_falls_back_or_errors() {
        assert_eq!(
            resolve_builder(Backend::Auto, None).unwrap().backend(),
            Backend::Reference
        );
        assert_eq!(
            resolve_builder(Backend::Reference, None).unwrap().backend(),
            Backend::Reference
        );
        assert!(matches!(
            resolve_builder(Backend::Native, None),
            Err(ReliefError::NativeUnavailable)
        ));
    }

    #[test]
    fn present_native_is_used_by_auto_and_native() {
        let native = || Some(Box::new(FixedBackend(Backend::Native)) as Box<dyn MeshBuilder>);
        assert_eq!(
            resolve_builder(Backend::Auto, native()).unwrap().backend(),
            Backend::Native
        );
        assert_eq!(
            resolve_builder(Backend::Native, native()).unwrap().backend(),
            Backend::Native
        );
        assert_eq!(
            resolve_builder(Backend::Reference, native()).unwrap().backend(),
            Backend::Reference
        );
    }

    /// Stand-in native tessellator so selection runs under any feature set.
    struct FixedBackend(Backend);

    impl MeshBuilder for FixedBackend {
        fn backend(&self) -> Backend {
            self.0
        }

        fn tessellate(&self, field: &HeightField, options: &TessellateOptions) -> TopSurface {
            ReferenceBuilder.tessellate(field, options)
        }
    }

    #[test]
    fn default_threshold_sits_below_minimum() {
        let field = HeightField::from_rows(vec![vec![2.0, 3.0], vec![4.0, 5.0]]).unwrap();
        let options = TessellateOptions::default();
        assert_eq!(options.threshold(&field), 1.0);

        let options = TessellateOptions {
            mask_val: Some(3.5),
            ..TessellateOptions::default()
        };
        assert_eq!(options.threshold(&field), 3.5);
    }

    #[test]
    fn max_top_facets_counts_interior_cells() {
        let field = HeightField::new(4, 3, vec![0.0; 12]).unwrap();
        assert_eq!(max_top_facets(&field), 12);
        let line = HeightField::new(5, 1, vec![0.0; 5]).unwrap();
        assert_eq!(max_top_facets(&line), 0);
    }
}
