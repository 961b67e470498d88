//! Traits for mesh types.

use crate::{Aabb, Axis};

/// Trait for types that can compute a bounding box.
pub trait MeshBounds {
    /// Compute the axis-aligned bounding box.
    ///
    /// Returns an empty AABB if the mesh has no vertices.
    fn bounds(&self) -> Aabb;

    /// Compute the bounding box, returning `None` if empty.
    fn bounds_opt(&self) -> Option<Aabb> {
        let b = self.bounds();
        if b.is_empty() { None } else { Some(b) }
    }

    /// Peak-to-peak span of every vertex coordinate along `axis`,
    /// or `None` for a mesh without vertices.
    fn peak_to_peak(&self, axis: Axis) -> Option<f64> {
        self.bounds_opt().map(|b| b.extent(axis))
    }
}
