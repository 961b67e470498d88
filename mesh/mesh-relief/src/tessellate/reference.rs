//! Cell-by-cell reference tessellator.

use mesh_types::{FacetMesh, Point3};

use super::{
    MeshBuilder, TessellateOptions, TopSurface, make_facet, mark_all, triangle_a_occupancy,
    triangle_b_occupancy,
};
use crate::field::HeightField;
use crate::mask::{OccupancyMask, centred};
use crate::params::Backend;

/// Direct translation of the cell rules: four corner points per cell, two
/// inclusion tests, up to two facets.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferenceBuilder;

impl MeshBuilder for ReferenceBuilder {
    fn backend(&self) -> Backend {
        Backend::Reference
    }

    fn tessellate(&self, field: &HeightField, options: &TessellateOptions) -> TopSurface {
        let (m, n) = field.dims();
        let threshold = options.threshold(field);
        let point = |i: usize, k: usize| {
            Point3::new(centred(i, m), centred(k, n), field.at(i, k))
        };

        let mut mesh = FacetMesh::new();
        let mut occupancy = options
            .track_occupancy
            .then(|| OccupancyMask::new(m, n));

        for i in 0..m.saturating_sub(1) {
            for k in 0..n.saturating_sub(1) {
                let this = point(i, k);
                let top_right = point(i, k + 1);
                let bottom_left = point(i + 1, k);
                let bottom_right = point(i + 1, k + 1);

                if this.z > threshold && top_right.z > threshold && bottom_left.z > threshold {
                    mesh.push(make_facet(top_right, this, bottom_right, options.calc_normals));
                    mark_all(occupancy.as_mut(), triangle_a_occupancy(i, k));
                }

                if this.z > threshold && bottom_right.z > threshold && bottom_left.z > threshold
                {
                    mesh.push(make_facet(
                        bottom_right,
                        this,
                        bottom_left,
                        options.calc_normals,
                    ));
                    mark_all(occupancy.as_mut(), triangle_b_occupancy(i, k));
                }
            }
        }

        TopSurface { mesh, occupancy }
    }
}
