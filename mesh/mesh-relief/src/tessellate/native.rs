//! Single-pass tessellator with precomputed thresholds and coordinates.
//!
//! Rather than rebuilding four corner points and six comparisons per cell,
//! this builder classifies every lattice vertex once, caches the centred row
//! and column coordinates, and walks adjacent row pairs as slices. Facet
//! order and geometry match [`ReferenceBuilder`](super::ReferenceBuilder).

use mesh_types::{FacetMesh, Point3};

use super::{
    MeshBuilder, TessellateOptions, TopSurface, make_facet, mark_all, max_top_facets,
    triangle_a_occupancy, triangle_b_occupancy,
};
use crate::field::HeightField;
use crate::mask::{OccupancyMask, centred};
use crate::params::Backend;

/// Optimized tessellator, available with the `native` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeBuilder;

impl MeshBuilder for NativeBuilder {
    fn backend(&self) -> Backend {
        Backend::Native
    }

    fn tessellate(&self, field: &HeightField, options: &TessellateOptions) -> TopSurface {
        let (m, n) = field.dims();
        let threshold = options.threshold(field);

        let above: Vec<bool> = field.as_slice().iter().map(|&z| z > threshold).collect();
        let xs: Vec<f64> = (0..m).map(|i| centred(i, m)).collect();
        let ys: Vec<f64> = (0..n).map(|k| centred(k, n)).collect();

        let mut mesh = FacetMesh::with_capacity(max_top_facets(field));
        let mut occupancy = options
            .track_occupancy
            .then(|| OccupancyMask::new(m, n));

        for i in 0..m.saturating_sub(1) {
            let (upper, lower) = (field.row(i), field.row(i + 1));
            let (upper_above, lower_above) = (&above[i * n..(i + 1) * n], &above[(i + 1) * n..]);
            let (x0, x1) = (xs[i], xs[i + 1]);

            for k in 0..n.saturating_sub(1) {
                // Shared by both inclusion tests
                if !(upper_above[k] && lower_above[k]) {
                    continue;
                }

                let (y0, y1) = (ys[k], ys[k + 1]);
                let this = Point3::new(x0, y0, upper[k]);
                let bottom_right = Point3::new(x1, y1, lower[k + 1]);

                if upper_above[k + 1] {
                    let top_right = Point3::new(x0, y1, upper[k + 1]);
                    mesh.push(make_facet(top_right, this, bottom_right, options.calc_normals));
                    mark_all(occupancy.as_mut(), triangle_a_occupancy(i, k));
                }

                if lower_above[k + 1] {
                    let bottom_left = Point3::new(x1, y0, lower[k]);
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
