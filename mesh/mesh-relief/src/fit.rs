//! Build-volume fitting.
//!
//! Three passes in fixed order x, y, z. Each pass measures the mesh as the
//! previous pass left it and, if that axis is too large, scales every vertex
//! coordinate (all three axes) by `limit / extent`. A later pass can therefore
//! shrink an axis that an earlier pass already brought within its limit.

use mesh_types::{Axis, FacetMesh, MeshBounds};
use tracing::{debug, info};

use crate::params::BuildVolume;

/// Uniform factors applied by [`fit_to_build_volume`], indexed x, y, z.
/// `None` means that pass left the mesh unchanged.
pub type ScaleFactors = [Option<f64>; 3];

/// Shrink `mesh` in place until it fits `volume`.
///
/// Axes with zero extent, and empty meshes, are skipped.
pub fn fit_to_build_volume(mesh: &mut FacetMesh, volume: &BuildVolume) -> ScaleFactors {
    let mut applied = [None; 3];

    for (axis, limit) in Axis::ALL.into_iter().zip(volume.limits()) {
        let Some(extent) = mesh.peak_to_peak(axis) else {
            debug!("Empty mesh, skipping build-volume fit");
            break;
        };
        debug!("{axis} extent {extent:.4} (limit {limit})");

        if extent > limit && extent > 0.0 {
            let factor = limit / extent;
            mesh.scale_vertices(factor);
            applied[axis.index()] = Some(factor);
            info!("Scaled mesh by {factor:.6} to fit {axis} limit {limit}");
        }
    }

    applied
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use mesh_types::{Facet, Point3};

    fn box_mesh(x: f64, y: f64, z: f64) -> FacetMesh {
        FacetMesh::from_facets(vec![
            Facet::without_normal(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(x, 0.0, 0.0),
                Point3::new(0.0, y, 0.0),
            ),
            Facet::without_normal(
                Point3::new(x, y, z),
                Point3::new(x, 0.0, 0.0),
                Point3::new(0.0, y, 0.0),
            ),
        ])
    }

    #[test]
    fn within_limits_is_untouched() {
        let mut mesh = box_mesh(10.0, 10.0, 10.0);
        let before = mesh.clone();
        let factors = fit_to_build_volume(&mut mesh, &BuildVolume::default());
        assert_eq!(factors, [None, None, None]);
        assert_eq!(mesh, before);
    }

    #[test]
    fn passes_compound() {
        // x: 200 -> fits 100 by 0.5 -> y becomes 100, z 50
        // y: 100 -> fits 40 by 0.4 -> x 40, z 20
        // z: 20 fits 30, untouched
        let mut mesh = box_mesh(200.0, 200.0, 100.0);
        let factors = fit_to_build_volume(&mut mesh, &BuildVolume::new(100.0, 40.0, 30.0));

        assert_relative_eq!(factors[0].unwrap(), 0.5);
        assert_relative_eq!(factors[1].unwrap(), 0.4);
        assert!(factors[2].is_none());

        let b = mesh.bounds();
        assert_relative_eq!(b.extent(Axis::X), 40.0, epsilon = 1e-9);
        assert_relative_eq!(b.extent(Axis::Y), 40.0, epsilon = 1e-9);
        assert_relative_eq!(b.extent(Axis::Z), 20.0, epsilon = 1e-9);
    }

    #[test]
    fn later_pass_shrinks_compliant_axis() {
        let mut mesh = box_mesh(100.0, 10.0, 300.0);
        fit_to_build_volume(&mut mesh, &BuildVolume::new(235.0, 140.0, 150.0));
        let b = mesh.bounds();
        assert_relative_eq!(b.extent(Axis::Z), 150.0, epsilon = 1e-9);
        assert_relative_eq!(b.extent(Axis::X), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn scales_about_origin_not_centre() {
        let mut mesh = box_mesh(20.0, 1.0, 1.0);
        for facet in mesh.iter_mut() {
            for v in &mut facet.vertices {
                v.x += 100.0;
            }
        }
        fit_to_build_volume(&mut mesh, &BuildVolume::new(10.0, 10.0, 10.0));
        let b = mesh.bounds();
        assert_relative_eq!(b.min.x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(b.extent(Axis::X), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_axes_and_empty_mesh_are_skipped() {
        let mut flat = box_mesh(10.0, 10.0, 0.0);
        let factors = fit_to_build_volume(&mut flat, &BuildVolume::new(5.0, 100.0, 1e-9));
        assert_relative_eq!(factors[0].unwrap(), 0.5);
        assert!(factors[2].is_none());
        assert!(flat.vertices().all(|v| v.z == 0.0));

        let mut empty = FacetMesh::new();
        assert_eq!(
            fit_to_build_volume(&mut empty, &BuildVolume::new(1.0, 1.0, 1.0)),
            [None, None, None]
        );
    }
}
