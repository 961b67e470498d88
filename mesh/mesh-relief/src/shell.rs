//! Solid shell construction.
//!
//! Turns an open top surface into a closed-ish solid in three steps:
//!
//! 1. Derive an [`EdgeMask`] from the tessellator's occupancy.
//! 2. Pull every top vertex that sits on an edge lattice vertex down to the
//!    floor elevation, bending the rim into vertical walls.
//! 3. Append a floor facet under every (possibly pulled-down) top facet, with
//!    its first two vertices swapped so it faces downward.
//!
//! The floor sits at `zmin - min_thickness_percent * zrange`, where `zmin`
//! and `zrange` are taken over the top-surface z values before any wall is
//! pulled down.

use mesh_types::{Facet, FacetMesh, Point3};
use tracing::{debug, info};

use crate::mask::{EdgeMask, OccupancyMask};

/// Statistics from shell construction.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ShellStats {
    /// Lattice vertices classified as edges.
    pub edge_vertex_count: usize,
    /// Top-facet vertices pulled down to the floor.
    pub walled_vertex_count: usize,
    /// Floor facets appended to the mesh.
    pub bottom_facet_count: usize,
    /// Floor elevation, or `None` when the top surface was empty.
    pub floor_z: Option<f64>,
}

impl std::fmt::Display for ShellStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.floor_z {
            Some(z) => write!(
                f,
                "{} edge vertices, {} walled vertices, {} floor facets at z={z:.4}",
                self.edge_vertex_count, self.walled_vertex_count, self.bottom_facet_count
            ),
            None => write!(f, "no shell (empty top surface)"),
        }
    }
}

/// Floor elevation for a top surface spanning `zmin..=zmax`.
///
/// A flat surface (`zmax == zmin`) puts the floor exactly at `zmin`.
#[must_use]
pub fn floor_elevation(zmin: f64, zmax: f64, min_thickness_percent: f64) -> f64 {
    zmin - min_thickness_percent * (zmax - zmin)
}

/// Extrude the top surface in `mesh` into a solid.
///
/// `mesh` must hold only top facets produced for the lattice described by
/// `occupancy`; floor facets are appended after them. An empty mesh is left
/// untouched.
pub fn build_shell(
    mesh: &mut FacetMesh,
    occupancy: &OccupancyMask,
    min_thickness_percent: f64,
    calc_normals: bool,
) -> ShellStats {
    if mesh.is_empty() {
        debug!("Empty top surface, skipping shell");
        return ShellStats::default();
    }

    let edges = EdgeMask::from_occupancy(occupancy);
    let edge_vertex_count = edges.count();

    let (zmin, zmax) = mesh
        .vertices()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v.z), hi.max(v.z))
        });
    let floor_z = floor_elevation(zmin, zmax, min_thickness_percent);

    debug!(
        "Shell floor at z={:.4} (zmin={:.4}, zrange={:.4}), {} edge vertices",
        floor_z,
        zmin,
        zmax - zmin,
        edge_vertex_count
    );

    let mut walled_vertex_count = 0;
    for facet in mesh.iter_mut() {
        let mut moved = false;
        for v in &mut facet.vertices {
            if edges.contains_point(v.x, v.y) {
                v.z = floor_z;
                moved = true;
                walled_vertex_count += 1;
            }
        }
        if moved && calc_normals {
            facet.refresh_normal();
        }
    }

    let bottoms: Vec<Facet> = mesh
        .iter()
        .map(|top| floor_facet(top, floor_z, calc_normals))
        .collect();
    let bottom_facet_count = bottoms.len();
    mesh.extend(bottoms);

    info!(
        "Shell complete: {} top + {} floor facets, {} walled vertices",
        bottom_facet_count, bottom_facet_count, walled_vertex_count
    );

    ShellStats {
        edge_vertex_count,
        walled_vertex_count,
        bottom_facet_count,
        floor_z: Some(floor_z),
    }
}

/// Floor facet under `top`: vertex order (second, first, third), z forced to
/// the floor.
fn floor_facet(top: &Facet, floor_z: f64, calc_normals: bool) -> Facet {
    let [v0, v1, v2] = top.vertices;
    let flatten = |v: Point3<f64>| Point3::new(v.x, v.y, floor_z);
    let mut bottom = Facet::new(top.normal, [flatten(v1), flatten(v0), flatten(v2)]);
    if calc_normals {
        bottom.refresh_normal();
    }
    bottom
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::field::HeightField;
    use crate::tessellate::{MeshBuilder, ReferenceBuilder, TessellateOptions, TopSurface};
    use approx::assert_relative_eq;
    use mesh_types::Vector3;

    fn top_surface(rows: Vec<Vec<f64>>, calc_normals: bool) -> TopSurface {
        let field = HeightField::from_rows(rows).unwrap();
        ReferenceBuilder.tessellate(
            &field,
            &TessellateOptions {
                mask_val: None,
                calc_normals,
                track_occupancy: true,
            },
        )
    }

    #[test]
    fn floor_elevation_handles_flat_surface() {
        assert_eq!(floor_elevation(2.0, 2.0, 0.1), 2.0);
        assert_relative_eq!(floor_elevation(1.0, 3.0, 0.1), 0.8);
        assert!(!floor_elevation(0.0, 0.0, 0.5).is_nan());
    }

    #[test]
    fn flat_grid_doubles_facet_count() {
        let TopSurface { mut mesh, occupancy } = top_surface(vec![vec![1.0; 4]; 5], false);
        let top_count = mesh.len();
        let stats = build_shell(&mut mesh, &occupancy.unwrap(), 0.1, false);

        assert_eq!(stats.bottom_facet_count, top_count);
        assert_eq!(mesh.len(), 2 * top_count);
        assert_eq!(stats.floor_z, Some(1.0));
        for bottom in &mesh.facets[top_count..] {
            for v in &bottom.vertices {
                assert_eq!(v.z, 1.0);
            }
        }
    }

    #[test]
    fn rim_vertices_are_pulled_to_floor() {
        // 4x4 with a raised interior; only (1..=2, 1..=2) are non-frame.
        let rows = vec![
            vec![1.0, 1.0, 1.0, 1.0],
            vec![1.0, 3.0, 3.0, 1.0],
            vec![1.0, 3.0, 3.0, 1.0],
            vec![1.0, 1.0, 1.0, 1.0],
        ];
        let TopSurface { mut mesh, occupancy } = top_surface(rows, false);
        let top_count = mesh.len();
        let stats = build_shell(&mut mesh, &occupancy.unwrap(), 0.5, false);

        // zmin 1, zrange 2 -> floor 0
        assert_eq!(stats.floor_z, Some(0.0));
        assert_eq!(stats.edge_vertex_count, 12);

        for facet in &mesh.facets[..top_count] {
            for v in &facet.vertices {
                let on_frame = v.x == -2.0 || v.x == 1.0 || v.y == -2.0 || v.y == 1.0;
                if on_frame {
                    assert_eq!(v.z, 0.0, "frame vertex {v:?}");
                } else {
                    assert_eq!(v.z, 3.0, "interior vertex {v:?}");
                }
            }
        }
        assert!(stats.walled_vertex_count > 0);
    }

    #[test]
    fn floor_facets_reverse_winding() {
        let TopSurface { mut mesh, occupancy } =
            top_surface(vec![vec![0.0, 1.0, 2.0], vec![1.0, 2.0, 3.0], vec![2.0, 3.0, 4.0]], true);
        let top_count = mesh.len();
        build_shell(&mut mesh, &occupancy.unwrap(), 0.1, true);

        for (top, bottom) in mesh.facets[..top_count]
            .iter()
            .zip(&mesh.facets[top_count..])
        {
            assert_eq!(bottom.vertices[0].x, top.vertices[1].x);
            assert_eq!(bottom.vertices[1].y, top.vertices[0].y);
            assert_eq!(bottom.vertices[2].x, top.vertices[2].x);
            assert_relative_eq!(bottom.normal, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_normals_are_kept_without_calc() {
        let TopSurface { mut mesh, occupancy } = top_surface(vec![vec![0.0, 1.0]; 3], false);
        build_shell(&mut mesh, &occupancy.unwrap(), 0.1, false);
        assert!(mesh.iter().all(|f| f.normal == Vector3::zeros()));
    }

    #[test]
    fn empty_mesh_is_left_alone() {
        let mut mesh = FacetMesh::new();
        let stats = build_shell(&mut mesh, &OccupancyMask::new(3, 3), 0.1, true);
        assert!(mesh.is_empty());
        assert_eq!(stats, ShellStats::default());
        assert!(stats.to_string().contains("no shell"));
    }
}
