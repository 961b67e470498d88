//! End-to-end tests for the height field to STL pipeline.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use approx::assert_relative_eq;
use mesh_io::{decode_stl, load_stl};
use mesh_relief::{
    Backend, BuildVolume, ConversionParams, HeightField, ReliefBuilder, ReliefError, build_mesh,
    encode_stl, heightfield_to_stl,
};
use mesh_types::{Axis, MeshBounds};

// =============================================================================
// Fixtures
// =============================================================================

fn ramp(rows: usize, cols: usize) -> HeightField {
    let data = (0..rows * cols)
        .map(|i| ((i / cols) * 3 + (i % cols) * 7) as f64 % 11.0)
        .collect();
    HeightField::new(rows, cols, data).unwrap()
}

fn flat(rows: usize, cols: usize, height: f64) -> HeightField {
    HeightField::new(rows, cols, vec![height; rows * cols]).unwrap()
}

// =============================================================================
// Facet counts
// =============================================================================

#[test]
fn unmasked_grid_has_two_facets_per_cell() {
    for (rows, cols) in [(2, 2), (5, 3), (3, 5), (8, 8), (10, 4)] {
        let relief = build_mesh(&ramp(rows, cols), &ConversionParams::default()).unwrap();
        assert_eq!(
            relief.report.top_facet_count,
            2 * (rows - 1) * (cols - 1),
            "{rows}x{cols}"
        );
    }
}

#[test]
fn solid_doubles_facet_count() {
    let relief = build_mesh(&ramp(7, 5), &ConversionParams::default().with_solid(true)).unwrap();
    assert_eq!(relief.report.top_facet_count, 2 * 6 * 4);
    assert_eq!(relief.report.bottom_facet_count, 2 * 6 * 4);
    assert_eq!(relief.mesh.len(), 4 * 6 * 4);
}

// =============================================================================
// Empty output
// =============================================================================

#[test]
fn fully_masked_case_writes_valid_empty_stl() {
    let field = HeightField::from_rows(vec![vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
    let params = ConversionParams::default()
        .with_scale(0.05)
        .with_mask_val(3.0);

    let dir = tempfile::tempdir().unwrap();

    let binary = dir.path().join("empty.stl");
    let report = heightfield_to_stl(&field, &binary, &params).unwrap();
    assert_eq!(report.facet_count(), 0);
    let bytes = std::fs::read(&binary).unwrap();
    assert_eq!(bytes.len(), 84);
    assert!(bytes.starts_with(b"Binary STL Writer"));
    assert_eq!(&bytes[80..84], &[0, 0, 0, 0]);

    let ascii = dir.path().join("empty_ascii.stl");
    heightfield_to_stl(&field, &ascii, &params.clone().with_ascii(true)).unwrap();
    let text = std::fs::read_to_string(&ascii).unwrap();
    assert_eq!(text, "solid ffd_geom\nendsolid ffd_geom");

    assert!(load_stl(&binary).unwrap().is_empty());
    assert!(load_stl(&ascii).unwrap().is_empty());
}

// =============================================================================
// Solid shell
// =============================================================================

#[test]
fn flat_solid_floor_sits_at_surface_height() {
    let relief = build_mesh(
        &flat(6, 4, 9.0),
        &ConversionParams::default().with_solid(true),
    )
    .unwrap();
    let report = &relief.report;
    assert_eq!(report.bottom_facet_count, report.top_facet_count);

    // Normalized flat field is all zeros; zrange is zero so the floor is too.
    let shell = report.shell.unwrap();
    assert_eq!(shell.floor_z, Some(0.0));
    for facet in &relief.mesh.facets[report.top_facet_count..] {
        for v in &facet.vertices {
            assert!(!v.z.is_nan());
            assert_eq!(v.z, 0.0);
        }
    }
}

#[test]
fn sloped_solid_floor_uses_thickness_fraction() {
    // Column ramp 0..=4 at scale 1: zmin 0, zrange 4, floor at -0.4.
    let rows: Vec<Vec<f64>> = (0..6).map(|_| (0..5).map(f64::from).collect()).collect();
    let field = HeightField::from_rows(rows).unwrap();
    let relief = build_mesh(
        &field,
        &ConversionParams::default().with_scale(1.0).with_solid(true),
    )
    .unwrap();

    let floor = relief.report.shell.unwrap().floor_z.unwrap();
    assert_relative_eq!(floor, -0.4, epsilon = 1e-12);
    let bounds = relief.mesh.bounds();
    assert_relative_eq!(bounds.min.z, -0.4, epsilon = 1e-12);
}

#[test]
fn solid_normals_point_up_and_down() {
    let relief = build_mesh(&flat(5, 5, 1.0), &ConversionParams::solid_print()).unwrap();
    let top = relief.report.top_facet_count;

    let interior_up = relief.mesh.facets[..top]
        .iter()
        .filter(|f| f.normal.z > 0.999)
        .count();
    assert!(interior_up > 0);

    for facet in &relief.mesh.facets[top..] {
        assert_relative_eq!(facet.normal.z, -1.0, epsilon = 1e-12);
    }
}

// =============================================================================
// Build volume
// =============================================================================

#[test]
fn output_respects_build_volume() {
    let params = ConversionParams::default()
        .with_scale(25.0)
        .with_solid(true)
        .with_build_volume(BuildVolume::new(30.0, 20.0, 10.0));
    let relief = build_mesh(&ramp(60, 45), &params).unwrap();
    let bounds = relief.mesh.bounds();

    assert!(bounds.extent(Axis::X) <= 30.0 + 1e-9);
    assert!(bounds.extent(Axis::Y) <= 20.0 + 1e-9);
    assert!(bounds.extent(Axis::Z) <= 10.0 + 1e-9);
}

#[test]
fn small_mesh_keeps_lattice_spacing() {
    let relief = build_mesh(&ramp(4, 3), &ConversionParams::default()).unwrap();
    assert_eq!(relief.report.scale_factors, [None, None, None]);
    assert_eq!(relief.mesh.bounds().extent(Axis::X), 3.0);
    assert_eq!(relief.mesh.bounds().extent(Axis::Y), 2.0);
}

// =============================================================================
// Serialization
// =============================================================================

#[test]
fn serialization_is_deterministic() {
    let field = ramp(9, 6);
    for params in [
        ConversionParams::default(),
        ConversionParams::preview(),
        ConversionParams::solid_print(),
        ConversionParams::solid_print().with_ascii(true),
    ] {
        let a = encode_stl(&field, &params).unwrap();
        let b = encode_stl(&field, &params).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn ascii_and_binary_decode_to_same_geometry() {
    let field = ramp(6, 5);
    let params = ConversionParams::solid_print();
    let binary = decode_stl(&encode_stl(&field, &params).unwrap()).unwrap();
    let ascii = decode_stl(&encode_stl(&field, &params.clone().with_ascii(true)).unwrap()).unwrap();

    assert_eq!(binary.len(), ascii.len());
    for (b, a) in binary.iter().zip(ascii.iter()) {
        for (x, y) in b.to_array().iter().zip(a.to_array()) {
            assert_relative_eq!(*x, y, epsilon = 1e-5, max_relative = 1e-6);
        }
    }
}

#[test]
fn binary_record_layout() {
    let field = HeightField::from_rows(vec![vec![0.0, 10.0], vec![20.0, 30.0], vec![0.0, 0.0]])
        .unwrap();
    let bytes = encode_stl(&field, &ConversionParams::default()).unwrap();
    let count = u32::from_le_bytes(bytes[80..84].try_into().unwrap());
    assert_eq!(count, 4);
    assert_eq!(bytes.len(), 84 + 4 * 50);
    for record in bytes[84..].chunks_exact(50) {
        assert_eq!(&record[48..50], &[0, 0]);
    }
}

// =============================================================================
// Backends and errors
// =============================================================================

#[test]
fn reference_and_auto_agree() {
    let field = ramp(12, 9);
    for mask_val in [-1.0, 0.2, 0.5, 0.8] {
        let params = ConversionParams::solid_print().with_mask_val(mask_val);
        let reference = build_mesh(&field, &params.clone().with_backend(Backend::Reference)).unwrap();
        let auto = build_mesh(&field, &params).unwrap();
        assert_eq!(reference.mesh, auto.mesh, "mask {mask_val}");
    }
}

#[cfg(not(feature = "native"))]
#[test]
fn forcing_missing_native_is_a_config_error() {
    let result = build_mesh(
        &ramp(3, 3),
        &ConversionParams::default().with_backend(Backend::Native),
    );
    assert!(matches!(result, Err(ReliefError::NativeUnavailable)));
}

#[test]
fn non_2d_input_is_rejected() {
    let err = HeightField::from_shape(&[4, 4, 3], vec![0.0; 48]).unwrap_err();
    assert!(matches!(err, ReliefError::InvalidShape { .. }));
}

#[test]
fn unwritable_path_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("missing").join("out.stl");
    let result = ReliefBuilder::new(&ramp(3, 3)).write(&target);
    assert!(matches!(result, Err(ReliefError::Io(_))));
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn write_replaces_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.stl");
    std::fs::write(&path, b"stale").unwrap();

    let field = ramp(4, 4);
    let report = ReliefBuilder::new(&field).ascii(true).write(&path).unwrap();
    let loaded = load_stl(&path).unwrap();
    assert_eq!(loaded.len(), report.facet_count());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
