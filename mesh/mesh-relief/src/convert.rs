//! The conversion pipeline: normalize, tessellate, shell, fit, serialize.

use std::path::Path;

use mesh_types::{Aabb, FacetMesh, MeshBounds};
use tracing::{info, warn};

use crate::error::ReliefResult;
use crate::field::{HeightField, normalize};
use crate::fit::{ScaleFactors, fit_to_build_volume};
use crate::params::{Backend, ConversionParams};
use crate::shell::{ShellStats, build_shell};
use crate::tessellate::{TessellateOptions, TopSurface, select_builder};

/// What a conversion did.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    /// Normalized field dimensions `(rows, cols)`, with `rows >= cols`.
    pub dims: (usize, usize),
    /// Facets emitted by the tessellator.
    pub top_facet_count: usize,
    /// Floor facets appended by the shell stage.
    pub bottom_facet_count: usize,
    /// Tessellator that actually ran.
    pub backend: Backend,
    /// Shell statistics when `solid` was requested.
    pub shell: Option<ShellStats>,
    /// Uniform factors applied by the x, y and z build-volume passes.
    pub scale_factors: ScaleFactors,
    /// Bounds of the final mesh; empty when no facet survived the mask.
    pub bounds: Aabb,
}

impl ConversionReport {
    /// Total facets in the output.
    #[must_use]
    pub const fn facet_count(&self) -> usize {
        self.top_facet_count + self.bottom_facet_count
    }
}

impl std::fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} facets ({} top, {} floor) from a {}x{} field via {} tessellator",
            self.facet_count(),
            self.top_facet_count,
            self.bottom_facet_count,
            self.dims.0,
            self.dims.1,
            self.backend
        )
    }
}

/// A finished relief mesh and its report.
#[derive(Debug, Clone)]
pub struct ReliefMesh {
    /// Top facets followed by floor facets, in output order.
    pub mesh: FacetMesh,
    /// What the pipeline did.
    pub report: ConversionReport,
}

/// Run every stage except serialization.
///
/// # Errors
///
/// Returns an error for invalid parameters, a forced but missing native
/// tessellator, or non-finite heights.
///
/// # Example
///
/// ```
/// use mesh_relief::{ConversionParams, HeightField, build_mesh};
///
/// let field = HeightField::from_rows(vec![
///     vec![0.0, 1.0, 2.0],
///     vec![1.0, 2.0, 3.0],
///     vec![2.0, 3.0, 4.0],
///     vec![3.0, 4.0, 5.0],
/// ]).unwrap();
///
/// let relief = build_mesh(&field, &ConversionParams::solid_print()).unwrap();
/// assert_eq!(relief.report.top_facet_count, 2 * 3 * 2);
/// assert_eq!(relief.report.bottom_facet_count, 2 * 3 * 2);
/// ```
pub fn build_mesh(field: &HeightField, params: &ConversionParams) -> ReliefResult<ReliefMesh> {
    params.validate()?;
    let builder = select_builder(params.backend)?;

    let normalized = normalize(field, params.scale)?;
    let options = TessellateOptions {
        mask_val: params.mask_val,
        calc_normals: params.calc_normals,
        track_occupancy: params.solid,
    };
    let TopSurface {
        mut mesh,
        occupancy,
    } = builder.tessellate(&normalized, &options);
    let top_facet_count = mesh.len();

    info!(
        "Tessellated {}x{} field into {} top facets ({} tessellator)",
        normalized.rows(),
        normalized.cols(),
        top_facet_count,
        builder.backend()
    );
    if top_facet_count == 0 {
        warn!("Mask excluded every cell; output will contain no facets");
    }

    let shell = match occupancy {
        Some(occupancy) if params.solid => Some(build_shell(
            &mut mesh,
            &occupancy,
            params.min_thickness_percent,
            params.calc_normals,
        )),
        _ => None,
    };

    let scale_factors = fit_to_build_volume(&mut mesh, &params.build_volume);

    let report = ConversionReport {
        dims: normalized.dims(),
        top_facet_count,
        bottom_facet_count: shell.map_or(0, |s| s.bottom_facet_count),
        backend: builder.backend(),
        shell,
        scale_factors,
        bounds: mesh.bounds(),
    };

    Ok(ReliefMesh { mesh, report })
}

/// Run the full pipeline into an in-memory STL.
///
/// # Errors
///
/// Same as [`build_mesh`], plus serialization failures.
pub fn encode_stl(field: &HeightField, params: &ConversionParams) -> ReliefResult<Vec<u8>> {
    let relief = build_mesh(field, params)?;
    Ok(mesh_io::encode_stl(&relief.mesh, params.format())?)
}

/// Run the full pipeline and write exactly one STL file at `path`.
///
/// The file is written to a temporary sibling and renamed into place, so a
/// failure never leaves a partial STL behind.
///
/// # Errors
///
/// Same as [`build_mesh`], plus any I/O failure writing `path`.
pub fn heightfield_to_stl<P: AsRef<Path>>(
    field: &HeightField,
    path: P,
    params: &ConversionParams,
) -> ReliefResult<ConversionReport> {
    let path = path.as_ref();
    let relief = build_mesh(field, params)?;
    mesh_io::save_stl(&relief.mesh, path, params.format())?;
    info!(
        "Wrote {} facets to {} ({})",
        relief.mesh.len(),
        path.display(),
        params.format()
    );
    Ok(relief.report)
}
