//! Conversion parameters and presets.

use mesh_io::StlFormat;

use crate::error::{ReliefError, ReliefResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which tessellator implementation to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Backend {
    /// Native tessellator when compiled in, reference otherwise.
    #[default]
    Auto,
    /// Always the cell-by-cell reference tessellator.
    Reference,
    /// The native tessellator; an error if the `native` feature is off.
    Native,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Reference => write!(f, "reference"),
            Self::Native => write!(f, "native"),
        }
    }
}

/// Maximum printable extents, in output units (typically mm).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BuildVolume {
    /// Largest allowed x span.
    pub max_width: f64,
    /// Largest allowed y span.
    pub max_depth: f64,
    /// Largest allowed z span.
    pub max_height: f64,
}

impl Default for BuildVolume {
    fn default() -> Self {
        Self {
            max_width: 235.0,
            max_depth: 140.0,
            max_height: 150.0,
        }
    }
}

impl BuildVolume {
    /// Create a build volume from its three limits.
    #[must_use]
    pub const fn new(max_width: f64, max_depth: f64, max_height: f64) -> Self {
        Self {
            max_width,
            max_depth,
            max_height,
        }
    }

    /// Limits in x, y, z order.
    #[must_use]
    pub const fn limits(&self) -> [f64; 3] {
        [self.max_width, self.max_depth, self.max_height]
    }
}

/// Parameters for converting a height field into an STL.
///
/// # Example
///
/// ```
/// use mesh_relief::{Backend, ConversionParams};
///
/// let params = ConversionParams::default()
///     .with_scale(0.05)
///     .with_mask_val(3.0)
///     .with_solid(true)
///     .with_backend(Backend::Reference);
///
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConversionParams {
    /// Multiplier applied to heights after the minimum is removed.
    pub scale: f64,

    /// Inclusion threshold on scaled heights. `None` includes every cell.
    pub mask_val: Option<f64>,

    /// Write ASCII instead of binary STL.
    pub ascii: bool,

    /// Store unit facet normals instead of zero vectors.
    pub calc_normals: bool,

    /// Print-bed limits enforced after shell construction.
    pub build_volume: BuildVolume,

    /// Extrude the surface into a closed solid with walls and a floor.
    pub solid: bool,

    /// Floor depth below the lowest top vertex, as a fraction of the top
    /// surface's z span.
    pub min_thickness_percent: f64,

    /// Tessellator selection.
    pub backend: Backend,
}

impl Default for ConversionParams {
    fn default() -> Self {
        Self {
            scale: 0.1,
            mask_val: None,
            ascii: false,
            calc_normals: false,
            build_volume: BuildVolume::default(),
            solid: false,
            min_thickness_percent: 0.1,
            backend: Backend::Auto,
        }
    }
}

impl ConversionParams {
    /// Parameters for a closed, printable solid with computed normals.
    #[must_use]
    pub fn solid_print() -> Self {
        Self {
            solid: true,
            calc_normals: true,
            ..Self::default()
        }
    }

    /// Parameters for a quick, human-readable open surface.
    #[must_use]
    pub fn preview() -> Self {
        Self {
            ascii: true,
            ..Self::default()
        }
    }

    /// Set the height scale.
    #[must_use]
    pub const fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the inclusion threshold.
    #[must_use]
    pub const fn with_mask_val(mut self, mask_val: f64) -> Self {
        self.mask_val = Some(mask_val);
        self
    }

    /// Select ASCII or binary output.
    #[must_use]
    pub const fn with_ascii(mut self, ascii: bool) -> Self {
        self.ascii = ascii;
        self
    }

    /// Enable or disable normal computation.
    #[must_use]
    pub const fn with_calc_normals(mut self, calc_normals: bool) -> Self {
        self.calc_normals = calc_normals;
        self
    }

    /// Set all three build-volume limits.
    #[must_use]
    pub const fn with_build_volume(mut self, build_volume: BuildVolume) -> Self {
        self.build_volume = build_volume;
        self
    }

    /// Enable or disable solid shell construction.
    #[must_use]
    pub const fn with_solid(mut self, solid: bool) -> Self {
        self.solid = solid;
        self
    }

    /// Set the floor depth fraction.
    #[must_use]
    pub const fn with_min_thickness_percent(mut self, percent: f64) -> Self {
        self.min_thickness_percent = percent;
        self
    }

    /// Select the tessellator.
    #[must_use]
    pub const fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// STL layout implied by the `ascii` flag.
    #[must_use]
    pub const fn format(&self) -> StlFormat {
        StlFormat::from_ascii_flag(self.ascii)
    }

    /// Check that every numeric parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::InvalidParams`] for non-finite or non-positive
    /// scale and build-volume limits, a negative or non-finite thickness
    /// fraction, or a NaN mask value.
    pub fn validate(&self) -> ReliefResult<()> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(ReliefError::invalid_params(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }

        let names = ["max_width", "max_depth", "max_height"];
        for (name, limit) in names.iter().zip(self.build_volume.limits()) {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ReliefError::invalid_params(format!(
                    "{name} must be positive and finite, got {limit}"
                )));
            }
        }

        if !self.min_thickness_percent.is_finite() || self.min_thickness_percent < 0.0 {
            return Err(ReliefError::invalid_params(format!(
                "min_thickness_percent must be non-negative and finite, got {}",
                self.min_thickness_percent
            )));
        }

        if self.mask_val.is_some_and(f64::is_nan) {
            return Err(ReliefError::invalid_params("mask_val must not be NaN"));
        }

        Ok(())
    }
}
