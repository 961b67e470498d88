//! Relief: turn images and text into printable STL height maps.
//!
//! # Usage
//!
//! - `relief moon.png --scale 0.1 --solid` - closed solid from an image
//! - `relief --text "Hello" --font DejaVuSans.ttf -o hello.stl` - raised lettering
//! - `relief map.png --rgba-weights 0.3 0.6 0.1 0 --gaussian-sigma 1.5 --ascii`
//!
//! Logging goes to stderr. `RUST_LOG` is honoured; `-v` raises the floor to
//! `info` and `-vv` to `debug`.

mod source;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use mesh_relief::{Backend, BuildVolume, ConversionParams, heightfield_to_stl};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use crate::source::{ChannelReduction, default_output_path, load_image_field, render_text_field};

/// Convert an image or a line of text into an STL relief
#[derive(Parser, Debug)]
#[command(name = "relief")]
#[command(about = "Convert images and text into STL reliefs", long_about = None)]
#[command(version)]
struct Cli {
    /// Source image (any format the `image` crate decodes)
    #[arg(name = "IMAGE", required_unless_present = "text", conflicts_with = "text")]
    image: Option<PathBuf>,

    /// Render this text instead of reading an image
    #[arg(long, requires = "font")]
    text: Option<String>,

    /// TrueType/OpenType font used with --text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Glyph height in pixels for --text
    #[arg(long, default_value_t = 100.0)]
    font_size: f32,

    /// Output STL path (default: derived from the input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Height multiplier applied after subtracting the minimum [default: 0.1]
    #[arg(long)]
    scale: Option<f64>,

    /// Only cells strictly above this (scaled) height are tessellated
    #[arg(long, allow_negative_numbers = true)]
    mask_val: Option<f64>,

    /// Maximum X extent in mm [default: 235]
    #[arg(long)]
    max_width: Option<f64>,

    /// Maximum Y extent in mm [default: 140]
    #[arg(long)]
    max_depth: Option<f64>,

    /// Maximum Z extent in mm [default: 150]
    #[arg(long)]
    max_height: Option<f64>,

    /// Floor depth below the lowest point, as a fraction of the height range [default: 0.1]
    #[arg(long)]
    min_thickness_percent: Option<f64>,

    /// Write ASCII STL instead of binary
    #[arg(long)]
    ascii: bool,

    /// Compute unit facet normals
    #[arg(long)]
    calc_normals: bool,

    /// Close the surface with walls and a floor
    #[arg(long)]
    solid: bool,

    /// Tessellator implementation
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Channel weights for colour images, in R G B A order
    #[arg(long, num_args = 4, value_names = ["R", "G", "B", "A"], allow_negative_numbers = true)]
    rgba_weights: Option<Vec<f32>>,

    /// Smooth the height field with a gaussian of this sigma (pixels)
    #[arg(long)]
    gaussian_sigma: Option<f32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// Native when compiled in, otherwise reference
    Auto,
    /// Always the cell-by-cell reference tessellator
    Reference,
    /// Require the native tessellator
    Native,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Auto => Self::Auto,
            BackendArg::Reference => Self::Reference,
            BackendArg::Native => Self::Native,
        }
    }
}

impl Cli {
    /// Conversion parameters, keeping library defaults for anything not given.
    fn params(&self) -> ConversionParams {
        let defaults = ConversionParams::default();
        let volume = defaults.build_volume;

        let mut params = defaults
            .with_ascii(self.ascii)
            .with_calc_normals(self.calc_normals)
            .with_solid(self.solid)
            .with_backend(self.backend.into())
            .with_build_volume(BuildVolume::new(
                self.max_width.unwrap_or(volume.max_width),
                self.max_depth.unwrap_or(volume.max_depth),
                self.max_height.unwrap_or(volume.max_height),
            ));
        if let Some(scale) = self.scale {
            params = params.with_scale(scale);
        }
        if let Some(mask_val) = self.mask_val {
            params = params.with_mask_val(mask_val);
        }
        if let Some(percent) = self.min_thickness_percent {
            params = params.with_min_thickness_percent(percent);
        }
        params
    }

    fn reduction(&self) -> ChannelReduction {
        match self.rgba_weights.as_deref() {
            Some(&[r, g, b, a]) => ChannelReduction::Weighted([r, g, b, a]),
            _ => ChannelReduction::Mean,
        }
    }
}

fn init_tracing(verbose: u8) {
    let floor = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(floor.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let field = match (&cli.image, &cli.text, &cli.font) {
        (Some(image), _, _) => load_image_field(image, cli.reduction(), cli.gaussian_sigma)?,
        (None, Some(text), Some(font)) => {
            render_text_field(text, font, cli.font_size, cli.gaussian_sigma)?
        }
        // clap enforces IMAGE or --text with --font
        _ => anyhow::bail!("either IMAGE or --text with --font is required"),
    };
    info!("Loaded {}x{} height field", field.rows(), field.cols());

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(cli.image.as_deref(), cli.text.as_deref()));
    let params = cli.params();

    let report = heightfield_to_stl(&field, &output, &params)
        .with_context(|| format!("failed to convert to {}", output.display()))?;
    println!("{report} -> {}", output.display());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("relief").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn unset_flags_keep_library_defaults() {
        let params = parse(&["moon.png"]).params();
        assert_eq!(params, ConversionParams::default());
    }

    #[test]
    fn flags_map_onto_params() {
        let cli = parse(&[
            "moon.png",
            "--scale",
            "0.5",
            "--mask-val",
            "-2",
            "--max-width",
            "100",
            "--min-thickness-percent",
            "0.25",
            "--solid",
            "--calc-normals",
            "--ascii",
            "--backend",
            "reference",
        ]);
        let params = cli.params();
        assert_eq!(params.scale, 0.5);
        assert_eq!(params.mask_val, Some(-2.0));
        assert_eq!(params.build_volume, BuildVolume::new(100.0, 140.0, 150.0));
        assert_eq!(params.min_thickness_percent, 0.25);
        assert!(params.solid && params.calc_normals && params.ascii);
        assert_eq!(params.backend, Backend::Reference);
    }

    #[test]
    fn rgba_weights_take_four_values() {
        let cli = parse(&["moon.png", "--rgba-weights", "0.3", "0.6", "0.1", "0"]);
        assert_eq!(cli.reduction(), ChannelReduction::Weighted([0.3, 0.6, 0.1, 0.0]));
        assert_eq!(parse(&["moon.png"]).reduction(), ChannelReduction::Mean);

        let short = Cli::try_parse_from(["relief", "moon.png", "--rgba-weights", "1", "2"]);
        assert!(short.is_err());
    }

    #[test]
    fn input_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["relief"]).is_err());
        assert!(Cli::try_parse_from(["relief", "--text", "Hi"]).is_err());
        assert!(
            Cli::try_parse_from(["relief", "moon.png", "--text", "Hi", "--font", "f.ttf"])
                .is_err()
        );

        let cli = parse(&["--text", "Hi", "--font", "f.ttf"]);
        assert_eq!(cli.text.as_deref(), Some("Hi"));
        assert_eq!(cli.font_size, 100.0);
    }

    #[test]
    fn verbosity_counts() {
        assert_eq!(parse(&["moon.png", "-vv"]).verbose, 2);
    }
}
