//! Height field sources: decoded images and rasterized text.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use anyhow::{Context, Result, anyhow, bail};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, imageops};
use imageproc::drawing::{draw_text_mut, text_size};
use mesh_relief::HeightField;
use tracing::debug;

/// Intensity of a full-scale pixel once converted to heights.
const INTENSITY_SCALE: f32 = 256.0;

/// How multi-channel pixels collapse to one height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelReduction {
    /// Mean over every channel of the decoded colour type.
    Mean,
    /// Weighted sum over the channels present, in R, G, B, A order.
    Weighted([f32; 4]),
}

impl ChannelReduction {
    /// Collapse one pixel's channel values.
    ///
    /// Single-channel pixels pass through unweighted.
    fn reduce(self, channels: &[f32]) -> f32 {
        match (self, channels) {
            (_, [value]) => *value,
            (Self::Mean, _) => {
                #[allow(clippy::cast_precision_loss)]
                let count = channels.len() as f32;
                channels.iter().sum::<f32>() / count
            }
            (Self::Weighted(weights), _) => {
                channels.iter().zip(weights).map(|(c, w)| c * w).sum()
            }
        }
    }
}

// =============================================================================
// Images
// =============================================================================

/// Decode an image file into a height field.
///
/// Pixel intensities are read as floats in `[0, 1]` and multiplied by 256.
pub fn load_image_field(
    path: &Path,
    reduction: ChannelReduction,
    gaussian_sigma: Option<f32>,
) -> Result<HeightField> {
    let image = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    debug!(
        "Decoded {}x{} {:?} image from {}",
        image.width(),
        image.height(),
        image.color(),
        path.display()
    );
    let heights = image_heights(&image, reduction);
    finish_field(heights, gaussian_sigma)
}

/// Reduce every pixel of `image` to a scaled intensity.
fn image_heights(image: &DynamicImage, reduction: ChannelReduction) -> ImageBuffer<Luma<f32>, Vec<f32>> {
    let color = image.color();
    let rgba = image.to_rgba32f();

    let (width, height) = rgba.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let value = match (color.has_color(), color.has_alpha()) {
            (false, false) => reduction.reduce(&[r]),
            (false, true) => reduction.reduce(&[r, a]),
            (true, false) => reduction.reduce(&[r, g, b]),
            (true, true) => reduction.reduce(&[r, g, b, a]),
        };
        Luma([value * INTENSITY_SCALE])
    })
}

// =============================================================================
// Text
// =============================================================================

/// Rasterize `text` as white glyphs on black, so glyphs become raised relief.
pub fn render_text_field(
    text: &str,
    font_path: &Path,
    font_size: f32,
    gaussian_sigma: Option<f32>,
) -> Result<HeightField> {
    if text.trim().is_empty() {
        bail!("text to render is empty");
    }
    if !(font_size.is_finite() && font_size > 0.0) {
        bail!("font size must be positive, got {font_size}");
    }

    let data = std::fs::read(font_path)
        .with_context(|| format!("failed to read font {}", font_path.display()))?;
    let font = FontVec::try_from_vec(data)
        .map_err(|_| anyhow!("{} is not a usable font", font_path.display()))?;

    let scale = PxScale::from(font_size);
    let (text_width, text_height) = text_size(scale, &font, text);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let margin = (font_size / 4.0).ceil() as u32;

    let mut canvas = GrayImage::new(text_width + 2 * margin, text_height + 2 * margin);
    #[allow(clippy::cast_possible_wrap)]
    let offset = margin as i32;
    draw_text_mut(&mut canvas, Luma([255u8]), offset, offset, scale, &font, text);
    debug!(
        "Rendered {:?} at {}px into {}x{} canvas",
        text,
        font_size,
        canvas.width(),
        canvas.height()
    );

    let heights = ImageBuffer::from_fn(canvas.width(), canvas.height(), |x, y| {
        Luma([f32::from(canvas.get_pixel(x, y).0[0]) / 255.0 * INTENSITY_SCALE])
    });
    finish_field(heights, gaussian_sigma)
}

// =============================================================================
// Shared
// =============================================================================

/// Optionally smooth, then convert to a row-major height field.
fn finish_field(
    heights: ImageBuffer<Luma<f32>, Vec<f32>>,
    gaussian_sigma: Option<f32>,
) -> Result<HeightField> {
    let heights = match gaussian_sigma {
        Some(sigma) if sigma > 0.0 => {
            debug!("Applying gaussian blur, sigma {sigma}");
            imageops::blur(&heights, sigma)
        }
        Some(sigma) => bail!("gaussian sigma must be positive, got {sigma}"),
        None => heights,
    };

    let (width, height) = heights.dimensions();
    let data = heights.into_raw().into_iter().map(f64::from).collect();
    Ok(HeightField::new(height as usize, width as usize, data)?)
}

/// Output path used when `-o` is not given.
///
/// Images swap their extension for `.stl`; text keeps its alphanumeric
/// characters.
pub fn default_output_path(image: Option<&Path>, text: Option<&str>) -> PathBuf {
    if let Some(image) = image {
        return image.with_extension("stl");
    }
    let stem: String = text
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect();
    if stem.is_empty() {
        PathBuf::from("relief.stl")
    } else {
        PathBuf::from(format!("{stem}.stl"))
    }
}
