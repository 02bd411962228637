//! Watermark compositor for blending the logo onto the base image.
//!
//! This module decodes the base image and the logo, scales the logo relative
//! to the base width, and alpha-blends one copy into each corner.
//!
//! # Features
//!
//! - Image-bomb guard: header dimensions are checked before full decode
//! - Lanczos3 logo resize with premultiplied alpha
//! - Porter-Duff "over" blending
//! - Overlays that hang past the canvas edge are cropped, not rejected
//!
//! # Example
//!
//! ```ignore
//! use heritage_brander::watermark::compositor::composite;
//!
//! let canvas = composite(&base_bytes, &logo_bytes, &config.branding)?;
//! ```

use super::position::{
    corner_placements, scaled_logo_dimensions, ImageDimensions, LogoDimensions, PlacementPosition,
};
use super::WatermarkError;
use crate::config::BrandingConfig;
use fast_image_resize::{FilterType, Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::num::NonZeroU32;

/// A watermark layer to be composited onto an image.
#[derive(Clone)]
pub struct WatermarkLayer {
    /// The watermark image (RGBA).
    pub image: RgbaImage,
    /// Position where the watermark should be placed.
    pub position: PlacementPosition,
}

impl std::fmt::Debug for WatermarkLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkLayer")
            .field("dimensions", &(self.image.width(), self.image.height()))
            .field("position", &self.position)
            .finish()
    }
}

/// Compositor for applying watermark layers to an image.
#[derive(Debug, Default)]
pub struct Compositor {
    layers: Vec<WatermarkLayer>,
}

impl Compositor {
    /// Create a new compositor with no layers.
    pub fn new() -> Self {
        Self::default()
    }

    /// One layer per corner, all sharing the same scaled logo.
    pub fn for_corners(logo: &RgbaImage, image_dims: &ImageDimensions, padding: u32) -> Self {
        let logo_dims = LogoDimensions {
            width: logo.width(),
            height: logo.height(),
        };

        let layers = corner_placements(image_dims, &logo_dims, padding)
            .into_iter()
            .map(|position| WatermarkLayer {
                image: logo.clone(),
                position,
            })
            .collect();

        Self { layers }
    }

    /// Add a watermark layer to the compositor.
    pub fn add_layer(&mut self, layer: WatermarkLayer) {
        self.layers.push(layer);
    }

    /// Apply all watermark layers to the target image.
    ///
    /// Layers are applied in the order they were added.
    pub fn apply(&self, target: &mut RgbaImage) {
        for layer in &self.layers {
            blend_layer(target, layer);
        }
    }

    /// Get the number of layers.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }
}

/// Decode, scale and overlay the logo at all four corners of the base image.
pub fn composite(
    base: &[u8],
    logo: &[u8],
    config: &BrandingConfig,
) -> Result<RgbaImage, WatermarkError> {
    let base_image = decode_image(base, config.max_source_pixels)?;
    let logo_image = decode_image(logo, config.max_source_pixels)?;
    composite_images(&base_image, &logo_image, config)
}

/// Overlay an already decoded logo at all four corners of a decoded base.
pub fn composite_images(
    base: &DynamicImage,
    logo: &DynamicImage,
    config: &BrandingConfig,
) -> Result<RgbaImage, WatermarkError> {
    let mut canvas = base.to_rgba8();
    let image_dims = ImageDimensions {
        width: canvas.width(),
        height: canvas.height(),
    };

    let original = LogoDimensions {
        width: logo.width(),
        height: logo.height(),
    };
    let target = scaled_logo_dimensions(image_dims.width, &original, config.logo_ratio);
    let scaled_logo = resize_logo(logo, &target)?;

    let compositor = Compositor::for_corners(&scaled_logo, &image_dims, config.padding);
    compositor.apply(&mut canvas);

    tracing::debug!(
        base_width = image_dims.width,
        base_height = image_dims.height,
        logo_width = target.width,
        logo_height = target.height,
        layers = compositor.layer_count(),
        "Logo composited"
    );

    Ok(canvas)
}

/// Decode image bytes, sniffing the format from magic bytes.
///
/// Header dimensions are checked against `max_pixels` before the pixel data
/// is decoded.
pub fn decode_image(data: &[u8], max_pixels: u64) -> Result<DynamicImage, WatermarkError> {
    let (width, height) = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| WatermarkError::DecodeError(e.to_string()))?
        .into_dimensions()
        .map_err(|e| WatermarkError::DecodeError(e.to_string()))?;

    let pixels = width as u64 * height as u64;
    if pixels > max_pixels {
        return Err(WatermarkError::DecodeError(format!(
            "Image dimensions {}x{} ({} pixels) exceed limit of {} pixels",
            width, height, pixels, max_pixels
        )));
    }

    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| WatermarkError::DecodeError(e.to_string()))?
        .decode()
        .map_err(|e| WatermarkError::DecodeError(e.to_string()))
}

/// Resize the logo using fast-image-resize with Lanczos3 filter
fn resize_logo(
    logo: &DynamicImage,
    target: &LogoDimensions,
) -> Result<RgbaImage, WatermarkError> {
    if logo.width() == target.width && logo.height() == target.height {
        return Ok(logo.to_rgba8());
    }

    let src_width = NonZeroU32::new(logo.width())
        .ok_or_else(|| WatermarkError::ResizeError("Source width is 0".to_string()))?;
    let src_height = NonZeroU32::new(logo.height())
        .ok_or_else(|| WatermarkError::ResizeError("Source height is 0".to_string()))?;
    let dst_width = NonZeroU32::new(target.width)
        .ok_or_else(|| WatermarkError::ResizeError("Target width is 0".to_string()))?;
    let dst_height = NonZeroU32::new(target.height)
        .ok_or_else(|| WatermarkError::ResizeError("Target height is 0".to_string()))?;

    let mut src_image = Image::from_vec_u8(
        src_width,
        src_height,
        logo.to_rgba8().into_raw(),
        PixelType::U8x4,
    )
    .map_err(|e| WatermarkError::ResizeError(format!("Failed to create source image: {:?}", e)))?;

    // Premultiply so transparent edges do not bleed color into the result
    let alpha_mul_div = MulDiv::default();
    alpha_mul_div
        .multiply_alpha_inplace(&mut src_image.view_mut())
        .map_err(|e| WatermarkError::ResizeError(format!("Alpha premultiply failed: {:?}", e)))?;

    let mut dst_image = Image::new(dst_width, dst_height, PixelType::U8x4);

    let mut resizer = Resizer::new(ResizeAlg::Convolution(FilterType::Lanczos3));
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| WatermarkError::ResizeError(format!("Resize operation failed: {:?}", e)))?;

    alpha_mul_div
        .divide_alpha_inplace(&mut dst_image.view_mut())
        .map_err(|e| WatermarkError::ResizeError(format!("Alpha unpremultiply failed: {:?}", e)))?;

    RgbaImage::from_raw(target.width, target.height, dst_image.into_vec())
        .ok_or_else(|| WatermarkError::ResizeError("Failed to create output image buffer".to_string()))
}

/// Blend a single watermark layer onto the target image.
fn blend_layer(target: &mut RgbaImage, layer: &WatermarkLayer) {
    let target_width = target.width() as i32;
    let target_height = target.height() as i32;

    let wm_width = layer.image.width() as i32;
    let wm_height = layer.image.height() as i32;

    // Calculate the visible region (clamp to target bounds)
    let x_start = layer.position.x.max(0);
    let y_start = layer.position.y.max(0);
    let x_end = layer.position.x.saturating_add(wm_width).min(target_width);
    let y_end = layer.position.y.saturating_add(wm_height).min(target_height);

    for ty in y_start..y_end {
        for tx in x_start..x_end {
            let wx = (tx - layer.position.x) as u32;
            let wy = (ty - layer.position.y) as u32;

            let wm_pixel = layer.image.get_pixel(wx, wy);
            let target_pixel = target.get_pixel(tx as u32, ty as u32);

            let blended = blend_pixels(*target_pixel, *wm_pixel);
            target.put_pixel(tx as u32, ty as u32, blended);
        }
    }
}

/// Blend two pixels using alpha compositing.
///
/// Uses the "over" operator: result = foreground + background * (1 - foreground.alpha)
fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
