//! JPEG encoder for the composited canvas.
//!
//! The branded output is always JPEG. Quality comes from configuration and
//! is clamped to the 1-100 range the codec accepts.

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};

use crate::constants::JPEG_CONTENT_TYPE;
use crate::error::BrandingError;

/// Result of encoding an image
#[derive(Debug, Clone)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Bytes,
    /// Content-Type header value
    pub content_type: &'static str,
    pub width: u32,
    pub height: u32,
}

impl EncodedImage {
    /// Replace the payload, keeping the rest of the metadata
    pub fn with_data(self, data: Bytes) -> Self {
        Self { data, ..self }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Encode an RGBA canvas to baseline JPEG.
///
/// JPEG has no alpha channel, so alpha is dropped before encoding.
pub fn encode_jpeg(image: &RgbaImage, quality: u8) -> Result<EncodedImage, BrandingError> {
    let (width, height) = image.dimensions();
    let rgb_data = rgba_to_rgb(image.as_raw());

    let mut output = Vec::with_capacity(rgb_data.len() / 8);
    let encoder = JpegEncoder::new_with_quality(&mut output, quality.clamp(1, 100));
    encoder
        .write_image(&rgb_data, width, height, ColorType::Rgb8)
        .map_err(|e| BrandingError::Unexpected(format!("JPEG encoding failed: {e}")))?;

    Ok(EncodedImage {
        data: Bytes::from(output),
        content_type: JPEG_CONTENT_TYPE,
        width,
        height,
    })
}

/// Strip the alpha channel from packed RGBA data
fn rgba_to_rgb(data: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(data.len() / 4 * 3);
    for pixel in data.chunks_exact(4) {
        rgb.extend_from_slice(&pixel[..3]);
    }
    rgb
}
