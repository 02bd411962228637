//! Position calculation for corner logo placement.
//!
//! The logo is scaled relative to the base image width and then placed in
//! each of the four corners at a fixed padding from both edges.
//!
//! # Example
//!
//! ```ignore
//! use heritage_brander::watermark::position::{corner_placements, ImageDimensions, LogoDimensions};
//!
//! let image = ImageDimensions { width: 800, height: 600 };
//! let logo = LogoDimensions { width: 100, height: 50 };
//!
//! let [tl, tr, bl, br] = corner_placements(&image, &logo, 10);
//! assert_eq!((br.x, br.y), (690, 540)); // 800 - 100 - 10, 600 - 50 - 10
//! ```

/// Dimensions of the base image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Dimensions of the (scaled) logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoDimensions {
    pub width: u32,
    pub height: u32,
}

/// Top-left offset of one logo copy on the base image.
///
/// Signed: when the logo plus padding is wider than the image the offset goes
/// negative and the overlay is cropped at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPosition {
    pub x: i32,
    pub y: i32,
}

impl PlacementPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The four corners a logo copy is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Draw order
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Scale the logo to `ratio` of the base width, keeping its aspect ratio.
///
/// `width = max(1, round(base_width * ratio))`
/// `height = max(1, round(logo_height * width / logo_width))`
pub fn scaled_logo_dimensions(
    base_width: u32,
    original: &LogoDimensions,
    ratio: f64,
) -> LogoDimensions {
    let width = ((base_width as f64 * ratio).round() as u32).max(1);

    let height = if original.width == 0 {
        1
    } else {
        ((original.height as f64 * width as f64 / original.width as f64).round() as u32).max(1)
    };

    LogoDimensions { width, height }
}

/// Calculate the placement of a single corner.
pub fn calculate_corner_position(
    corner: Corner,
    image: &ImageDimensions,
    logo: &LogoDimensions,
    padding: u32,
) -> PlacementPosition {
    let p = i64::from(padding);
    let right = i64::from(image.width) - i64::from(logo.width) - p;
    let bottom = i64::from(image.height) - i64::from(logo.height) - p;

    let (x, y) = match corner {
        Corner::TopLeft => (p, p),
        Corner::TopRight => (right, p),
        Corner::BottomLeft => (p, bottom),
        Corner::BottomRight => (right, bottom),
    };

    PlacementPosition::new(clamp_offset(x), clamp_offset(y))
}

// Offsets past the i32 range are far off-canvas either way
fn clamp_offset(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Placements for all four corners, in draw order.
pub fn corner_placements(
    image: &ImageDimensions,
    logo: &LogoDimensions,
    padding: u32,
) -> [PlacementPosition; 4] {
    Corner::ALL.map(|corner| calculate_corner_position(corner, image, logo, padding))
}
