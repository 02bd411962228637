//! Watermark module for branding images with a corner logo.
//!
//! The logo is scaled to a fixed fraction of the base image width and drawn
//! once in each corner, at a constant padding from both edges.
//!
//! # Stages
//!
//! - [`image_fetcher`]: fetch the logo bytes over HTTP(S)
//! - [`position`]: logo scaling and the four corner placements
//! - [`compositor`]: decode, resize and alpha-blend the overlays

pub mod compositor;
pub mod error;
pub mod image_fetcher;
pub mod position;

// Re-export main types for convenience
pub use compositor::{composite, composite_images, decode_image, Compositor, WatermarkLayer};
pub use error::WatermarkError;
pub use image_fetcher::{HttpLogoFetcher, LogoSource};
#[cfg(test)]
pub use image_fetcher::MockLogoSource;
pub use position::{
    calculate_corner_position, corner_placements, scaled_logo_dimensions, Corner,
    ImageDimensions, LogoDimensions, PlacementPosition,
};
