//! Errors raised while fetching, decoding and compositing the logo overlay.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WatermarkError {
    #[error("Logo fetch failed: {0}")]
    FetchError(String),

    /// Base image or logo could not be decoded, or exceeds the pixel limit
    #[error("Image decode failed: {0}")]
    DecodeError(String),

    #[error("Logo resize failed: {0}")]
    ResizeError(String),

    /// The logo fetcher could not be built from its settings
    #[error("Logo fetcher misconfigured: {0}")]
    ConfigError(String),
}
