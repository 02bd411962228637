//! Branding configuration types.
//!
//! Everything the pipeline needs to decide *what* to brand and *how*:
//! the watched bucket, the logo source, overlay geometry, output quality and
//! the metadata text. Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_COPYRIGHT, DEFAULT_JPEG_QUALITY, DEFAULT_KEYWORDS, DEFAULT_LOGO_RATIO,
    DEFAULT_MAX_SOURCE_PIXELS, DEFAULT_PADDING_PX, DEFAULT_TARGET_BUCKET, MAX_PADDING_PX,
};

fn default_target_bucket() -> String {
    DEFAULT_TARGET_BUCKET.to_string()
}

fn default_padding() -> u32 {
    DEFAULT_PADDING_PX
}

fn default_logo_ratio() -> f64 {
    DEFAULT_LOGO_RATIO
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_copyright() -> String {
    DEFAULT_COPYRIGHT.to_string()
}

fn default_keywords() -> String {
    DEFAULT_KEYWORDS.to_string()
}

fn default_skip_already_branded() -> bool {
    true
}

fn default_max_source_pixels() -> u64 {
    DEFAULT_MAX_SOURCE_PIXELS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandingConfig {
    /// Only events for this bucket are processed, and only this bucket is written
    #[serde(default = "default_target_bucket")]
    pub target_bucket: String,

    /// Logo image URL. Required for branding, but its absence is reported
    /// per invocation rather than at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Padding between each logo copy and the image edges, in pixels
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Logo width as a fraction of the base image width (0 < ratio <= 1)
    #[serde(default = "default_logo_ratio")]
    pub logo_ratio: f64,

    /// JPEG output quality (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    #[serde(default = "default_copyright")]
    pub copyright: String,

    #[serde(default = "default_keywords")]
    pub keywords: String,

    /// Skip objects whose leading comment shows they were already branded
    #[serde(default = "default_skip_already_branded")]
    pub skip_already_branded: bool,

    /// Decode guard: images above this pixel count are rejected
    #[serde(default = "default_max_source_pixels")]
    pub max_source_pixels: u64,
}

impl Default for BrandingConfig {
    fn default() -> Self {
        Self {
            target_bucket: default_target_bucket(),
            logo_url: None,
            padding: default_padding(),
            logo_ratio: default_logo_ratio(),
            jpeg_quality: default_jpeg_quality(),
            copyright: default_copyright(),
            keywords: default_keywords(),
            skip_already_branded: default_skip_already_branded(),
            max_source_pixels: default_max_source_pixels(),
        }
    }
}

impl BrandingConfig {
    /// The configured logo URL, ignoring blank values
    pub fn logo_url(&self) -> Option<&str> {
        self.logo_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.target_bucket.trim().is_empty() {
            return Err("Branding target bucket cannot be empty".to_string());
        }

        if !(self.logo_ratio > 0.0 && self.logo_ratio <= 1.0) {
            return Err(format!(
                "Branding logo ratio {} is out of range. Must be > 0 and <= 1.",
                self.logo_ratio
            ));
        }

        if self.padding > MAX_PADDING_PX {
            return Err(format!(
                "Branding padding {} is out of range. Must be <= {}.",
                self.padding, MAX_PADDING_PX
            ));
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(format!(
                "Branding JPEG quality {} is out of range. Must be 1-100.",
                self.jpeg_quality
            ));
        }

        if self.max_source_pixels == 0 {
            return Err("Branding max_source_pixels must be > 0".to_string());
        }

        Ok(())
    }
}
