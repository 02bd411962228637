//! Copyright/keyword metadata carried in a JPEG COM segment.

use super::encoder::EncodedImage;
use super::segment::{inject_comment, leading_comment};
use crate::config::BrandingConfig;
use crate::constants::BRANDING_MARKER;

/// Build the comment text embedded in every branded image.
///
/// ```text
/// Branded-By: heritage-brander; Copyright: <copyright>; Keywords: <keywords>
/// ```
pub fn build_comment(branding: &BrandingConfig) -> String {
    format!(
        "{BRANDING_MARKER}; Copyright: {}; Keywords: {}",
        branding.copyright.trim(),
        branding.keywords.trim()
    )
}

/// Embed the configured metadata comment into an encoded JPEG.
pub fn inject_metadata(encoded: EncodedImage, branding: &BrandingConfig) -> EncodedImage {
    let comment = build_comment(branding);
    let data = inject_comment(encoded.data.clone(), &comment);
    encoded.with_data(data)
}

/// Whether `data` already carries a comment written by this service.
pub fn is_branded(data: &[u8]) -> bool {
    leading_comment(data)
        .map(|payload| payload.starts_with(BRANDING_MARKER.as_bytes()))
        .unwrap_or(false)
}
