// Error types module

use crate::storage::StorageError;
use crate::watermark::WatermarkError;

/// Centralized error type for a branding invocation
///
/// Each variant maps to one HTTP status so the orchestrator can turn the
/// first failure it meets directly into a response.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BrandingError {
    /// Malformed webhook body (invalid JSON, oversized payload)
    #[error("Rejected input: {0}")]
    RejectedInput(String),

    /// Request used an HTTP method other than POST/OPTIONS
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),

    /// Required configuration is missing (logo URL, storage credentials)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Base image download or logo fetch failed
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Image bytes could not be decoded as a raster
    #[error("Decode error: {0}")]
    Decode(String),

    /// Writing the branded image back to storage failed
    #[error("Upload error: {0}")]
    Upload(String),

    /// Any other fault during composite/encode/inject
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl BrandingError {
    /// Maps branding errors to HTTP status codes
    ///
    /// - RejectedInput → 400
    /// - MethodNotAllowed → 405
    /// - everything else → 500
    pub fn to_http_status(&self) -> u16 {
        match self {
            BrandingError::RejectedInput(_) => 400,
            BrandingError::MethodNotAllowed(_) => 405,
            BrandingError::Configuration(_)
            | BrandingError::Fetch(_)
            | BrandingError::Decode(_)
            | BrandingError::Upload(_)
            | BrandingError::Unexpected(_) => 500,
        }
    }

    /// Message safe to return in a response body.
    ///
    /// Unexpected faults only expose a generic text; the detail goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            BrandingError::Unexpected(_) => "Internal processing error".to_string(),
            other => other.to_string(),
        }
    }

    /// Short machine-friendly category name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            BrandingError::RejectedInput(_) => "rejected_input",
            BrandingError::MethodNotAllowed(_) => "method_not_allowed",
            BrandingError::Configuration(_) => "configuration",
            BrandingError::Fetch(_) => "fetch",
            BrandingError::Decode(_) => "decode",
            BrandingError::Upload(_) => "upload",
            BrandingError::Unexpected(_) => "unexpected",
        }
    }
}

impl From<WatermarkError> for BrandingError {
    fn from(err: WatermarkError) -> Self {
        match err {
            WatermarkError::DecodeError(msg) => BrandingError::Decode(msg),
            WatermarkError::FetchError(msg) => BrandingError::Fetch(msg),
            WatermarkError::ConfigError(msg) => BrandingError::Configuration(msg),
            WatermarkError::ResizeError(msg) => BrandingError::Unexpected(msg),
        }
    }
}

impl From<StorageError> for BrandingError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Download { .. } => BrandingError::Fetch(err.to_string()),
            StorageError::Upload { .. } => BrandingError::Upload(err.to_string()),
            StorageError::Client(msg) => BrandingError::Configuration(msg),
        }
    }
}
