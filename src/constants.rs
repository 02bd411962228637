// Constants module - centralized default values for configuration
//
// Every default the config layer falls back to lives here so the env loader,
// the YAML loader and the tests agree on the same numbers.

// =============================================================================
// Server defaults
// =============================================================================

/// Default bind address
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default maximum webhook body size (1 MB)
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// Branding defaults
// =============================================================================

/// Bucket watched when none is configured
pub const DEFAULT_TARGET_BUCKET: &str = "heritage-majlis";

/// Distance between each logo copy and the image edges, in pixels
pub const DEFAULT_PADDING_PX: u32 = 20;

/// Largest accepted padding, in pixels
pub const MAX_PADDING_PX: u32 = 65_535;

/// Logo width as a fraction of the base image width
pub const DEFAULT_LOGO_RATIO: f64 = 0.15;

/// JPEG quality used for the branded output
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

pub const DEFAULT_COPYRIGHT: &str = "© Heritage Majlis. All rights reserved.";

pub const DEFAULT_KEYWORDS: &str = "heritage, majlis, archive";

/// Maximum decoded pixel count for base and logo images (100 megapixels)
pub const DEFAULT_MAX_SOURCE_PIXELS: u64 = 100_000_000;

// =============================================================================
// Storage defaults
// =============================================================================

pub const DEFAULT_STORAGE_REGION: &str = "us-east-1";

// =============================================================================
// Logo fetch defaults
// =============================================================================

/// Logo fetch timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Maximum redirects followed when fetching the logo
pub const DEFAULT_FETCH_MAX_REDIRECTS: usize = 10;

// =============================================================================
// Event identity
// =============================================================================

/// Event type tag of a creation event
pub const INSERT_EVENT_TYPE: &str = "INSERT";

/// Schema holding the storage object table
pub const STORAGE_SCHEMA: &str = "storage";

/// Table whose rows represent stored objects
pub const STORAGE_OBJECTS_TABLE: &str = "objects";

// =============================================================================
// Output
// =============================================================================

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Prefix written at the start of every injected comment
pub const BRANDING_MARKER: &str = "Branded-By: heritage-brander";
