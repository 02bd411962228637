//! Storage backend and logo fetch configuration.
//!
//! The storage backend is any S3-compatible endpoint. Credentials may be
//! absent at startup; the pipeline then answers every actionable event with
//! a configuration error instead of refusing to boot.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_FETCH_MAX_REDIRECTS, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_STORAGE_REGION,
};

fn default_region() -> String {
    DEFAULT_STORAGE_REGION.to_string()
}

fn default_force_path_style() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}

fn default_max_redirects() -> usize {
    DEFAULT_FETCH_MAX_REDIRECTS
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// S3-compatible endpoint URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Use `endpoint/bucket/key` addressing instead of virtual-hosted buckets
    #[serde(default = "default_force_path_style")]
    pub force_path_style: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            region: default_region(),
            access_key: None,
            secret_key: None,
            force_path_style: default_force_path_style(),
        }
    }
}

impl StorageConfig {
    /// Names of the settings that still need a value
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.endpoint) {
            missing.push("endpoint");
        }
        if is_blank(&self.access_key) {
            missing.push("access_key");
        }
        if is_blank(&self.secret_key) {
            missing.push("secret_key");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or_default().is_empty()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Logo fetch timeout in seconds (default: 30)
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    /// Redirects followed before giving up (default: 10)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            max_redirects: default_max_redirects(),
        }
    }
}
