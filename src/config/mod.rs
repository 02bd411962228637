// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

pub mod branding;
pub mod server;
pub mod storage;

pub use branding::BrandingConfig;
pub use server::ServerConfig;
pub use storage::{FetchConfig, StorageConfig};

/// Process-wide configuration, read once at startup and never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub branding: BrandingConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Config {
    /// Build configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unset and blank variables fall back to defaults. Values that are set
    /// but fail to parse are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Config::default();

        let server = ServerConfig {
            address: get("SERVER_ADDRESS").unwrap_or(defaults.server.address),
            port: parse_var(&get, "SERVER_PORT", defaults.server.port)?,
            max_body_size: parse_var(
                &get,
                "SERVER_MAX_BODY_SIZE",
                defaults.server.max_body_size,
            )?,
        };

        let branding = BrandingConfig {
            target_bucket: get("BRANDING_TARGET_BUCKET")
                .unwrap_or(defaults.branding.target_bucket),
            logo_url: get("BRANDING_LOGO_URL"),
            padding: parse_var(&get, "BRANDING_PADDING_PX", defaults.branding.padding)?,
            logo_ratio: parse_var(&get, "BRANDING_LOGO_RATIO", defaults.branding.logo_ratio)?,
            jpeg_quality: parse_var(
                &get,
                "BRANDING_JPEG_QUALITY",
                defaults.branding.jpeg_quality,
            )?,
            copyright: get("BRANDING_COPYRIGHT").unwrap_or(defaults.branding.copyright),
            keywords: get("BRANDING_KEYWORDS").unwrap_or(defaults.branding.keywords),
            skip_already_branded: parse_bool_var(
                &get,
                "BRANDING_SKIP_ALREADY_BRANDED",
                defaults.branding.skip_already_branded,
            )?,
            max_source_pixels: parse_var(
                &get,
                "BRANDING_MAX_SOURCE_PIXELS",
                defaults.branding.max_source_pixels,
            )?,
        };

        let storage = StorageConfig {
            endpoint: get("STORAGE_ENDPOINT"),
            region: get("STORAGE_REGION").unwrap_or(defaults.storage.region),
            access_key: get("STORAGE_ACCESS_KEY"),
            secret_key: get("STORAGE_SECRET_KEY"),
            force_path_style: parse_bool_var(
                &get,
                "STORAGE_FORCE_PATH_STYLE",
                defaults.storage.force_path_style,
            )?,
        };

        let fetch = FetchConfig {
            timeout_secs: parse_var(&get, "FETCH_TIMEOUT_SECS", defaults.fetch.timeout_secs)?,
            max_redirects: parse_var(&get, "FETCH_MAX_REDIRECTS", defaults.fetch.max_redirects)?,
        };

        Ok(Config {
            server,
            branding,
            storage,
            fetch,
        })
    }

    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    /// Reject configurations that can never produce a valid branding run.
    ///
    /// A missing logo URL or incomplete storage credentials are not checked
    /// here; the pipeline reports those per invocation.
    pub fn validate(&self) -> Result<(), String> {
        self.branding.validate()?;

        if self.server.max_body_size == 0 {
            return Err("Server max_body_size must be > 0".to_string());
        }

        if self.fetch.timeout_secs == 0 {
            return Err("Fetch timeout_secs must be > 0".to_string());
        }

        if let Some(url) = self.branding.logo_url() {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!(
                    "Branding logo URL '{}' must use http:// or https://",
                    url
                ));
            }
        }

        Ok(())
    }
}

fn parse_var<T, G>(get: &G, name: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("Invalid value for {}: '{}' ({})", name, raw, e)),
        None => Ok(default),
    }
}

fn parse_bool_var<G>(get: &G, name: &str, default: bool) -> Result<bool, String>
where
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("Invalid value for {}: '{}' (expected true/false)", name, raw)),
        },
        None => Ok(default),
    }
}
