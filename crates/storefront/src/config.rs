//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CARTLINK_API_BASE_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `CARTLINK_API_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `CARTLINK_PLACEHOLDER_IMAGE` - Image shown for products without one
//!   (default: `/placeholder-product.png`)

use std::time::Duration;

use cartlink_core::{DEFAULT_PLACEHOLDER_IMAGE, ImageResolver};
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend base URL; cart endpoints live under `/api/cart`
    pub api_base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Path rendered for products without an image
    pub placeholder_image: String,
}

impl StorefrontConfig {
    /// Configuration with defaults for everything except the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = parse_base_url(
            "CARTLINK_API_BASE_URL",
            &lookup("CARTLINK_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
        )?;

        let timeout_secs = lookup("CARTLINK_API_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CARTLINK_API_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let placeholder_image = lookup("CARTLINK_PLACEHOLDER_IMAGE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE.to_string());

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            placeholder_image,
        })
    }

    /// Image resolver bound to the configured base URL.
    #[must_use]
    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(self.api_base_url.as_str(), self.placeholder_image.clone())
    }
}

/// Parse and validate an HTTP(S) base URL.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL cannot be used as a base".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.placeholder_image, "/placeholder-product.png");
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup(&[
            ("CARTLINK_API_BASE_URL", "https://api.tienda.example/"),
            ("CARTLINK_API_TIMEOUT_SECS", "3"),
            ("CARTLINK_PLACEHOLDER_IMAGE", "/img/none.svg"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url.host_str(), Some("api.tienda.example"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.placeholder_image, "/img/none.svg");
    }

    #[test]
    fn test_invalid_timeout() {
        let result =
            StorefrontConfig::from_lookup(lookup(&[("CARTLINK_API_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(key, _)) if key == "CARTLINK_API_TIMEOUT_SECS"));
    }

    #[test]
    fn test_invalid_base_url_scheme() {
        let result =
            StorefrontConfig::from_lookup(lookup(&[("CARTLINK_API_BASE_URL", "ftp://files.local")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_image_resolver_uses_base_url() {
        let config = StorefrontConfig::new(Url::parse("http://localhost:8000").unwrap());
        assert_eq!(
            config.image_resolver().url_for(Some("/static/p.png")),
            "http://localhost:8000/static/p.png"
        );
    }
}
