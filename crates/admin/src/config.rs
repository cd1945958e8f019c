//! Dashboard client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `CARTLINK_API_BASE_URL` - Backend base URL (default: `http://localhost:8000`)
//! - `CARTLINK_API_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `CARTLINK_PLACEHOLDER_IMAGE` - Image shown for products without one
//!   (default: `/placeholder-product.png`)
//! - `CARTLINK_ADMIN_API_KEY` - Bearer token for the dashboard endpoints

use std::time::Duration;

use cartlink_core::{DEFAULT_PLACEHOLDER_IMAGE, ImageResolver};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Dashboard client configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// Backend base URL; dashboard endpoints live under `/api/products` and
    /// `/api/orders`
    pub api_base_url: Url,
    /// Per-request timeout
    pub timeout: Duration,
    /// Bearer token, if the backend sits behind an authenticating proxy
    pub api_key: Option<SecretString>,
    /// Path rendered for products without an image
    pub placeholder_image: String,
}

impl AdminConfig {
    /// Configuration with defaults for everything except the base URL.
    #[must_use]
    pub fn new(api_base_url: Url) -> Self {
        Self {
            api_base_url,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            api_key: None,
            placeholder_image: DEFAULT_PLACEHOLDER_IMAGE.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url =
            lookup("CARTLINK_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(raw_url.trim()).map_err(|e| {
            ConfigError::InvalidEnvVar("CARTLINK_API_BASE_URL".to_string(), e.to_string())
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") || api_base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidEnvVar(
                "CARTLINK_API_BASE_URL".to_string(),
                "must be an http(s) base URL".to_string(),
            ));
        }

        let timeout_secs = lookup("CARTLINK_API_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("CARTLINK_API_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let api_key = lookup("CARTLINK_ADMIN_API_KEY")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                validate_api_key(&raw, "CARTLINK_ADMIN_API_KEY")?;
                Ok::<_, ConfigError>(SecretString::from(raw))
            })
            .transpose()?;

        let placeholder_image = lookup("CARTLINK_PLACEHOLDER_IMAGE")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PLACEHOLDER_IMAGE.to_string());

        Ok(Self {
            api_base_url,
            timeout: Duration::from_secs(timeout_secs),
            api_key,
            placeholder_image,
        })
    }

    /// Image resolver bound to the configured base URL.
    #[must_use]
    pub fn image_resolver(&self) -> ImageResolver {
        ImageResolver::new(self.api_base_url.as_str(), self.placeholder_image.clone())
    }

    /// `Authorization` header value, if a key is configured.
    pub(crate) fn authorization(&self) -> Option<String> {
        self.api_key
            .as_ref()
            .map(|key| format!("Bearer {}", key.expose_secret()))
    }
}

/// Reject keys that were obviously copied from a sample `.env`.
fn validate_api_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = key.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if key.chars().any(char::is_whitespace) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "must not contain whitespace".to_string(),
        ));
    }

    Ok(())
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
        let config = AdminConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_base_url.as_str(), "http://localhost:8000/");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.api_key.is_none());
        assert!(config.authorization().is_none());
    }

    #[test]
    fn test_api_key_becomes_bearer() {
        let config =
            AdminConfig::from_lookup(lookup(&[("CARTLINK_ADMIN_API_KEY", " k9Qz2mLr7vTx ")]))
                .unwrap();
        assert_eq!(config.authorization().as_deref(), Some("Bearer k9Qz2mLr7vTx"));
    }

    #[test]
    fn test_api_key_redacted_in_debug() {
        let config =
            AdminConfig::from_lookup(lookup(&[("CARTLINK_ADMIN_API_KEY", "k9Qz2mLr7vTx")]))
                .unwrap();
        assert!(!format!("{config:?}").contains("k9Qz2mLr7vTx"));
    }

    #[test]
    fn test_placeholder_api_key_rejected() {
        let result =
            AdminConfig::from_lookup(lookup(&[("CARTLINK_ADMIN_API_KEY", "your-api-key")]));
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let config =
            AdminConfig::from_lookup(lookup(&[("CARTLINK_ADMIN_API_KEY", "   ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_base_url() {
        let result = AdminConfig::from_lookup(lookup(&[("CARTLINK_API_BASE_URL", "not a url")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result =
            AdminConfig::from_lookup(lookup(&[("CARTLINK_API_BASE_URL", "mailto:ops@shop.mx")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
