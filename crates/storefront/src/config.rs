//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `HABALUNA_API_URL` - Base URL of the backend REST API (e.g. `https://api.habaluna.cu/api`)
//!
//! ## Optional
//! - `HABALUNA_STATE_DIR` - Directory for durable client state (default: `.habaluna`)
//! - `HABALUNA_HTTP_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `HABALUNA_CACHE_TTL_SECS` - Catalog cache TTL (default: 300)
//! - `HABALUNA_CURRENCY` - Currency used for local cart totals, `USD` or `CUP` (default: USD)

use std::path::PathBuf;
use std::time::Duration;

use habaluna_core::Currency;
use thiserror::Error;
use url::Url;

const DEFAULT_STATE_DIR: &str = ".habaluna";
const DEFAULT_HTTP_TIMEOUT_SECS: &str = "30";
const DEFAULT_CACHE_TTL_SECS: &str = "300";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API base URL (always ends with `/`)
    pub api_url: Url,
    /// Directory holding the durable cart/auth/wishlist records
    pub state_dir: PathBuf,
    /// Timeout applied to every HTTP request
    pub http_timeout: Duration,
    /// Time-to-live for cached catalog responses
    pub cache_ttl: Duration,
    /// Currency used when the cart computes totals locally
    pub currency: Currency,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw_url = lookup("HABALUNA_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("HABALUNA_API_URL".to_string()))?;
        let api_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("HABALUNA_API_URL".to_string(), e))?;

        let state_dir = PathBuf::from(
            lookup("HABALUNA_STATE_DIR").unwrap_or_else(|| DEFAULT_STATE_DIR.to_string()),
        );

        let http_timeout = parse_secs(
            "HABALUNA_HTTP_TIMEOUT_SECS",
            lookup("HABALUNA_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let cache_ttl = parse_secs(
            "HABALUNA_CACHE_TTL_SECS",
            lookup("HABALUNA_CACHE_TTL_SECS"),
            DEFAULT_CACHE_TTL_SECS,
        )?;

        let currency = match lookup("HABALUNA_CURRENCY") {
            Some(value) => value.parse::<Currency>().map_err(|e| {
                ConfigError::InvalidEnvVar("HABALUNA_CURRENCY".to_string(), e.to_string())
            })?,
            None => Currency::default(),
        };

        Ok(Self {
            api_url,
            state_dir,
            http_timeout,
            cache_ttl,
            currency,
        })
    }

    /// Configuration pointing at `api_url` with every other setting defaulted.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not an absolute http(s) URL.
    pub fn with_api_url(api_url: &str) -> Result<Self, ConfigError> {
        let owned = api_url.to_string();
        Self::from_lookup(move |key| (key == "HABALUNA_API_URL").then(|| owned.clone()))
    }
}

/// Parse the API base URL, forcing a trailing slash so relative joins keep the path.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme '{}'", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_secs(key: &str, value: Option<String>, default: &str) -> Result<Duration, ConfigError> {
    value
        .as_deref()
        .unwrap_or(default)
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("HABALUNA_API_URL", "http://localhost:4000/api")]))
                .unwrap();

        assert_eq!(config.api_url.as_str(), "http://localhost:4000/api/");
        assert_eq!(config.state_dir, PathBuf::from(".habaluna"));
        assert_eq!(config.http_timeout, Duration::from_secs(30));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.currency, Currency::Usd);
    }

    #[test]
    fn test_missing_api_url() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref key) if key == "HABALUNA_API_URL"));
    }

    #[test]
    fn test_invalid_api_url() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[("HABALUNA_API_URL", "ftp://x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));

        let err = StorefrontConfig::from_lookup(lookup_from(&[("HABALUNA_API_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("HABALUNA_API_URL", "https://api.example.cu/"),
            ("HABALUNA_STATE_DIR", "/tmp/hb"),
            ("HABALUNA_HTTP_TIMEOUT_SECS", "5"),
            ("HABALUNA_CACHE_TTL_SECS", "60"),
            ("HABALUNA_CURRENCY", "cup"),
        ]))
        .unwrap();

        assert_eq!(config.api_url.as_str(), "https://api.example.cu/");
        assert_eq!(config.state_dir, PathBuf::from("/tmp/hb"));
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
        assert_eq!(config.currency, Currency::Cup);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[
            ("HABALUNA_API_URL", "http://localhost"),
            ("HABALUNA_HTTP_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "HABALUNA_HTTP_TIMEOUT_SECS")
        );
    }

    #[test]
    fn test_with_api_url() {
        let config = StorefrontConfig::with_api_url("http://127.0.0.1:9000").unwrap();
        assert_eq!(config.api_url.as_str(), "http://127.0.0.1:9000/");
    }
}
