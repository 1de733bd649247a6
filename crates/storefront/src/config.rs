//! Storefront client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Origin of the storefront server API (e.g., `https://shop.example.ru`)
//!
//! ## Optional
//! - `STOREFRONT_STORAGE_PATH` - Storage scope file (default: `.stationery/storage.json`)
//! - `STOREFRONT_CART_KEY` - Storage key holding the cart (default: `cart`)
//! - `STOREFRONT_CART_QUANTITY_POLICY` - `retain` or `remove` (default: `retain`)
//! - `STOREFRONT_CURRENCY` - `RUB`, `USD` or `EUR` (default: `RUB`)
//! - `STOREFRONT_CSRF_COOKIE` - Cookie holding the anti-forgery token (default: `csrftoken`)
//! - `STOREFRONT_COOKIES` - Cookie header string the token is read from
//! - `STOREFRONT_SEARCH_DEBOUNCE_MS` - Search debounce delay (default: 300)
//! - `STOREFRONT_SEARCH_MIN_CHARS` - Minimum query length (default: 2)
//! - `STOREFRONT_ALERT_TIMEOUT_SECS` - Alert auto-dismiss timeout (default: 5)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use stationery_core::{CurrencyCode, QuantityPolicy};
use thiserror::Error;
use url::Url;

use crate::cart::DEFAULT_CART_KEY;

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
    /// Origin of the storefront server API
    pub base_url: Url,
    /// Cart persistence settings
    pub cart: CartConfig,
    /// Outbound request settings
    pub api: ApiConfig,
    /// Product search settings
    pub search: SearchConfig,
    /// How long alerts stay visible
    pub alert_timeout: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Cart persistence configuration.
#[derive(Debug, Clone)]
pub struct CartConfig {
    /// File backing the storage scope
    pub storage_path: PathBuf,
    /// Storage key the cart is written under
    pub key: String,
    /// Handling of quantity updates to zero or below
    pub quantity_policy: QuantityPolicy,
    /// Currency totals are displayed in
    pub currency: CurrencyCode,
}

/// Outbound request configuration.
///
/// Implements `Debug` manually to redact the cookie string.
#[derive(Clone)]
pub struct ApiConfig {
    /// Name of the cookie carrying the anti-forgery token
    pub csrf_cookie: String,
    /// Raw cookie header string (`name=value; other=value`)
    pub cookies: Option<SecretString>,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("csrf_cookie", &self.csrf_cookie)
            .field("cookies", &self.cookies.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Product search configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
    /// Quiet period after the last keystroke before a request is sent
    pub debounce: Duration,
    /// Queries shorter than this (in characters) hide the results instead
    pub min_chars: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_chars: 2,
        }
    }
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

        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let base_url = parse_base_url("STOREFRONT_BASE_URL", &base_url)?;
        let cart = CartConfig::from_env()?;
        let api = ApiConfig::from_env();
        let search = SearchConfig::from_env()?;
        let alert_timeout = Duration::from_secs(parse_env_or_default(
            "STOREFRONT_ALERT_TIMEOUT_SECS",
            5_u64,
        )?);
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            base_url,
            cart,
            api,
            search,
            alert_timeout,
            sentry_dsn,
        })
    }
}

impl CartConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            storage_path: PathBuf::from(get_env_or_default(
                "STOREFRONT_STORAGE_PATH",
                ".stationery/storage.json",
            )),
            key: get_env_or_default("STOREFRONT_CART_KEY", DEFAULT_CART_KEY),
            quantity_policy: parse_quantity_policy(&get_env_or_default(
                "STOREFRONT_CART_QUANTITY_POLICY",
                "retain",
            ))
            .ok_or_else(|| {
                ConfigError::InvalidEnvVar(
                    "STOREFRONT_CART_QUANTITY_POLICY".to_string(),
                    "expected 'retain' or 'remove'".to_string(),
                )
            })?,
            currency: parse_currency(&get_env_or_default("STOREFRONT_CURRENCY", "RUB"))
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "STOREFRONT_CURRENCY".to_string(),
                        "expected RUB, USD or EUR".to_string(),
                    )
                })?,
        })
    }
}

impl ApiConfig {
    fn from_env() -> Self {
        Self {
            csrf_cookie: get_env_or_default("STOREFRONT_CSRF_COOKIE", "csrftoken"),
            cookies: get_optional_env("STOREFRONT_COOKIES").map(SecretString::from),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            csrf_cookie: "csrftoken".to_string(),
            cookies: None,
        }
    }
}

impl SearchConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            debounce: Duration::from_millis(parse_env_or_default(
                "STOREFRONT_SEARCH_DEBOUNCE_MS",
                300_u64,
            )?),
            min_chars: parse_env_or_default("STOREFRONT_SEARCH_MIN_CHARS", 2_usize)?,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_optional_env(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        None => Ok(default),
    }
}

/// Parse and validate the API origin.
fn parse_base_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "URL must have a host".to_string(),
        ));
    }
    Ok(url)
}

fn parse_quantity_policy(value: &str) -> Option<QuantityPolicy> {
    match value.trim().to_ascii_lowercase().as_str() {
        "retain" => Some(QuantityPolicy::Retain),
        "remove" => Some(QuantityPolicy::RemoveNonPositive),
        _ => None,
    }
}

fn parse_currency(value: &str) -> Option<CurrencyCode> {
    match value.trim().to_ascii_uppercase().as_str() {
        "RUB" => Some(CurrencyCode::RUB),
        "USD" => Some(CurrencyCode::USD),
        "EUR" => Some(CurrencyCode::EUR),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_base_url_valid() {
        let url = parse_base_url("TEST_VAR", "https://shop.example.ru").unwrap();
        assert_eq!(url.host_str(), Some("shop.example.ru"));
    }

    #[test]
    fn test_parse_base_url_rejects_bad_scheme() {
        let err = parse_base_url("TEST_VAR", "ftp://shop.example.ru").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_parse_base_url_rejects_garbage() {
        assert!(parse_base_url("TEST_VAR", "not a url").is_err());
    }

    #[test]
    fn test_parse_quantity_policy() {
        assert_eq!(parse_quantity_policy("retain"), Some(QuantityPolicy::Retain));
        assert_eq!(
            parse_quantity_policy(" Remove "),
            Some(QuantityPolicy::RemoveNonPositive)
        );
        assert_eq!(parse_quantity_policy("delete"), None);
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency("rub"), Some(CurrencyCode::RUB));
        assert_eq!(parse_currency("EUR"), Some(CurrencyCode::EUR));
        assert_eq!(parse_currency("JPY"), None);
    }

    #[test]
    fn test_parse_env_or_default_uses_default_when_unset() {
        let value: u64 = parse_env_or_default("STATIONERY_TEST_SURELY_UNSET_VAR", 300).unwrap();
        assert_eq!(value, 300);
    }

    #[test]
    fn test_search_config_default() {
        let config = SearchConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.min_chars, 2);
    }

    #[test]
    fn test_api_config_debug_redacts_cookies() {
        let config = ApiConfig {
            csrf_cookie: "csrftoken".to_string(),
            cookies: Some(SecretString::from("sessionid=super_secret_session")),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("csrftoken"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_session"));
    }
}
