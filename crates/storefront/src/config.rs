//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_STOREFRONT_PRIVATE_TOKEN` - Storefront API private access token
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_COUNTRY` - Default buyer country (default: US)
//! - `STOREFRONT_LANGUAGE` - Default content language (default: EN)
//! - `SHOPIFY_API_VERSION` - API version (default: 2026-01)
//! - `SHOPIFY_STOREFRONT_ENDPOINT` - Full GraphQL endpoint override (proxies, tests)
//! - `VARIANT_PAGE_SIZE` - Variants fetched per product, 1-250 (default: 250)
//! - `TRACKING_ENDPOINT` - Ad-tracking event endpoint (unset disables tracking)
//! - `TRACKING_QUEUE_CAPACITY` - Pending tracking events before dropping (default: 256)
//! - `CLICK_ID_PARAM` - Query parameter carrying the ad click id (default: ttclid)
//! - `CLICK_ID_SOURCE` - Traffic source reported with a click id (default: tiktok)
//! - `INCENTIVE_OFFERS` - Offer table as `label:code,label:code,label:code`
//! - `SESSION_MAX_ENTRIES` - Live visitor sessions kept in memory (default: 100000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate (default: 0.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use quickbuy_core::IncentiveOffers;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::shopify::Locale;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Shopify caps connection pages at 250 nodes.
pub const MAX_VARIANT_PAGE_SIZE: u32 = 250;

const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Default bound on in-memory visitor sessions.
pub const DEFAULT_MAX_SESSIONS: u64 = 100_000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Locale used when the address carries no locale segment
    pub default_locale: Locale,
    /// Ad-tracking configuration
    pub analytics: AnalyticsConfig,
    /// Three-tier incentive offer table
    pub incentive_offers: IncentiveOffers,
    /// Upper bound on sessions held by the session store
    pub max_sessions: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry transaction sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact secret fields.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2026-01)
    pub api_version: String,
    /// Storefront API private access token (server-side only)
    pub storefront_private_token: SecretString,
    /// GraphQL endpoint override; derived from `store` when unset
    pub endpoint_override: Option<Url>,
    /// Number of variants requested per product
    pub variant_page_size: u32,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_private_token", &"[REDACTED]")
            .field("endpoint_override", &self.endpoint_override)
            .field("variant_page_size", &self.variant_page_size)
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// The Storefront GraphQL endpoint.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint_override.as_ref().map_or_else(
            || {
                format!(
                    "https://{}/api/{}/graphql.json",
                    self.store, self.api_version
                )
            },
            ToString::to_string,
        )
    }
}

/// Ad-tracking configuration.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Tracking endpoint; `None` disables event dispatch
    pub tracking_endpoint: Option<Url>,
    /// Bounded queue size between request handlers and the sender
    pub queue_capacity: usize,
    /// Query parameter carrying the ad click id
    pub click_id_param: String,
    /// Source reported when a click id is present
    pub click_id_source: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            tracking_endpoint: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            click_id_param: "ttclid".to_string(),
            click_id_source: "tiktok".to_string(),
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
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = parse_url("STOREFRONT_BASE_URL", &get_required_env("STOREFRONT_BASE_URL")?)?;

        let shopify = ShopifyStorefrontConfig::from_env()?;
        let default_locale = Locale::new(
            &get_env_or_default("STOREFRONT_LANGUAGE", "EN"),
            &get_env_or_default("STOREFRONT_COUNTRY", "US"),
        );
        let analytics = AnalyticsConfig::from_env()?;
        let incentive_offers = match get_optional_env("INCENTIVE_OFFERS") {
            Some(value) => IncentiveOffers::parse(&value).map_err(|e| {
                ConfigError::InvalidEnvVar("INCENTIVE_OFFERS".to_string(), e.to_string())
            })?,
            None => IncentiveOffers::default(),
        };
        let max_sessions = match get_optional_env("SESSION_MAX_ENTRIES") {
            Some(value) => parse_max_sessions(&value)?,
            None => DEFAULT_MAX_SESSIONS,
        };

        Ok(Self {
            host,
            port,
            base_url,
            shopify,
            default_locale,
            analytics,
            incentive_offers,
            max_sessions,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_sample_rate("SENTRY_SAMPLE_RATE", 1.0)?,
            sentry_traces_sample_rate: parse_sample_rate("SENTRY_TRACES_SAMPLE_RATE", 0.0)?,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

impl ShopifyStorefrontConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let endpoint_override = get_optional_env("SHOPIFY_STOREFRONT_ENDPOINT")
            .map(|value| parse_url("SHOPIFY_STOREFRONT_ENDPOINT", &value))
            .transpose()?;
        let variant_page_size =
            parse_variant_page_size(&get_env_or_default("VARIANT_PAGE_SIZE", "250"))?;

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", "2026-01"),
            storefront_private_token: get_validated_secret("SHOPIFY_STOREFRONT_PRIVATE_TOKEN")?,
            endpoint_override,
            variant_page_size,
        })
    }
}

impl AnalyticsConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let tracking_endpoint = get_optional_env("TRACKING_ENDPOINT")
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_url("TRACKING_ENDPOINT", &value))
            .transpose()?;
        let queue_capacity = match get_optional_env("TRACKING_QUEUE_CAPACITY") {
            Some(value) => parse_queue_capacity(&value)?,
            None => defaults.queue_capacity,
        };

        Ok(Self {
            tracking_endpoint,
            queue_capacity,
            click_id_param: get_optional_env("CLICK_ID_PARAM").unwrap_or(defaults.click_id_param),
            click_id_source: get_optional_env("CLICK_ID_SOURCE")
                .unwrap_or(defaults.click_id_source),
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
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse `VARIANT_PAGE_SIZE`, which Shopify bounds to `1..=250`.
fn parse_variant_page_size(value: &str) -> Result<u32, ConfigError> {
    let size = value.trim().parse::<u32>().map_err(|e| {
        ConfigError::InvalidEnvVar("VARIANT_PAGE_SIZE".to_string(), e.to_string())
    })?;
    if !(1..=MAX_VARIANT_PAGE_SIZE).contains(&size) {
        return Err(ConfigError::InvalidEnvVar(
            "VARIANT_PAGE_SIZE".to_string(),
            format!("must be between 1 and {MAX_VARIANT_PAGE_SIZE} (got {size})"),
        ));
    }
    Ok(size)
}

fn parse_queue_capacity(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            "TRACKING_QUEUE_CAPACITY".to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(capacity) => Ok(capacity),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "TRACKING_QUEUE_CAPACITY".to_string(),
            e.to_string(),
        )),
    }
}

fn parse_max_sessions(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidEnvVar(
            "SESSION_MAX_ENTRIES".to_string(),
            "must be greater than zero".to_string(),
        )),
        Ok(max) => Ok(max),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "SESSION_MAX_ENTRIES".to_string(),
            e.to_string(),
        )),
    }
}

fn parse_sample_rate(key: &str, default: f32) -> Result<f32, ConfigError> {
    let Some(value) = get_optional_env(key) else {
        return Ok(default);
    };
    let rate = value
        .trim()
        .parse::<f32>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !(0.0..=1.0).contains(&rate) {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ));
    }
    Ok(rate)
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real access tokens are random hex/base62
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the token issued by Shopify."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn shopify_config() -> ShopifyStorefrontConfig {
        ShopifyStorefrontConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2026-01".to_string(),
            storefront_private_token: SecretString::from("super_secret_private_token"),
            endpoint_override: None,
            variant_page_size: 250,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_high() {
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("3f9a1c07be2d48e6a5c4910fd7b28e3c", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_variant_page_size_bounds() {
        assert_eq!(parse_variant_page_size("250").unwrap(), 250);
        assert_eq!(parse_variant_page_size(" 1 ").unwrap(), 1);
        assert!(parse_variant_page_size("0").is_err());
        assert!(parse_variant_page_size("251").is_err());
        assert!(parse_variant_page_size("many").is_err());
    }

    #[test]
    fn test_queue_capacity_rejects_zero() {
        assert_eq!(parse_queue_capacity("64").unwrap(), 64);
        assert!(parse_queue_capacity("0").is_err());
        assert!(parse_queue_capacity("-1").is_err());
    }

    #[test]
    fn test_max_sessions_rejects_zero() {
        assert_eq!(parse_max_sessions(" 5000 ").unwrap(), 5000);
        assert!(parse_max_sessions("0").is_err());
        assert!(parse_max_sessions("lots").is_err());
    }

    #[test]
    fn test_endpoint_derived_from_store() {
        let config = shopify_config();
        assert_eq!(
            config.endpoint(),
            "https://test.myshopify.com/api/2026-01/graphql.json"
        );
    }

    #[test]
    fn test_endpoint_override() {
        let config = ShopifyStorefrontConfig {
            endpoint_override: Some(Url::parse("http://127.0.0.1:9000/graphql").unwrap()),
            ..shopify_config()
        };
        assert_eq!(config.endpoint(), "http://127.0.0.1:9000/graphql");
    }

    #[test]
    fn test_socket_addr_and_secure_cookies() {
        let config = StorefrontConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: Url::parse("https://shop.example.test").unwrap(),
            shopify: shopify_config(),
            default_locale: Locale::new("en", "us"),
            analytics: AnalyticsConfig::default(),
            incentive_offers: IncentiveOffers::default(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert!(config.secure_cookies());
    }

    #[test]
    fn test_analytics_defaults() {
        let analytics = AnalyticsConfig::default();
        assert!(analytics.tracking_endpoint.is_none());
        assert_eq!(analytics.queue_capacity, 256);
        assert_eq!(analytics.click_id_param, "ttclid");
        assert_eq!(analytics.click_id_source, "tiktok");
    }

    #[test]
    fn test_shopify_config_debug_redacts_secrets() {
        let debug_output = format!("{:?}", shopify_config());

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_private_token"));
    }
}
