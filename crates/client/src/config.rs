//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Project URL of the backend (e.g., `https://abc.supabase.co`)
//! - `BACKEND_ANON_KEY` - Public anon API key sent with every request
//! - `SHIPPING_API_KEY` - Carrier API key for city/department lookups
//!
//! ## Optional
//! - `PRODUCT_IMAGES_BUCKET` - Storage bucket holding product images (default: products)
//! - `SIGNED_URL_EXPIRY_SECS` - Lifetime of signed image URLs (default: 3600)
//! - `SEARCH_RESULT_LIMIT` - Maximum rows returned by product search (default: 20)
//! - `SEARCH_DEBOUNCE_MS` - Debounce window for search-as-you-type (default: 500)
//! - `SHIPPING_API_URL` - Carrier JSON endpoint (default: `https://api.novaposhta.ua/v2.0/json/`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

const DEFAULT_SHIPPING_API_URL: &str = "https://api.novaposhta.ua/v2.0/json/";

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
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend connection settings
    pub backend: BackendConfig,
    /// Shipping carrier settings
    pub shipping: ShippingConfig,
    /// Catalog search and image settings
    pub catalog: CatalogConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend-as-a-service connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL; REST, storage and auth live under it
    pub url: Url,
    /// Public anon API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

/// Shipping carrier API settings.
#[derive(Clone)]
pub struct ShippingConfig {
    /// JSON endpoint of the carrier API
    pub api_url: Url,
    /// Carrier API key
    pub api_key: SecretString,
}

impl std::fmt::Debug for ShippingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShippingConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Catalog behaviour knobs.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Storage bucket holding product and category images
    pub images_bucket: String,
    /// Lifetime of a signed image URL
    pub signed_url_expiry: Duration,
    /// Maximum number of products returned by a search
    pub search_limit: usize,
    /// Quiet period before a typed query is sent
    pub search_debounce: Duration,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            images_bucket: "products".to_string(),
            signed_url_expiry: Duration::from_secs(3600),
            search_limit: 20,
            search_debounce: Duration::from_millis(500),
        }
    }
}

impl ClientConfig {
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

        let backend = BackendConfig {
            url: parse_url("BACKEND_URL", &get_required_env("BACKEND_URL")?)?,
            anon_key: get_validated_secret("BACKEND_ANON_KEY", true)?,
        };

        let shipping = ShippingConfig {
            api_url: parse_url(
                "SHIPPING_API_URL",
                &get_env_or_default("SHIPPING_API_URL", DEFAULT_SHIPPING_API_URL),
            )?,
            // Carrier keys are 32 hex chars; hex caps entropy at 4 bits/char
            api_key: get_validated_secret("SHIPPING_API_KEY", false)?,
        };

        let defaults = CatalogConfig::default();
        let catalog = CatalogConfig {
            images_bucket: get_env_or_default("PRODUCT_IMAGES_BUCKET", &defaults.images_bucket),
            signed_url_expiry: Duration::from_secs(require_nonzero(
                "SIGNED_URL_EXPIRY_SECS",
                parse_env_or("SIGNED_URL_EXPIRY_SECS", defaults.signed_url_expiry.as_secs())?,
            )?),
            search_limit: require_nonzero(
                "SEARCH_RESULT_LIMIT",
                parse_env_or("SEARCH_RESULT_LIMIT", defaults.search_limit)?,
            )?,
            search_debounce: Duration::from_millis(parse_env_or(
                "SEARCH_DEBOUNCE_MS",
                u64::try_from(defaults.search_debounce.as_millis()).unwrap_or(u64::MAX),
            )?),
        };

        Ok(Self {
            backend,
            shipping,
            catalog,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Build a configuration pointing at explicit endpoints.
    ///
    /// Used by tests and tools that talk to a local or mocked backend.
    #[must_use]
    pub fn with_endpoints(
        backend_url: Url,
        anon_key: &str,
        shipping_url: Url,
        shipping_key: &str,
    ) -> Self {
        Self {
            backend: BackendConfig {
                url: backend_url,
                anon_key: SecretString::from(anon_key.to_string()),
            },
            shipping: ShippingConfig {
                api_url: shipping_url,
                api_key: SecretString::from(shipping_key.to_string()),
            },
            catalog: CatalogConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
        }
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
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

/// Reject a zero count or duration.
fn require_nonzero<T>(key: &str, value: T) -> Result<T, ConfigError>
where
    T: PartialEq + Default,
{
    if value == T::default() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Parse a URL-valued variable.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    Ok(url)
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and, optionally, has enough entropy.
fn validate_secret_strength(
    secret: &str,
    var_name: &str,
    check_entropy: bool,
) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if check_entropy {
        let entropy = shannon_entropy(secret);
        if entropy < MIN_ENTROPY_BITS_PER_CHAR {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!(
                    "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
                ),
            ));
        }
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str, check_entropy: bool) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key, check_entropy)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9") > 3.3);
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let err = validate_secret_strength("your-anon-key", "BACKEND_ANON_KEY", true).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("CHANGEME", "SHIPPING_API_KEY", false).is_err());
    }

    #[test]
    fn test_low_entropy_only_checked_when_requested() {
        let key = "abababababababababababababababab";
        assert!(validate_secret_strength(key, "BACKEND_ANON_KEY", true).is_err());
        assert!(validate_secret_strength(key, "SHIPPING_API_KEY", false).is_ok());
    }

    #[test]
    fn test_parse_url_rejects_non_http() {
        assert!(parse_url("BACKEND_URL", "https://abc.supabase.co").is_ok());
        assert!(matches!(
            parse_url("BACKEND_URL", "ftp://abc.supabase.co"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_url("BACKEND_URL", "not a url").is_err());
    }

    #[test]
    fn test_zero_expiry_and_limit_rejected() {
        assert!(matches!(
            require_nonzero("SIGNED_URL_EXPIRY_SECS", 0_u64),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "SIGNED_URL_EXPIRY_SECS"
        ));
        assert!(require_nonzero("SEARCH_RESULT_LIMIT", 0_usize).is_err());
        assert_eq!(require_nonzero("SEARCH_RESULT_LIMIT", 20_usize).unwrap(), 20);
    }

    #[test]
    fn test_catalog_defaults() {
        let catalog = CatalogConfig::default();
        assert_eq!(catalog.images_bucket, "products");
        assert_eq!(catalog.signed_url_expiry, Duration::from_secs(3600));
        assert_eq!(catalog.search_limit, 20);
        assert_eq!(catalog.search_debounce, Duration::from_millis(500));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = ClientConfig::with_endpoints(
            Url::parse("https://abc.supabase.co").unwrap(),
            "super_secret_anon_key",
            Url::parse(DEFAULT_SHIPPING_API_URL).unwrap(),
            "super_secret_carrier_key",
        );
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("abc.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
        assert!(!debug_output.contains("super_secret_carrier_key"));
    }
}
