//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ATELIER_DATABASE_URL` - `PostgreSQL` connection string
//! - `ATELIER_BASE_URL` - Public URL for the API
//! - `RAZORPAY_KEY_ID` - Razorpay API key id
//! - `RAZORPAY_KEY_SECRET` - Razorpay API key secret
//! - `CLOUDINARY_CLOUD_NAME` - Cloudinary cloud name
//! - `CLOUDINARY_API_KEY` - Cloudinary API key
//! - `CLOUDINARY_API_SECRET` - Cloudinary API secret
//!
//! ## Optional
//! - `ATELIER_HOST` - Bind address (default: 127.0.0.1)
//! - `ATELIER_PORT` - Listen port (default: 4000)
//! - `ATELIER_CORS_ORIGINS` - Comma-separated allowed origins
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// Server application configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the API
    pub base_url: String,
    /// Allowed CORS origins for the React storefront/admin apps
    pub cors_origins: Vec<String>,
    /// Razorpay payment gateway configuration
    pub razorpay: RazorpayConfig,
    /// Cloudinary media upload configuration
    pub cloudinary: CloudinaryConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Razorpay gateway configuration.
///
/// Implements `Debug` manually to redact the key secret.
#[derive(Clone)]
pub struct RazorpayConfig {
    /// API key id (also handed to the hosted checkout widget)
    pub key_id: String,
    /// API key secret (server-side only)
    pub key_secret: SecretString,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .finish()
    }
}

/// Cloudinary upload configuration.
///
/// Implements `Debug` manually to redact the API secret.
#[derive(Clone)]
pub struct CloudinaryConfig {
    /// Cloud name (part of the upload URL)
    pub cloud_name: String,
    /// API key
    pub api_key: String,
    /// API secret used to sign upload requests
    pub api_secret: SecretString,
}

impl std::fmt::Debug for CloudinaryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudinaryConfig")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .finish()
    }
}

impl ServerConfig {
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

        let database_url = get_database_url("ATELIER_DATABASE_URL")?;
        let host = get_env_or_default("ATELIER_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ATELIER_PORT", "4000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ATELIER_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ATELIER_BASE_URL")?;
        let cors_origins = get_optional_env("ATELIER_CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let razorpay = RazorpayConfig::from_env()?;
        let cloudinary = CloudinaryConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            cors_origins,
            razorpay,
            cloudinary,
            sentry_dsn,
            sentry_environment,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl RazorpayConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            key_id: get_required_env("RAZORPAY_KEY_ID")?,
            key_secret: get_validated_secret("RAZORPAY_KEY_SECRET")?,
        })
    }
}

impl CloudinaryConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            cloud_name: get_required_env("CLOUDINARY_CLOUD_NAME")?,
            api_key: get_required_env("CLOUDINARY_API_KEY")?,
            api_secret: get_validated_secret("CLOUDINARY_API_SECRET")?,
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

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real secrets like API keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 4000,
            base_url: "http://localhost:4000".to_string(),
            cors_origins: vec![],
            razorpay: RazorpayConfig {
                key_id: "rzp_test_key".to_string(),
                key_secret: SecretString::from("k3y"),
            },
            cloudinary: CloudinaryConfig {
                cloud_name: "atelier".to_string(),
                api_key: "1234".to_string(),
                api_secret: SecretString::from("s3cr3t"),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 4000);
    }

    #[test]
    fn test_configs_debug_redacts_secrets() {
        let razorpay = RazorpayConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: SecretString::from("super_private_key"),
        };
        let cloudinary = CloudinaryConfig {
            cloud_name: "atelier".to_string(),
            api_key: "1234".to_string(),
            api_secret: SecretString::from("super_private_cloudinary"),
        };

        let debug_output = format!("{razorpay:?} {cloudinary:?}");

        assert!(debug_output.contains("rzp_test_key"));
        assert!(debug_output.contains("atelier"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_private_key"));
        assert!(!debug_output.contains("super_private_cloudinary"));
    }
}
