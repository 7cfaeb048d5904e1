//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TIENDA_TOKEN_SECRET` - Bearer token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `TIENDA_HOST` - Bind address (default: 127.0.0.1)
//! - `TIENDA_PORT` - Listen port (default: 8080)
//! - `TIENDA_TOKEN_TTL_HOURS` - Token lifetime in hours (default: 10)
//! - `TIENDA_STORE_TIMEOUT_MS` - Per-call persistence timeout (default: 2000)
//! - `TIENDA_ALLOWED_ORIGINS` - Comma-separated CORS origins (default: http://localhost:4200)
//! - `TIENDA_ADMIN_EMAIL` / `TIENDA_ADMIN_PASSWORD` - Bootstrap admin account
//!   (both or neither)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use tienda_core::Email;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
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

/// API application configuration.
///
/// Loaded once at startup and treated as immutable afterwards; shared state
/// holds it by value inside an `Arc`.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Bearer token signing secret
    pub token_secret: SecretString,
    /// Token lifetime in hours
    pub token_ttl_hours: i64,
    /// Upper bound on any single persistence call
    pub store_timeout: Duration,
    /// Origins allowed by the CORS layer
    pub allowed_origins: Vec<String>,
    /// Admin account seeded at startup if absent
    pub bootstrap_admin: Option<BootstrapAdmin>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Bootstrap admin account credentials.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    /// Login email for the seeded account
    pub email: Email,
    /// Plaintext password, hashed before it is stored
    pub password: SecretString,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the signing secret fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("TIENDA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TIENDA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TIENDA_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TIENDA_PORT".to_string(), e.to_string()))?;

        let token_secret = get_validated_secret("TIENDA_TOKEN_SECRET")?;
        validate_token_secret(&token_secret, "TIENDA_TOKEN_SECRET")?;

        let token_ttl_hours = get_env_or_default("TIENDA_TOKEN_TTL_HOURS", "10")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIENDA_TOKEN_TTL_HOURS".to_string(), e.to_string())
            })?;
        if token_ttl_hours < 1 {
            return Err(ConfigError::InvalidEnvVar(
                "TIENDA_TOKEN_TTL_HOURS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let store_timeout_ms = get_env_or_default("TIENDA_STORE_TIMEOUT_MS", "2000")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("TIENDA_STORE_TIMEOUT_MS".to_string(), e.to_string())
            })?;

        let allowed_origins =
            parse_origins(&get_env_or_default("TIENDA_ALLOWED_ORIGINS", "http://localhost:4200"));

        let bootstrap_admin = get_bootstrap_admin()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            token_secret,
            token_ttl_hours,
            store_timeout: Duration::from_millis(store_timeout_ms),
            allowed_origins,
            bootstrap_admin,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
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

/// Split a comma-separated origin list, dropping empty entries.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Read the optional bootstrap admin pair; both variables or neither.
fn get_bootstrap_admin() -> Result<Option<BootstrapAdmin>, ConfigError> {
    let email = get_optional_env("TIENDA_ADMIN_EMAIL");
    let password = get_optional_env("TIENDA_ADMIN_PASSWORD");

    match (email, password) {
        (Some(email), Some(password)) => {
            let email = Email::parse(&email).map_err(|e| {
                ConfigError::InvalidEnvVar("TIENDA_ADMIN_EMAIL".to_string(), e.to_string())
            })?;
            Ok(Some(BootstrapAdmin {
                email,
                password: SecretString::from(password),
            }))
        }
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::MissingEnvVar(
            "TIENDA_ADMIN_PASSWORD".to_string(),
        )),
        (None, Some(_)) => Err(ConfigError::MissingEnvVar("TIENDA_ADMIN_EMAIL".to_string())),
    }
}

/// Validate that the signing secret meets minimum length requirements.
fn validate_token_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
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
    fn test_validate_secret_strength_changeme() {
        let result = validate_secret_strength("changeme123", "TEST_VAR");
        assert!(result.is_err());
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
    fn test_validate_token_secret_too_short() {
        let secret = SecretString::from("short");
        let result = validate_token_secret(&secret, "TEST_TOKEN");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_token_secret_valid_length() {
        let secret = SecretString::from("a".repeat(32));
        let result = validate_token_secret(&secret, "TEST_TOKEN");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins("http://localhost:4200, https://tienda.example.net ,");
        assert_eq!(
            origins,
            vec![
                "http://localhost:4200".to_string(),
                "https://tienda.example.net".to_string()
            ]
        );
    }

    #[test]
    fn test_parse_origins_empty() {
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_socket_addr() {
        let config = ApiConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            token_secret: SecretString::from("x".repeat(32)),
            token_ttl_hours: 10,
            store_timeout: Duration::from_millis(2000),
            allowed_origins: vec!["http://localhost:4200".to_string()],
            bootstrap_admin: None,
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = ApiConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            token_secret: SecretString::from("super_secret_signing_key_material"),
            token_ttl_hours: 10,
            store_timeout: Duration::from_millis(2000),
            allowed_origins: vec![],
            bootstrap_admin: None,
            sentry_dsn: None,
        };

        let debug_output = format!("{config:?}");
        assert!(!debug_output.contains("super_secret_signing_key_material"));
    }
}
