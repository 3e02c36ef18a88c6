//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DB_HOST` - `PostgreSQL` host (falls back to `RDS_HOSTNAME`)
//! - `DB_USER` - Database user (falls back to `RDS_USERNAME`)
//! - `DB_PASSWORD` - Database password (falls back to `RDS_PASSWORD`)
//! - `DB_NAME` - Database name (falls back to `RDS_DB_NAME`)
//! - `SESSION_SECRET` - Session cookie signing key (min 64 chars, high entropy)
//!
//! ## Optional
//! - `DB_PORT` - Database port (falls back to `RDS_PORT`, default: 5432)
//! - `UPLOAD_DIR` - Root directory for uploaded images (default: static/images)
//! - `SHOPFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `SHOPFRONT_PORT` - Listen port (default: 3000)
//! - `SHOPFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

/// The signing key must be at least 64 bytes.
const MIN_SESSION_SECRET_LENGTH: usize = 64;
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
    /// Database connection settings
    pub database: DatabaseConfig,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session cookie signing secret
    pub session_secret: SecretString,
    /// Root directory for uploaded files
    pub upload_dir: PathBuf,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// `PostgreSQL` connection settings.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub database: String,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("database", &self.database)
            .finish()
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
    /// if the session secret fails validation (length, placeholder, entropy).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig::from_env()?;
        let host = get_env_or_default("SHOPFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SHOPFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = parse_port("SHOPFRONT_PORT", &get_env_or_default("SHOPFRONT_PORT", "3000"))?;
        let base_url = get_env_or_default("SHOPFRONT_BASE_URL", "http://localhost:3000");
        let session_secret = get_required_secret("SESSION_SECRET")?;
        validate_session_secret(&session_secret, "SESSION_SECRET")?;
        validate_secret_strength(session_secret.expose_secret(), "SESSION_SECRET")?;
        let upload_dir = PathBuf::from(get_env_or_default("UPLOAD_DIR", "static/images"));
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database,
            host,
            port,
            base_url,
            session_secret,
            upload_dir,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl DatabaseConfig {
    /// Load database settings, preferring `DB_*` over the `RDS_*` names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or the port is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = get_env_with_fallback("DB_PORT", "RDS_PORT")
            .map_or(Ok(5432), |raw| parse_port("DB_PORT", &raw))?;

        Ok(Self {
            host: require_with_fallback("DB_HOST", "RDS_HOSTNAME")?,
            port,
            username: require_with_fallback("DB_USER", "RDS_USERNAME")?,
            password: SecretString::from(require_with_fallback("DB_PASSWORD", "RDS_PASSWORD")?),
            database: require_with_fallback("DB_NAME", "RDS_DB_NAME")?,
        })
    }

    /// Build sqlx connection options.
    #[must_use]
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .database(&self.database)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get `primary`, or `fallback` when `primary` is unset (`RDS_*` names are
/// set by Elastic Beanstalk database attachments).
fn get_env_with_fallback(primary: &str, fallback: &str) -> Option<String> {
    std::env::var(primary)
        .or_else(|_| std::env::var(fallback))
        .ok()
}

fn require_with_fallback(primary: &str, fallback: &str) -> Result<String, ConfigError> {
    get_env_with_fallback(primary, fallback)
        .ok_or_else(|| ConfigError::MissingEnvVar(primary.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_port(key: &str, raw: &str) -> Result<u16, ConfigError> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
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
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

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

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const STRONG_SECRET: &str =
        "q7Vx2Lr9Kp4Wz8Tn1Ms6Hd3Jb5Fc0Ga7Ye2Ru9Io4Pl8Ak1Sj6Dh3Fg5Hk0Zl7Xc2Vb9Nm4Qw8Er1Ty6";

    fn sample_config(base_url: &str) -> StorefrontConfig {
        StorefrontConfig {
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                username: "shop".to_string(),
                password: SecretString::from("db-pass-value"),
                database: "shopfront".to_string(),
            },
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: base_url.to_string(),
            session_secret: SecretString::from(STRONG_SECRET),
            upload_dir: PathBuf::from("static/images"),
            sentry_dsn: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("zzzzzz") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("xyxy");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_strong_secret_passes_all_checks() {
        let secret = SecretString::from(STRONG_SECRET);
        assert!(validate_session_secret(&secret, "SESSION_SECRET").is_ok());
        assert!(validate_secret_strength(STRONG_SECRET, "SESSION_SECRET").is_ok());
    }

    #[test]
    fn test_short_secret_rejected() {
        let secret = SecretString::from("q7Vx2Lr9Kp4Wz8Tn1Ms6Hd3Jb5Fc0Ga7");
        let err = validate_session_secret(&secret, "SESSION_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_placeholder_secret_rejected() {
        let result = validate_secret_strength("changeme-changeme-changeme", "SESSION_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_low_entropy_secret_rejected() {
        let low = "ab".repeat(40);
        let result = validate_secret_strength(&low, "SESSION_SECRET");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("DB_PORT", " 5433 ").unwrap(), 5433);
        assert!(matches!(
            parse_port("DB_PORT", "not-a-port"),
            Err(ConfigError::InvalidEnvVar(_, _))
        ));
        assert!(parse_port("DB_PORT", "70000").is_err());
    }

    #[test]
    fn test_socket_addr() {
        let addr = sample_config("http://localhost:3000").socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_is_https() {
        assert!(!sample_config("http://localhost:3000").is_https());
        assert!(sample_config("https://shop.example.org").is_https());
    }

    #[test]
    fn test_database_config_debug_redacts_password() {
        let debug_output = format!("{:?}", sample_config("http://localhost").database);
        assert!(debug_output.contains("localhost"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("db-pass-value"));
    }
}
