//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `WARUNG_JWT_SECRET` - Token signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `WARUNG_DATABASE_PATH` - SQLite database file (default: warung.db)
//! - `WARUNG_HOST` - Bind address (default: 127.0.0.1)
//! - `WARUNG_PORT` - Listen port (default: 5000)
//! - `WARUNG_UPLOAD_DIR` - Product image directory (default: uploads)
//! - `WARUNG_TOKEN_TTL_SECS` - Token lifetime in seconds (default: 3600)
//! - `WARUNG_ADMIN_USERNAME` - Bootstrap admin username (default: admin)
//! - `WARUNG_ADMIN_EMAIL` - Bootstrap admin email (default: admin@warung.local)
//! - `WARUNG_ADMIN_PASSWORD` - Bootstrap admin password; the admin account
//!   is only created when this is set

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const MIN_JWT_SECRET_LENGTH: usize = 32;
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

/// Warung server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// SQLite database file path
    pub database_path: PathBuf,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Token signing secret
    pub jwt_secret: SecretString,
    /// Token lifetime in seconds
    pub token_ttl_secs: i64,
    /// Directory where processed product images are stored
    pub upload_dir: PathBuf,
    /// First-run admin bootstrap settings
    pub admin_bootstrap: AdminBootstrapConfig,
}

/// First-run admin account settings.
///
/// The account is only created at startup when a password is configured and
/// no user with the configured username exists yet.
#[derive(Clone)]
pub struct AdminBootstrapConfig {
    /// Admin username (default: admin)
    pub username: String,
    /// Admin email (default: admin@warung.local)
    pub email: String,
    /// Admin password; bootstrap is skipped when unset
    pub password: Option<SecretString>,
}

impl std::fmt::Debug for AdminBootstrapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminBootstrapConfig")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
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
    /// if the JWT secret fails validation (length, placeholder detection,
    /// entropy check). There is deliberately no fallback signing secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_path =
            PathBuf::from(get_env_or_default("WARUNG_DATABASE_PATH", "warung.db"));
        let host = get_env_or_default("WARUNG_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("WARUNG_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("WARUNG_PORT", "5000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("WARUNG_PORT".to_string(), e.to_string()))?;
        let jwt_secret = get_validated_secret("WARUNG_JWT_SECRET")?;
        let token_ttl_secs = get_env_or_default("WARUNG_TOKEN_TTL_SECS", "3600")
            .parse::<i64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("WARUNG_TOKEN_TTL_SECS".to_string(), e.to_string())
            })?;
        let upload_dir = PathBuf::from(get_env_or_default("WARUNG_UPLOAD_DIR", "uploads"));

        let admin_bootstrap = AdminBootstrapConfig {
            username: get_env_or_default("WARUNG_ADMIN_USERNAME", "admin"),
            email: get_env_or_default("WARUNG_ADMIN_EMAIL", "admin@warung.local"),
            password: get_optional_env("WARUNG_ADMIN_PASSWORD").map(SecretString::from),
        };

        Ok(Self {
            database_path,
            host,
            port,
            jwt_secret,
            token_ttl_secs,
            upload_dir,
            admin_bootstrap,
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
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is long enough, not a placeholder, and has
/// sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    if secret.len() < MIN_JWT_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_JWT_SECRET_LENGTH,
                secret.len()
            ),
        ));
    }

    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Real signing secrets look random; low entropy means a human typed it
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
    fn test_validate_secret_placeholder() {
        let result = validate_secret_strength("your-api-key-here-your-api-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_too_short() {
        let result = validate_secret_strength("aB3$xY9!mK2@", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_secret_low_entropy() {
        let result = validate_secret_strength(&"ab".repeat(20), "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6w", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_path: PathBuf::from("warung.db"),
            host: "127.0.0.1".parse().unwrap(),
            port: 5000,
            jwt_secret: SecretString::from("x".repeat(32)),
            token_ttl_secs: 3600,
            upload_dir: PathBuf::from("uploads"),
            admin_bootstrap: AdminBootstrapConfig {
                username: "admin".to_string(),
                email: "admin@warung.local".to_string(),
                password: None,
            },
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 5000);
    }

    #[test]
    fn test_bootstrap_debug_redacts_password() {
        let bootstrap = AdminBootstrapConfig {
            username: "admin".to_string(),
            email: "admin@warung.local".to_string(),
            password: Some(SecretString::from("super_secret_admin_password")),
        };

        let debug_output = format!("{bootstrap:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_admin_password"));
    }
}
