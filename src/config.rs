//! Server configuration module
//! Loads the immutable settings handed to the token codec and the HTTP layer

use crate::constants::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TOKEN_TTL_SECS, MIN_SECRET_LENGTH};
use crate::error::{ExpenseAuthError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// Token signing parameters, constructed once at startup and read-only afterwards
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key used to sign and verify tokens
    jwt_secret: String,
    /// Validity window of an issued token
    pub token_ttl: Duration,
    /// Optional `iss` claim embedded in and required on every token
    pub issuer: Option<String>,
}

// Keeps the signing key out of debug output
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("issuer", &self.issuer)
            .finish()
    }
}

impl AuthConfig {
    /// Build a config after checking the secret against the same rules as `from_env`
    pub fn new(jwt_secret: impl Into<String>, token_ttl: Duration) -> Result<Self> {
        let jwt_secret = jwt_secret.into();
        validate_secret(&jwt_secret)?;

        if token_ttl.is_zero() {
            return Err(ExpenseAuthError::ConfigError(
                "Token TTL must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            jwt_secret,
            token_ttl,
            issuer: None,
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    /// Create a test configuration - DANGEROUS: Only for testing!
    #[cfg(test)]
    pub fn for_testing() -> Self {
        Self {
            jwt_secret: "unit-tests-only-signing-key-never-deploy-9f8e7d".to_string(),
            token_ttl: Duration::from_secs(3600),
            issuer: None,
        }
    }
}

/// Server configuration parameters
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub auth: AuthConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let host = env::var("EXPENSE_AUTH_HOST").unwrap_or(DEFAULT_HOST.to_string());
        let port = env::var("EXPENSE_AUTH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let ttl_secs = env::var("EXPENSE_AUTH_TOKEN_TTL_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

        let jwt_secret = env::var("EXPENSE_AUTH_JWT_SECRET")
            .or_else(|_| env::var("JWT_SECRET"))
            .map_err(|_| {
                ExpenseAuthError::ConfigError(
                    "JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;

        let mut auth = AuthConfig::new(jwt_secret, Duration::from_secs(ttl_secs))?;
        if let Ok(issuer) = env::var("EXPENSE_AUTH_ISSUER") {
            if !issuer.trim().is_empty() {
                auth = auth.with_issuer(issuer);
            }
        }

        Ok(Self { host, port, auth })
    }
}

/// Validate that a signing secret meets security requirements
fn validate_secret(secret: &str) -> Result<()> {
    if secret.len() < MIN_SECRET_LENGTH {
        return Err(ExpenseAuthError::ConfigError(format!(
            "JWT secret must be at least {} characters long",
            MIN_SECRET_LENGTH
        )));
    }

    // Check for insecure default or example values
    let insecure_patterns = [
        "your-secret-key",
        "change-this",
        "changeme",
        "default",
        "secret",
        "password",
        "12345",
    ];

    let lowered = secret.to_lowercase();
    for pattern in &insecure_patterns {
        if lowered.contains(pattern) {
            return Err(ExpenseAuthError::ConfigError(format!(
                "JWT secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                pattern
            )));
        }
    }

    // Ensure some complexity
    if secret.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ExpenseAuthError::ConfigError(
            "JWT secret should contain mixed characters (letters, numbers, symbols) for security"
                .to_string(),
        ));
    }

    Ok(())
}
