//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MAOYANG_API_URL` - Base URL of the Maoyang REST backend
//! - `ADMIN_BASE_URL` - Public URL for the admin console
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `MAOYANG_API_TIMEOUT_SECS` - Backend request timeout (default: 10)
//! - `MAOYANG_CACHE_TTL_SECS` - Ingredient/product cache lifetime (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the admin console
    pub base_url: String,
    /// Backend connection settings
    pub api: ApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Where and how to reach the REST backend. Shared with the CLI.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl AdminConfig {
    /// Load configuration from environment variables (and `.env` if present).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(&lookup);

        Ok(Self {
            host: env.parsed_or("ADMIN_HOST", "127.0.0.1")?,
            port: env.parsed_or("ADMIN_PORT", "3001")?,
            base_url: env.required("ADMIN_BASE_URL")?,
            api: ApiConfig::from_lookup(&lookup)?,
            sentry_dsn: env.optional("SENTRY_DSN"),
            sentry_environment: env.optional("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl ApiConfig {
    /// Load the backend settings alone from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `MAOYANG_API_URL` is missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    /// Build the backend settings from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `MAOYANG_API_URL` is missing or invalid.
    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let raw = env.required("MAOYANG_API_URL")?;
        let base_url = Url::parse(&raw)
            .map_err(|e| ConfigError::InvalidEnvVar("MAOYANG_API_URL".to_string(), e.to_string()))?;

        Ok(Self {
            base_url,
            timeout: Duration::from_secs(env.parsed_or("MAOYANG_API_TIMEOUT_SECS", "10")?),
            cache_ttl: Duration::from_secs(env.parsed_or("MAOYANG_CACHE_TTL_SECS", "60")?),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    fn parsed_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(key)
            .unwrap_or_else(|| default.to_string())
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }
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
        let config = AdminConfig::from_lookup(lookup(&[
            ("MAOYANG_API_URL", "http://localhost:8080"),
            ("ADMIN_BASE_URL", "https://admin.maoyang.shop"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3001");
        assert!(config.is_secure());
        assert_eq!(config.api.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_api_only() {
        let api = ApiConfig::from_lookup(&lookup(&[
            ("MAOYANG_API_URL", "http://localhost:8080"),
            ("MAOYANG_API_TIMEOUT_SECS", "3"),
        ]))
        .unwrap();
        assert_eq!(api.timeout, Duration::from_secs(3));

        let err = ApiConfig::from_lookup(&lookup(&[("MAOYANG_API_URL", "not a url")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "MAOYANG_API_URL"));
    }

    #[test]
    fn test_missing_base_url() {
        let err = AdminConfig::from_lookup(lookup(&[("MAOYANG_API_URL", "http://localhost:8080")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(key) if key == "ADMIN_BASE_URL"));
    }
}
