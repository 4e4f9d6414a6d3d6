//! Command implementations.
//!
//! Every command signs in as an admin first and then talks to the backend
//! through [`AdminClient`].

pub mod ingredients;
pub mod notify;
pub mod orders;

use maoyang_admin::api::{AdminClient, ApiError};
use maoyang_admin::config::{ApiConfig, ConfigError};
use secrecy::SecretString;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    /// Input rejected before anything was sent.
    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// A signed-in admin client.
pub struct AdminSession {
    pub client: AdminClient,
    pub token: SecretString,
}

impl AdminSession {
    /// Sign in with `MAOYANG_ADMIN_PHONE` and `MAOYANG_ADMIN_PASSWORD`.
    ///
    /// # Errors
    ///
    /// Missing variables, a bad backend URL or rejected credentials.
    pub async fn from_env() -> Result<Self, CliError> {
        let config = ApiConfig::from_env()?;
        let phone = std::env::var("MAOYANG_ADMIN_PHONE")
            .map_err(|_| CliError::MissingEnvVar("MAOYANG_ADMIN_PHONE"))?;
        let password = std::env::var("MAOYANG_ADMIN_PASSWORD")
            .map(SecretString::from)
            .map_err(|_| CliError::MissingEnvVar("MAOYANG_ADMIN_PASSWORD"))?;

        Self::sign_in(&config, &phone, &password).await
    }

    /// Sign in against the backend described by `config`.
    ///
    /// # Errors
    ///
    /// A bad client configuration or rejected credentials.
    pub async fn sign_in(config: &ApiConfig, phone: &str, password: &SecretString) -> Result<Self, CliError> {
        let client = AdminClient::new(config)?;
        tracing::info!(backend = %config.base_url, "Signing in as {}", phone);
        let token = client.sign_in(phone, password).await?;

        Ok(Self { client, token })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    #![allow(clippy::unwrap_used)]

    use maoyang_admin::config::ApiConfig;
    use maoyang_integration_tests::{ADMIN_PASSWORD, ADMIN_PHONE, FakeBackend};
    use secrecy::SecretString;

    use super::AdminSession;

    pub fn api_config(backend: &FakeBackend) -> ApiConfig {
        let url = backend.url.clone();
        ApiConfig::from_lookup(&move |key: &str| (key == "MAOYANG_API_URL").then(|| url.clone())).unwrap()
    }

    /// A session signed in as the fixture admin.
    pub async fn session(backend: &FakeBackend) -> AdminSession {
        AdminSession::sign_in(&api_config(backend), ADMIN_PHONE, &SecretString::from(ADMIN_PASSWORD.to_string()))
            .await
            .unwrap()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use maoyang_integration_tests::{ADMIN_PHONE, FakeBackend};

    use super::*;

    #[tokio::test]
    async fn test_wrong_password_is_refused() {
        let backend = FakeBackend::spawn().await;
        let config = testing::api_config(&backend);

        let result = AdminSession::sign_in(&config, ADMIN_PHONE, &SecretString::from("nope".to_string())).await;
        assert!(matches!(result, Err(CliError::Api(_))));
    }
}
