//! Client configuration.

use std::fmt;

use serde::Deserialize;

use crate::constants::API_BASE;
use crate::error::ConfigError;

pub const ENV_CLIENT_ID: &str = "DYNASTIC_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "DYNASTIC_CLIENT_SECRET";
pub const ENV_API_BASE: &str = "DYNASTIC_API_BASE";

/// Credentials and endpoint for an [`AccountsApi`](crate::AccountsApi).
///
/// Deserializable so it can sit inside a host application's own config file.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_api_base")]
    pub api_base_url: String,
    pub client_id: String,
    pub client_secret: String,
}

fn default_api_base() -> String {
    API_BASE.to_string()
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            api_base_url: default_api_base(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Read `DYNASTIC_CLIENT_ID`, `DYNASTIC_CLIENT_SECRET` and the optional
    /// `DYNASTIC_API_BASE` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_id = lookup(ENV_CLIENT_ID).ok_or(ConfigError::MissingVar(ENV_CLIENT_ID))?;
        let client_secret =
            lookup(ENV_CLIENT_SECRET).ok_or(ConfigError::MissingVar(ENV_CLIENT_SECRET))?;
        let api_base_url = lookup(ENV_API_BASE).unwrap_or_else(default_api_base);
        Ok(Self {
            api_base_url,
            client_id,
            client_secret,
        })
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base_url", &self.api_base_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
