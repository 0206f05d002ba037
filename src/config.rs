//! Client configuration.
//!
//! The only tunable is where the backend lives. It defaults to
//! [`DEFAULT_API_URL`] and can be overridden with the `AGORA_API_URL`
//! environment variable.

use crate::error::{ForumError, Result};
use crate::forum::constants::{API_URL_ENV, DEFAULT_API_URL};
use serde::{Deserialize, Serialize};

/// Configuration for talking to the forum backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every endpoint path is appended to, without a trailing slash.
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given base URL.
    ///
    /// # Errors
    /// Returns a configuration error if the URL is blank.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        let url: String = api_base_url.into();
        let trimmed = url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(ForumError::config("API base URL cannot be empty"));
        }
        Ok(Self {
            api_base_url: trimmed.to_string(),
        })
    }

    /// Reads the configuration from the environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_URL_ENV) {
            Ok(url) => Self::new(url),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Joins an endpoint path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}
