//! Client configuration
//!
//! Where the API lives and where the session is kept between runs.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// API base URL used when neither the builder nor `QUILL_API_URL` names one
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";

/// Environment variable overriding the API base URL
pub const API_URL_ENV: &str = "QUILL_API_URL";

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
}

/// Client configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    session_file: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let api_base_url = std::env::var(API_URL_ENV)
            .ok()
            .and_then(|url| normalize_base_url(&url).ok())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self {
            api_base_url,
            session_file: None,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfigBuilder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Base URL every API path is appended to, without a trailing slash
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// File the session is persisted to, if any
    pub fn session_file(&self) -> Option<&Path> {
        self.session_file.as_deref()
    }

    /// Full URL for an API path such as `/posts`
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }
}

/// Builder for ClientConfig
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    api_base_url: Option<String>,
    session_file: Option<PathBuf>,
}

impl ClientConfigBuilder {
    /// Set the API base URL, e.g. `https://blog.example.com/api`
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Persist the session to this file
    pub fn session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Persist the session under the platform data directory
    pub fn default_session_file(mut self) -> Result<Self, ConfigError> {
        self.session_file = Some(default_session_path().ok_or(ConfigError::MissingValue("data directory"))?);
        Ok(self)
    }

    /// Build the configuration
    ///
    /// Falls back to `QUILL_API_URL`, then to `DEFAULT_API_URL`, when no base
    /// URL was given.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let api_base_url = match self.api_base_url {
            Some(url) => normalize_base_url(&url)?,
            None => ClientConfig::default().api_base_url,
        };
        Ok(ClientConfig {
            api_base_url,
            session_file: self.session_file,
        })
    }
}

/// `<data dir>/quill/session.json`
pub fn default_session_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("quill").join("session.json"))
}

fn normalize_base_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed).map_err(|_| ConfigError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    }
    Ok(trimmed.to_string())
}
