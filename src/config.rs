//! Client configuration parsed from environment variables.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const CREDENTIALS_DIR: &str = ".kulturkampf";
pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Errors produced while building a [`ClientConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// `KK_API_URL` is not an absolute `http`/`https` URL.
    #[error("invalid KK_API_URL '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend origin without the `/api` suffix, no trailing slash.
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub credentials_path: PathBuf,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `KK_API_URL`: backend origin, default `http://localhost:8000`
    /// - `KK_REQUEST_TIMEOUT_SECS`: per-call timeout, default 10
    /// - `KK_CREDENTIALS_FILE`: token file, default `$HOME/.kulturkampf/credentials.json`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when `KK_API_URL` does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. `from_env` delegates here.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when the API URL does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = normalize_api_url(lookup("KK_API_URL").as_deref().unwrap_or(DEFAULT_API_URL))?;
        let request_timeout_secs = lookup("KK_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let credentials_path = lookup("KK_CREDENTIALS_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| default_credentials_path(lookup("HOME")), PathBuf::from);

        Ok(Self { api_url, request_timeout_secs, credentials_path })
    }

    /// Replace the API URL, applying the same validation as `from_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidApiUrl`] when `url` does not parse.
    pub fn with_api_url(mut self, url: &str) -> Result<Self, ConfigError> {
        self.api_url = normalize_api_url(url)?;
        Ok(self)
    }

    /// REST root every endpoint path is joined onto.
    #[must_use]
    pub fn api_base(&self) -> String {
        format!("{}/api", self.api_url)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            credentials_path: default_credentials_path(None),
        }
    }
}

fn normalize_api_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidApiUrl { url: raw.to_owned(), reason: e.to_string() })?;
    match parsed.scheme() {
        "http" | "https" => Ok(trimmed.to_owned()),
        other => Err(ConfigError::InvalidApiUrl {
            url: raw.to_owned(),
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn default_credentials_path(home: Option<String>) -> PathBuf {
    let root = home.filter(|h| !h.is_empty()).map_or_else(|| PathBuf::from("."), PathBuf::from);
    root.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE_NAME)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
