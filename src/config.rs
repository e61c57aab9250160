//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_DOWNLOAD_DIR: &str = ".";
pub const DEFAULT_TELEMETRY_INTERVAL_SECS: u64 = 5;
const MIN_TELEMETRY_INTERVAL_SECS: u64 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub download_dir: PathBuf,
    pub telemetry_interval: Duration,
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CYBERSHIELD_BASE_URL`: default `http://127.0.0.1:5000`
    /// - `CYBERSHIELD_DOWNLOAD_DIR`: default `.`
    /// - `CYBERSHIELD_TELEMETRY_INTERVAL_SECS`: default 5, minimum 1
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is not an
    /// absolute http(s) URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an explicit variable lookup.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            lookup("CYBERSHIELD_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;
        let download_dir = lookup("CYBERSHIELD_DOWNLOAD_DIR")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR), PathBuf::from);
        let secs = env_parse_u64(&lookup, "CYBERSHIELD_TELEMETRY_INTERVAL_SECS", DEFAULT_TELEMETRY_INTERVAL_SECS)
            .max(MIN_TELEMETRY_INTERVAL_SECS);

        Ok(Self { base_url, download_dir, telemetry_interval: Duration::from_secs(secs) })
    }

    /// Replace the base URL, validating it the same way as the environment.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    #[must_use]
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            telemetry_interval: Duration::from_secs(DEFAULT_TELEMETRY_INTERVAL_SECS),
        }
    }
}

fn env_parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

/// Accept absolute `http`/`https` URLs and drop trailing slashes.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] for anything else.
pub fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: trimmed.to_owned(), reason };
    let url = reqwest::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(invalid(format!("unsupported scheme {other:?}"))),
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(trimmed.trim_end_matches('/').to_owned())
}
