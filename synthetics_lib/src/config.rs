//! Client configuration: API key, base URL, and HTTP settings.

use crate::error::Error;
use std::time::Duration;
use url::Url;

/// Production endpoint of the Synthetics REST API.
pub const BASE_URL: &str = "https://synthetics.newrelic.com/synthetics/api/v3";

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "NEWRELIC_API_KEY";

/// Environment variable overriding [`BASE_URL`] (e.g. for staging or a mock server).
pub const BASE_URL_ENV: &str = "NEWRELIC_SYNTHETICS_API_URL";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings a [`crate::Client`] is built from. Immutable once the client exists.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    /// Empty means [`BASE_URL`].
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: BASE_URL.to_string(),
            user_agent: format!("new-relic-synthetics/{}", crate::VERSION),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    /// Defaults overlaid with `NEWRELIC_API_KEY` and `NEWRELIC_SYNTHETICS_API_URL`.
    ///
    /// Only plain environment variables are read here; see [`crate::get_api_key`]
    /// for the secret-manager fallbacks.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`] but reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(key) = lookup(API_KEY_ENV) {
            config.api_key = key.trim().to_string();
        }
        if let Some(url) = lookup(BASE_URL_ENV) {
            // Set-but-empty keeps the default, same as unset.
            let url = url.trim();
            if !url.is_empty() {
                config.base_url = url.to_string();
            }
        }
        config
    }

    /// Base URL without trailing slash, ready to have resource paths appended.
    pub fn resolved_base_url(&self) -> Result<String, Error> {
        let raw = self.base_url.trim();
        let raw = if raw.is_empty() { BASE_URL } else { raw };
        let parsed =
            Url::parse(raw).map_err(|e| Error::Config(format!("invalid base URL {:?}: {}", raw, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "base URL must be http or https, got {:?}",
                raw
            )));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::Config(format!(
                "base URL must not carry a query or fragment: {:?}",
                raw
            )));
        }
        Ok(raw.trim_end_matches('/').to_string())
    }
}
