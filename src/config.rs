//! Client configuration.
//!
//! The backend origin, media CDN base and default avatar live here and only
//! here; every other module receives them through a `FeedConfig`.

use std::env;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://fil-x-connect-final-backend.onrender.com/api";
pub const DEFAULT_MEDIA_BASE_URL: &str =
    "https://res.cloudinary.com/djvat4mcp/image/upload/v1741357526/";
pub const DEFAULT_AVATAR_URL: &str =
    "https://res.cloudinary.com/djvat4mcp/image/upload/v1741357526/zybt9ffewrjwhq7tyvy1.png";
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedConfig {
    /// Origin of the REST API, without a trailing slash
    pub api_base_url: String,
    /// Prefix for media and avatar references that are not absolute
    pub media_base_url: String,
    /// Avatar shown when a user has no profile picture
    pub default_avatar_url: String,
    /// Connections fetched at the same time during aggregation
    pub max_concurrency: usize,
    pub request_timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            media_base_url: DEFAULT_MEDIA_BASE_URL.to_string(),
            default_avatar_url: DEFAULT_AVATAR_URL.to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl FeedConfig {
    /// Load configuration from the environment (and a `.env` file if present).
    ///
    /// Recognised variables:
    /// - CONNECT_API_URL
    /// - CONNECT_MEDIA_BASE_URL
    /// - CONNECT_DEFAULT_AVATAR_URL
    /// - CONNECT_MAX_CONCURRENCY
    /// - CONNECT_REQUEST_TIMEOUT_SECS
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup` instead.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("CONNECT_API_URL") {
            config = config.with_api_base_url(url);
        }
        if let Some(url) = lookup("CONNECT_MEDIA_BASE_URL") {
            config.media_base_url = url;
        }
        if let Some(url) = lookup("CONNECT_DEFAULT_AVATAR_URL") {
            config.default_avatar_url = url;
        }
        if let Some(raw) = lookup("CONNECT_MAX_CONCURRENCY") {
            config.max_concurrency = raw.trim().parse().map_err(|_| {
                ConfigError::invalid("CONNECT_MAX_CONCURRENCY", &raw, "expected a positive integer")
            })?;
        }
        if let Some(raw) = lookup("CONNECT_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                ConfigError::invalid("CONNECT_REQUEST_TIMEOUT_SECS", &raw, "expected whole seconds")
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_url.starts_with("http") {
            return Err(ConfigError::invalid(
                "CONNECT_API_URL",
                &self.api_base_url,
                "expected an http(s) origin",
            ));
        }
        if self.max_concurrency == 0 {
            return Err(ConfigError::invalid(
                "CONNECT_MAX_CONCURRENCY",
                "0",
                "at least one connection must be fetched at a time",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = FeedConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, FeedConfig::default());
        assert_eq!(config.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    }

    #[test]
    fn test_overrides_and_trims_origin() {
        let config = FeedConfig::from_lookup(lookup_from(&[
            ("CONNECT_API_URL", "http://localhost:8080/api/"),
            ("CONNECT_MAX_CONCURRENCY", "3"),
            ("CONNECT_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.max_concurrency, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.media_base_url, DEFAULT_MEDIA_BASE_URL);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = FeedConfig::from_lookup(lookup_from(&[("CONNECT_MAX_CONCURRENCY", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("CONNECT_MAX_CONCURRENCY"));

        assert!(FeedConfig::from_lookup(lookup_from(&[("CONNECT_MAX_CONCURRENCY", "0")])).is_err());
        assert!(FeedConfig::from_lookup(lookup_from(&[("CONNECT_API_URL", "ftp://nope")])).is_err());
    }
}
