//! Session configuration
//!
//! Defines the backend location, polling cadence, HTTP timeout and the
//! presenter catalog used by the session controller.

use lipsync_core::domain::presenter::PresenterCatalog;
use std::time::Duration;

use crate::error::ConfigError;

/// Backend used when `LIPSYNC_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Session configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Backend base URL (e.g., "http://localhost:8000")
    pub api_url: String,

    /// How often to poll the status of an async generation
    pub poll_interval: Duration,

    /// Maximum time a single HTTP request may take
    pub request_timeout: Duration,

    /// Presenter ids requests may use
    pub presenters: PresenterCatalog,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            poll_interval: Duration::from_millis(5000),
            request_timeout: Duration::from_secs(30),
            presenters: PresenterCatalog::default(),
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognized environment variables (all optional):
    /// - LIPSYNC_API_URL (default: http://localhost:8000)
    /// - LIPSYNC_POLL_INTERVAL_MS (default: 5000)
    /// - LIPSYNC_REQUEST_TIMEOUT (seconds, default: 30)
    /// - LIPSYNC_PRESENTERS (comma-separated ids, default: built-in catalog)
    ///
    /// Unparsable values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup("LIPSYNC_API_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let mut config = Self::new(api_url);

        if let Some(interval) = lookup("LIPSYNC_POLL_INTERVAL_MS")
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            config.poll_interval = Duration::from_millis(interval);
        }

        if let Some(timeout) = lookup("LIPSYNC_REQUEST_TIMEOUT")
            .and_then(|s| s.trim().parse::<u64>().ok())
        {
            config.request_timeout = Duration::from_secs(timeout);
        }

        if let Some(presenters) =
            lookup("LIPSYNC_PRESENTERS").and_then(|list| PresenterCatalog::parse_list(&list))
        {
            config.presenters = presenters;
        }

        config
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.is_empty() {
            return Err(ConfigError::EmptyApiUrl);
        }

        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl);
        }

        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroDuration("poll_interval"));
        }

        if self.request_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("request_timeout"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
