//! Client configuration

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::{Result, SpineError};

/// Production API endpoint
pub const DEFAULT_BASE_URL: &str = "https://ai-spine-api.up.railway.app";
/// Per-request timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Retry budget handed to the transport when none is configured
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Prefix every well-formed API key carries
pub const API_KEY_PREFIX: &str = "sk_";

/// Configuration for the client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API key sent as a bearer token
    pub api_key: Option<SecretString>,
    /// Base URL of the service (e.g. "https://ai-spine-api.up.railway.app")
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Maximum number of retries the transport may attempt
    pub max_retries: u32,
    /// Log every request and response at `info` level
    pub debug: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            debug: false,
        }
    }
}

impl ClientConfig {
    /// Create a config with the given API key and defaults for everything else
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key: String = api_key.into();
        Self {
            api_key: Some(SecretString::new(api_key.into())),
            ..Self::default()
        }
    }

    /// Build a config from `AI_SPINE_*` environment variables
    ///
    /// Reads `AI_SPINE_API_KEY`, `AI_SPINE_BASE_URL`, `AI_SPINE_TIMEOUT_SECONDS`,
    /// `AI_SPINE_MAX_RETRIES` and `AI_SPINE_DEBUG`. Missing or unparsable
    /// values keep their defaults.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            api_key: var("AI_SPINE_API_KEY").map(|k| SecretString::new(k.into())),
            base_url: var("AI_SPINE_BASE_URL").unwrap_or(defaults.base_url),
            timeout: var("AI_SPINE_TIMEOUT_SECONDS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: var("AI_SPINE_MAX_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_retries),
            debug: var("AI_SPINE_DEBUG")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.debug),
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the transport retry budget
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enable or disable request logging at `info` level
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// Non-fatal finding recorded while constructing a client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advisory {
    /// The API key does not start with [`API_KEY_PREFIX`]
    ApiKeyFormat,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::ApiKeyFormat => write!(f, "API key should start with '{API_KEY_PREFIX}'"),
        }
    }
}

/// Reject a missing or blank key, and report format problems as advisories
pub(crate) fn validate_api_key(api_key: Option<&SecretString>) -> Result<Vec<Advisory>> {
    let key = api_key
        .map(|k| k.expose_secret().trim())
        .filter(|k| !k.is_empty())
        .ok_or_else(|| SpineError::Configuration("API key is required".to_string()))?;

    if key.starts_with(API_KEY_PREFIX) {
        Ok(Vec::new())
    } else {
        Ok(vec![Advisory::ApiKeyFormat])
    }
}

/// Strip one trailing slash and check the URL is usable
pub(crate) fn normalize_base_url(raw: &str) -> Result<(String, Url)> {
    let trimmed = raw.trim();
    let normalized = trimmed.strip_suffix('/').unwrap_or(trimmed).to_string();

    let url = Url::parse(&normalized)
        .map_err(|e| SpineError::Configuration(format!("Invalid base URL '{normalized}': {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(SpineError::Configuration(format!(
                "Unsupported base URL scheme: {other}"
            )))
        }
    }
    if url.cannot_be_a_base() {
        return Err(SpineError::Configuration(format!(
            "Base URL cannot carry a path: {normalized}"
        )));
    }

    Ok((normalized, url))
}
