//! Client session: configuration plus the lifecycle of the HTTP transport.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::header::{self, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{self, Advisory, ClientConfig};
use crate::error::{Result, SpineError};

const USER_AGENT: &str = concat!("aispine-rust/", env!("CARGO_PKG_VERSION"));

/// A session against the AI Spine API
///
/// Cheap to clone; clones share the configuration and the transport. The
/// transport is released by [`Client::close`] or when the last clone drops,
/// and is re-acquired on the next request.
///
/// # Example
///
/// ```no_run
/// use aispine_client::{Client, ClientConfig};
/// use serde_json::json;
///
/// # async fn example() -> aispine_client::Result<()> {
/// let client = Client::new(ClientConfig::new("sk_live_key"))?;
/// let started = client.execute_flow("credit_analysis", json!({"amount": 5000}), None).await?;
/// let done = client.wait_for_execution(&started.execution_id, Default::default()).await?;
/// println!("{:?}", done.output_data);
/// client.close();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: ClientConfig,
    base_url: Url,
    headers: HeaderMap,
    advisories: Vec<Advisory>,
    transport: RwLock<Option<reqwest::Client>>,
}

impl Client {
    /// Create a new client
    ///
    /// Fails with [`SpineError::Configuration`] when the API key is missing or
    /// blank, or the base URL is unusable. A key without the `sk_` prefix is
    /// accepted; it is logged and recorded in [`Client::advisories`].
    pub fn new(config: ClientConfig) -> Result<Self> {
        let advisories = config::validate_api_key(config.api_key.as_ref())?;
        for advisory in &advisories {
            warn!("{}", advisory);
        }

        let (normalized, base_url) = config::normalize_base_url(&config.base_url)?;
        let config = ClientConfig {
            base_url: normalized,
            ..config
        };

        let api_key = config
            .api_key
            .as_ref()
            .ok_or_else(|| SpineError::Configuration("API key is required".to_string()))?;
        let headers = build_headers(api_key)?;
        let transport = build_transport(&config, &headers)?;

        info!(
            "Creating AI Spine client for host: {}",
            base_url.host_str().unwrap_or("unknown")
        );

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                base_url,
                headers,
                advisories,
                transport: RwLock::new(Some(transport)),
            }),
        })
    }

    /// Create a client from `AI_SPINE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// The configuration, with the base URL normalized
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The normalized base URL (no trailing slash)
    pub fn base_url(&self) -> &str {
        &self.inner.config.base_url
    }

    /// The per-request timeout
    pub fn timeout(&self) -> Duration {
        self.inner.config.timeout
    }

    /// Whether request logging is raised to `info`
    pub fn debug(&self) -> bool {
        self.inner.config.debug
    }

    /// Headers attached to every request, `Authorization` included
    pub fn default_headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// Non-fatal findings from construction
    pub fn advisories(&self) -> &[Advisory] {
        &self.inner.advisories
    }

    /// Acquire the transport if it is not held already
    pub fn open(&self) -> Result<()> {
        self.http().map(|_| ())
    }

    /// Release the transport
    ///
    /// Requests already in flight finish on their own handle. Calling this on
    /// a closed client is a no-op.
    pub fn close(&self) {
        if self.inner.transport.write().take().is_some() {
            debug!("AI Spine transport closed");
        }
    }

    /// Whether the transport is currently held
    pub fn is_open(&self) -> bool {
        self.inner.transport.read().is_some()
    }

    pub(crate) fn parsed_base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// The live transport, reopening it after a close
    pub(crate) fn http(&self) -> Result<reqwest::Client> {
        if let Some(http) = self.inner.transport.read().as_ref() {
            return Ok(http.clone());
        }

        let mut slot = self.inner.transport.write();
        match slot.as_ref() {
            Some(http) => Ok(http.clone()),
            None => {
                let http = build_transport(&self.inner.config, &self.inner.headers)?;
                debug!("AI Spine transport opened");
                *slot = Some(http.clone());
                Ok(http)
            }
        }
    }
}

/// Reject an empty or whitespace-only identifier before any request is made
pub(crate) fn require(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(SpineError::validation(message));
    }
    Ok(())
}

/// Build request headers
fn build_headers(api_key: &SecretString) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret().trim()))
        .map_err(|_| {
            SpineError::Configuration("API key contains illegal characters".to_string())
        })?;
    auth.set_sensitive(true);
    headers.insert(header::AUTHORIZATION, auth);

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

    Ok(headers)
}

fn build_transport(config: &ClientConfig, headers: &HeaderMap) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(USER_AGENT)
        .default_headers(headers.clone())
        .build()
        .map_err(|e| SpineError::Configuration(format!("Failed to build HTTP client: {e}")))
}
