//! Request executor shared by every endpoint method.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::client::Client;
use crate::error::{Result, SpineError};

/// Optional parts of a request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON body
    pub json: Option<Value>,
    /// Query string parameters, in order
    pub params: Vec<(String, String)>,
    /// Extra headers, layered over the session defaults
    pub headers: HeaderMap,
}

impl RequestOptions {
    /// Empty options: no body, no query, no extra headers
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a JSON body
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| SpineError::validation(format!("Request body is not valid JSON: {e}")))?;
        self.json = Some(value);
        Ok(self)
    }

    /// Append a query parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set an extra header
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

impl Client {
    /// Send one request and return the decoded JSON body
    ///
    /// `path` is a list of path segments appended to the base URL; each one
    /// is percent-encoded, so ids may contain any character. A 2xx response
    /// with an empty body yields `Value::Null`. Non-2xx responses are
    /// classified by [`SpineError::from_response`]; transport failures
    /// (including timeouts) become [`SpineError::Network`].
    pub async fn send(&self, method: Method, path: &[&str], options: RequestOptions) -> Result<Value> {
        let (_, body) = self.execute(method, path, options).await?;
        parse_body(&body)
    }

    /// Send one request and return only the 2xx status
    ///
    /// Fails exactly like [`Client::send`] on non-2xx and transport errors,
    /// but never looks at a successful body, so plain-text or malformed
    /// acknowledgements are accepted.
    pub async fn send_status(
        &self,
        method: Method,
        path: &[&str],
        options: RequestOptions,
    ) -> Result<StatusCode> {
        let (status, _) = self.execute(method, path, options).await?;
        Ok(status)
    }

    /// Send one request and decode the body into `T`
    pub async fn send_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &[&str],
        options: RequestOptions,
    ) -> Result<T> {
        let value = self.send(method, path, options).await?;
        serde_json::from_value(value).map_err(|e| SpineError::InvalidResponse(e.to_string()))
    }

    /// Perform the round trip; non-2xx responses come back as errors
    #[instrument(skip(self, options))]
    async fn execute(
        &self,
        method: Method,
        path: &[&str],
        options: RequestOptions,
    ) -> Result<(StatusCode, String)> {
        let url = join_path(self.parsed_base_url(), path)?;
        let http = self.http()?;

        if self.debug() {
            info!(%url, max_retries = self.config().max_retries, "Sending request");
        } else {
            debug!(%url, "Sending request");
        }

        let mut request = http.request(method, url).headers(options.headers);
        if !options.params.is_empty() {
            request = request.query(&options.params);
        }
        if let Some(body) = &options.json {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "Request failed before a response arrived");
            SpineError::Network(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(SpineError::Network)?;

        if self.debug() {
            info!(status = status.as_u16(), bytes = body.len(), "Received response");
        } else {
            debug!(status = status.as_u16(), bytes = body.len(), "Received response");
        }

        if status.is_success() {
            Ok((status, body))
        } else {
            let err = SpineError::from_response(status, &headers, &body);
            error!(status = status.as_u16(), error = %err, "API error");
            Err(err)
        }
    }
}

/// Append percent-encoded segments to the base URL path
fn join_path(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            SpineError::Configuration(format!("Base URL cannot carry a path: {base}"))
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| SpineError::InvalidResponse(e.to_string()))
}
