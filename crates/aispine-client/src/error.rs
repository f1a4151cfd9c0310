//! Error taxonomy for the AI Spine client.
//!
//! Every failure a caller can see is a [`SpineError`]. HTTP failures are
//! classified by [`SpineError::from_response`]; the rest come from local
//! validation, the transport, or the execution poller.

use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Where users manage their API keys
pub const DASHBOARD_URL: &str = "https://ai-spine.com/dashboard";
/// Where users top up credits
pub const BILLING_URL: &str = "https://ai-spine.com/billing";

const INSUFFICIENT_CREDITS_CODE: &str = "INSUFFICIENT_CREDITS";
const MAX_MESSAGE_LEN: usize = 256;

/// Fieldless discriminant of [`SpineError`], for branching without matching fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Client could not be constructed
    Configuration,
    /// Input rejected locally or by the service (400)
    Validation,
    /// API key rejected (401)
    Authentication,
    /// Account lacks credits for the operation (403)
    InsufficientCredits,
    /// Too many requests (429)
    RateLimit,
    /// Execution reached the failed state
    Execution,
    /// Poller deadline exceeded
    Timeout,
    /// Transport failure
    Network,
    /// Any other non-2xx response
    Api,
    /// A 2xx response the client could not decode
    InvalidResponse,
}

/// Errors returned by the AI Spine client
#[derive(Error, Debug)]
pub enum SpineError {
    /// Invalid client configuration
    #[error("{0}")]
    Configuration(String),

    /// Input rejected, either locally before any request or by the service
    #[error("{message}")]
    Validation {
        /// What was wrong
        message: String,
        /// 400 when reported by the service, `None` when raised locally
        status_code: Option<u16>,
    },

    /// API key missing, invalid or revoked
    #[error("{message}. Please check your API key at {}", DASHBOARD_URL)]
    Authentication {
        /// Message reported by the service
        message: String,
        /// Always 401
        status_code: u16,
    },

    /// The account does not have enough credits
    #[error("{message}. Add credits at {}", BILLING_URL)]
    InsufficientCredits {
        /// Message reported by the service
        message: String,
        /// Credits the operation requires
        credits_needed: Option<i64>,
        /// Credits left on the account
        credits_available: Option<i64>,
    },

    /// Request rate exceeded
    #[error("{message} (retry after {retry_after}s)")]
    RateLimit {
        /// Message reported by the service
        message: String,
        /// Seconds to wait, from the `Retry-After` header (0 when absent)
        retry_after: u64,
    },

    /// Execution finished in the failed state
    #[error("Execution {execution_id} failed: {message}")]
    Execution {
        /// Failure reason reported for the execution
        message: String,
        /// The failed execution
        execution_id: String,
    },

    /// Execution did not reach a terminal state in time
    #[error("Execution {execution_id} did not complete within {timeout:?}")]
    Timeout {
        /// The execution being waited on
        execution_id: String,
        /// The overall wait budget
        timeout: Duration,
    },

    /// Connection failure, transport timeout or broken response stream
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Any other non-2xx response
    #[error("API error ({status_code}): {message}")]
    Api {
        /// Message reported by the service
        message: String,
        /// HTTP status code
        status_code: u16,
    },

    /// A successful response whose body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias using [`SpineError`]
pub type Result<T> = std::result::Result<T, SpineError>;

impl SpineError {
    /// A locally raised validation error
    pub fn validation(message: impl Into<String>) -> Self {
        SpineError::Validation {
            message: message.into(),
            status_code: None,
        }
    }

    /// Classify a non-2xx response
    ///
    /// Never fails: a body that is not JSON, or has no message, yields
    /// `"HTTP <status>"` as the message.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, body: &str) -> Self {
        let code = status.as_u16();
        let json: Option<Value> = serde_json::from_str(body).ok();
        let message = json
            .as_ref()
            .and_then(extract_message)
            .map(sanitize_message)
            .unwrap_or_else(|| format!("HTTP {code}"));

        match code {
            400 => SpineError::Validation {
                message,
                status_code: Some(code),
            },
            401 => SpineError::Authentication {
                message,
                status_code: code,
            },
            403 if error_code(json.as_ref()) == Some(INSUFFICIENT_CREDITS_CODE) => {
                let field = |name: &str| json.as_ref().and_then(|v| v.get(name)).and_then(Value::as_i64);
                SpineError::InsufficientCredits {
                    message,
                    credits_needed: field("credits_needed"),
                    credits_available: field("credits_available"),
                }
            }
            429 => SpineError::RateLimit {
                message,
                retry_after: parse_retry_after(headers),
            },
            _ => SpineError::Api {
                message,
                status_code: code,
            },
        }
    }

    /// The discriminant of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpineError::Configuration(_) => ErrorKind::Configuration,
            SpineError::Validation { .. } => ErrorKind::Validation,
            SpineError::Authentication { .. } => ErrorKind::Authentication,
            SpineError::InsufficientCredits { .. } => ErrorKind::InsufficientCredits,
            SpineError::RateLimit { .. } => ErrorKind::RateLimit,
            SpineError::Execution { .. } => ErrorKind::Execution,
            SpineError::Timeout { .. } => ErrorKind::Timeout,
            SpineError::Network(_) => ErrorKind::Network,
            SpineError::Api { .. } => ErrorKind::Api,
            SpineError::InvalidResponse(_) => ErrorKind::InvalidResponse,
        }
    }

    /// HTTP status code behind this error, if it came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SpineError::Validation { status_code, .. } => *status_code,
            SpineError::Authentication { status_code, .. } => Some(*status_code),
            SpineError::InsufficientCredits { .. } => Some(403),
            SpineError::RateLimit { .. } => Some(429),
            SpineError::Api { status_code, .. } => Some(*status_code),
            SpineError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Seconds the service asked us to wait, for rate-limit errors
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            SpineError::RateLimit { retry_after, .. } => Some(Duration::from_secs(*retry_after)),
            _ => None,
        }
    }
}

fn extract_message(body: &Value) -> Option<&str> {
    ["message", "detail", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
}

fn error_code(body: Option<&Value>) -> Option<&str> {
    body?.get("error_code")?.as_str()
}

fn parse_retry_after(headers: &HeaderMap) -> u64 {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

static REDACTIONS: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();

/// Key-like patterns and their replacements, compiled once
fn redactions() -> &'static [(Regex, &'static str)] {
    REDACTIONS.get_or_init(|| {
        [
            (r"sk_[A-Za-z0-9_\-]{8,}", "sk_***"),
            (r"(?i)bearer\s+[A-Za-z0-9_\-\.]{8,}", "Bearer ***"),
        ]
        .into_iter()
        .filter_map(|(pattern, replacement)| Regex::new(pattern).ok().map(|re| (re, replacement)))
        .collect()
    })
}

/// Redact key-like strings and cap the length of a server message
fn sanitize_message(message: &str) -> String {
    let mut sanitized = message.to_string();
    for (re, replacement) in redactions() {
        sanitized = re.replace_all(&sanitized, *replacement).into_owned();
    }

    if sanitized.chars().count() > MAX_MESSAGE_LEN {
        let truncated: String = sanitized.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{truncated}... [truncated]")
    } else {
        sanitized
    }
}
