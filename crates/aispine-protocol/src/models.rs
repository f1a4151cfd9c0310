use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Lifecycle state of an execution as reported by the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Queued, not started yet
    Pending,
    /// Currently running
    Running,
    /// Finished successfully
    Completed,
    /// Finished with an error
    Failed,
    /// Any status this client does not know about
    #[serde(other)]
    Unknown,
}

impl ExecutionStatus {
    /// Whether the execution can no longer change state
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Completed | ExecutionStatus::Failed)
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionStatus::Pending => write!(f, "pending"),
            ExecutionStatus::Running => write!(f, "running"),
            ExecutionStatus::Completed => write!(f, "completed"),
            ExecutionStatus::Failed => write!(f, "failed"),
            ExecutionStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Snapshot of one flow execution
///
/// The service owns executions; this is whatever it reported at fetch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Execution {
    /// Unique execution identifier
    pub execution_id: String,
    /// Flow this execution runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_id: Option<String>,
    /// Current status
    pub status: ExecutionStatus,
    /// Input the execution was started with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_data: Option<Value>,
    /// Output, present once completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_data: Option<Value>,
    /// Failure reason, present once failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Timestamp of creation
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp of last update
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Timestamp of completion
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /flows/execute`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteFlowRequest {
    /// Flow to run
    pub flow_id: String,
    /// Input object handed to the flow
    pub input_data: Value,
    /// Caller-defined metadata attached to the execution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// A server-defined pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Flow {
    /// Unique flow identifier
    pub flow_id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Node definitions, opaque to the client
    #[serde(default)]
    pub nodes: Vec<Value>,
    /// Timestamp of creation
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Timestamp of last update
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A configured processing unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Agent {
    /// Unique agent identifier
    pub agent_id: String,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Agent type (e.g. "processor")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<String>,
    /// Agent configuration, opaque to the client
    #[serde(default)]
    pub configuration: Value,
    /// Timestamp of creation
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /agents`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AgentConfig {
    /// Display name
    pub name: String,
    /// Agent type (e.g. "processor")
    #[serde(rename = "type")]
    pub agent_type: String,
    /// Agent configuration (model, temperature, ...)
    #[serde(default)]
    pub configuration: Value,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Additional fields forwarded as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AgentConfig {
    /// Create an agent config with an empty configuration object
    pub fn new(name: impl Into<String>, agent_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent_type: agent_type.into(),
            configuration: Value::Object(Map::new()),
            description: None,
            extra: Map::new(),
        }
    }

    /// Set the configuration object
    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = configuration;
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The account behind the API key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct User {
    /// Unique user identifier
    pub id: String,
    /// Account email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Remaining credits, absent when the service has none on record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    /// Subscription plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /api/v1/user/keys/my-key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiKeyStatus {
    /// Whether the user has a key at all
    #[serde(default)]
    pub has_api_key: bool,
    /// The key itself, if one exists
    #[serde(default)]
    pub api_key: Option<String>,
    /// Credits attached to the key
    #[serde(default)]
    pub credits: f64,
    /// Requests allowed per window
    #[serde(default)]
    pub rate_limit: f64,
    /// When the key was issued
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// When the key was last used
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// What `POST /api/v1/user/keys/generate` did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyAction {
    /// First key for this user
    Created,
    /// Existing key was replaced
    Regenerated,
    /// Any action this client does not know about
    #[serde(other)]
    Unknown,
}

/// Response of `POST /api/v1/user/keys/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiKeyGenerated {
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// The new key
    pub api_key: String,
    /// Whether the key was created or regenerated
    pub action: ApiKeyAction,
}

/// Response of `DELETE /api/v1/user/keys/revoke`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ApiKeyRevoked {
    /// Human-readable outcome
    #[serde(default)]
    pub message: String,
    /// Resulting key status (e.g. "revoked")
    #[serde(default)]
    pub status: String,
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HealthStatus {
    /// Overall health (e.g. "healthy")
    pub status: String,
    /// Service version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SystemStatus {
    /// Operational status (e.g. "operational")
    pub status: String,
    /// Uptime in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<f64>,
    /// Fields not modelled above
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Response of `GET /metrics`, a flat bag of named values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Metrics {
    /// Metric name to value
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl Metrics {
    /// Look up a metric by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Look up an integer metric by name
    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.values.get(name).and_then(Value::as_u64)
    }

    /// Look up a numeric metric by name, integer or not
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }
}

/// Parse a service timestamp
///
/// Accepts RFC 3339 as well as ISO 8601 without an offset (with a `T` or a
/// space separator), which is read as UTC. Returns `None` for anything else.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Timestamps are informational; one the client cannot read decodes as `None`
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(Value::as_str).and_then(parse_timestamp))
}

/// A list response that may arrive bare or wrapped in an object
///
/// `GET /flows` answers either `[...]` or `{"flows": [...]}`; the same holds
/// for agents. [`Listing::into_items`] turns both into a plain `Vec`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// A bare JSON array
    Bare(Vec<T>),
    /// An object carrying the array under a named field
    Wrapped(Map<String, Value>),
}

impl<T: DeserializeOwned> Listing<T> {
    /// Extract the items, reading `field` when the response was wrapped
    ///
    /// A wrapped response without `field` (or with `null`) yields no items.
    pub fn into_items(self, field: &str) -> Result<Vec<T>, serde_json::Error> {
        match self {
            Listing::Bare(items) => Ok(items),
            Listing::Wrapped(mut map) => match map.remove(field) {
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(items) => serde_json::from_value(items),
            },
        }
    }
}
