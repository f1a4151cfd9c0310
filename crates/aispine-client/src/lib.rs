//! Async client for the AI Spine flow execution and agent management API
//!
//! # Features
//! - Bearer-key sessions with an explicit transport lifecycle
//! - Flow execution and a fixed-interval wait-for-completion poller
//! - Agent, account, credits and API-key operations
//! - A single error type whose variants map one-to-one onto service failures
//!
//! # Error Handling
//!
//! All operations return `Result<T, SpineError>`:
//!
//! ```no_run
//! # use aispine_client::{Client, ClientConfig, SpineError};
//! # async fn example() -> Result<(), SpineError> {
//! # let client = Client::new(ClientConfig::new("sk_live_key"))?;
//! match client.execute_flow("credit_analysis", serde_json::json!({"amount": 5000}), None).await {
//!     Ok(execution) => println!("Started {}", execution.execution_id),
//!     Err(SpineError::InsufficientCredits { credits_needed, .. }) => {
//!         println!("Need {:?} more credits", credits_needed)
//!     }
//!     Err(SpineError::RateLimit { retry_after, .. }) => println!("Retry in {retry_after}s"),
//!     Err(e) => println!("Error: {e}"),
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

mod agents;
mod client;
pub mod config;
pub mod error;
mod executions;
mod flows;
pub mod poller;
mod system;
pub mod transport;
mod users;

pub use client::Client;
pub use config::{Advisory, ClientConfig};
pub use error::{ErrorKind, Result, SpineError};
pub use poller::{ExecutionSource, WaitOptions};
pub use transport::RequestOptions;

pub use aispine_protocol as protocol;
pub use aispine_protocol::{
    Agent, AgentConfig, ApiKeyAction, ApiKeyGenerated, ApiKeyRevoked, ApiKeyStatus, Execution,
    ExecutionStatus, Flow, HealthStatus, Metrics, SystemStatus, User,
};
pub use reqwest::Method;
