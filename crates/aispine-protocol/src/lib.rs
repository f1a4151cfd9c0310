//! AI Spine Protocol - wire records for the flow and agent API
//!
//! These types mirror the JSON bodies the service sends and accepts. Each
//! record models the fields the client relies on and keeps everything else in
//! an `extra` map, so a newer service never breaks decoding.
//!
//! # Core Types
//!
//! - [`Execution`] - One run of a flow, with its [`ExecutionStatus`]
//! - [`Flow`] / [`Agent`] - Server-side definitions
//! - [`User`] and the API-key records - Account and credential state
//! - [`Listing`] - Normalizes list responses that may be bare or wrapped
//!
//! # Example
//!
//! ```rust
//! use aispine_protocol::{Execution, ExecutionStatus};
//! use serde_json::json;
//!
//! let exec: Execution = serde_json::from_value(json!({
//!     "execution_id": "exec-123",
//!     "status": "completed",
//!     "output_data": {"result": "success"}
//! })).unwrap();
//! assert_eq!(exec.status, ExecutionStatus::Completed);
//! ```

#![warn(missing_docs)]

/// Protocol models module
pub mod models;

pub use models::*;
