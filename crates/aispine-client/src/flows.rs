//! Flow execution and flow catalogue operations.

use aispine_protocol::{ExecuteFlowRequest, Execution, Flow, Listing};
use reqwest::Method;
use serde_json::Value;
use tracing::{info, instrument};

use crate::client::{require, Client};
use crate::error::{Result, SpineError};
use crate::transport::RequestOptions;

impl Client {
    /// Start an execution of a flow
    ///
    /// `input_data` must be a JSON object. Both checks run before any request
    /// is made.
    ///
    /// # Errors
    ///
    /// [`SpineError::Validation`] for an empty `flow_id` or non-object input,
    /// plus anything [`Client::send`] returns.
    #[instrument(skip(self, input_data, metadata))]
    pub async fn execute_flow(
        &self,
        flow_id: &str,
        input_data: Value,
        metadata: Option<Value>,
    ) -> Result<Execution> {
        require(flow_id, "Flow ID is required")?;
        if !input_data.is_object() {
            return Err(SpineError::validation("Input data must be a JSON object"));
        }

        let body = ExecuteFlowRequest {
            flow_id: flow_id.to_string(),
            input_data,
            metadata,
        };
        let execution: Execution = self
            .send_as(
                Method::POST,
                &["flows", "execute"],
                RequestOptions::new().with_json(&body)?,
            )
            .await?;

        info!(execution_id = %execution.execution_id, "Flow execution started");
        Ok(execution)
    }

    /// List all flows visible to this key
    pub async fn list_flows(&self) -> Result<Vec<Flow>> {
        let listing: Listing<Flow> = self
            .send_as(Method::GET, &["flows"], RequestOptions::new())
            .await?;
        listing
            .into_items("flows")
            .map_err(|e| SpineError::InvalidResponse(e.to_string()))
    }

    /// Fetch one flow definition
    pub async fn get_flow(&self, flow_id: &str) -> Result<Flow> {
        require(flow_id, "Flow ID is required")?;
        self.send_as(Method::GET, &["flows", flow_id], RequestOptions::new())
            .await
    }
}
