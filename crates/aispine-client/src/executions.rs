//! Execution status and wait-for-completion operations.

use aispine_protocol::Execution;
use reqwest::Method;
use serde_json::Value;

use crate::client::{require, Client};
use crate::error::Result;
use crate::poller::{self, WaitOptions};
use crate::transport::RequestOptions;

impl Client {
    /// Fetch the current snapshot of an execution
    pub async fn get_execution(&self, execution_id: &str) -> Result<Execution> {
        require(execution_id, "Execution ID is required")?;
        self.send_as(
            Method::GET,
            &["executions", execution_id],
            RequestOptions::new(),
        )
        .await
    }

    /// Poll an execution until it completes, fails, or `options.timeout` passes
    ///
    /// See [`poller::wait_for_execution`] for the state machine.
    pub async fn wait_for_execution(
        &self,
        execution_id: &str,
        options: WaitOptions,
    ) -> Result<Execution> {
        require(execution_id, "Execution ID is required")?;
        poller::wait_for_execution(self, execution_id, options).await
    }

    /// Start a flow and wait for its execution to finish
    pub async fn execute_flow_and_wait(
        &self,
        flow_id: &str,
        input_data: Value,
        metadata: Option<Value>,
        options: WaitOptions,
    ) -> Result<Execution> {
        let started = self.execute_flow(flow_id, input_data, metadata).await?;
        self.wait_for_execution(&started.execution_id, options).await
    }
}
