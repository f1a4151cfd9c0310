//! Agent management operations.

use aispine_protocol::{Agent, AgentConfig, Listing};
use reqwest::Method;
use tracing::{debug, info, instrument};

use crate::client::{require, Client};
use crate::error::{Result, SpineError};
use crate::transport::RequestOptions;

impl Client {
    /// List all agents visible to this key
    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        let listing: Listing<Agent> = self
            .send_as(Method::GET, &["agents"], RequestOptions::new())
            .await?;
        listing
            .into_items("agents")
            .map_err(|e| SpineError::InvalidResponse(e.to_string()))
    }

    /// Create an agent
    ///
    /// The config is sent as-is; the service validates it.
    #[instrument(skip(self, config), fields(name = %config.name))]
    pub async fn create_agent(&self, config: &AgentConfig) -> Result<Agent> {
        let agent: Agent = self
            .send_as(
                Method::POST,
                &["agents"],
                RequestOptions::new().with_json(config)?,
            )
            .await?;
        info!(agent_id = %agent.agent_id, "Agent created");
        Ok(agent)
    }

    /// Delete an agent
    ///
    /// Returns `true` on any 2xx whatever the body says, `false` when the
    /// service reports the agent does not exist. Every other failure is
    /// returned as an error.
    pub async fn delete_agent(&self, agent_id: &str) -> Result<bool> {
        require(agent_id, "Agent ID is required")?;
        match self
            .send_status(Method::DELETE, &["agents", agent_id], RequestOptions::new())
            .await
        {
            Ok(_) => Ok(true),
            Err(SpineError::Api {
                status_code: 404, ..
            }) => {
                debug!(agent_id, "Agent not found, nothing to delete");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}
