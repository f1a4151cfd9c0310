//! Service introspection.

use aispine_protocol::{HealthStatus, Metrics, SystemStatus};
use reqwest::Method;

use crate::client::Client;
use crate::error::Result;
use crate::transport::RequestOptions;

impl Client {
    /// `GET /health`
    pub async fn health_check(&self) -> Result<HealthStatus> {
        self.send_as(Method::GET, &["health"], RequestOptions::new())
            .await
    }

    /// `GET /metrics`
    pub async fn get_metrics(&self) -> Result<Metrics> {
        self.send_as(Method::GET, &["metrics"], RequestOptions::new())
            .await
    }

    /// `GET /status`
    pub async fn get_status(&self) -> Result<SystemStatus> {
        self.send_as(Method::GET, &["status"], RequestOptions::new())
            .await
    }
}
