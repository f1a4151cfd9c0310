//! Account, credits and API-key lifecycle operations.
//!
//! The key endpoints identify the user by the bearer key; the `user_id`
//! argument is only checked locally.

use aispine_protocol::{ApiKeyGenerated, ApiKeyRevoked, ApiKeyStatus, User};
use reqwest::Method;
use tracing::info;

use crate::client::{require, Client};
use crate::error::Result;
use crate::transport::RequestOptions;

const USER_ID_REQUIRED: &str = "User ID is required";

impl Client {
    /// Fetch the account behind the API key
    pub async fn get_current_user(&self) -> Result<User> {
        self.send_as(
            Method::GET,
            &["api", "v1", "users", "me"],
            RequestOptions::new(),
        )
        .await
    }

    /// Remaining credits on the account, `0` when none are on record
    ///
    /// Credits may be fractional.
    pub async fn check_credits(&self) -> Result<f64> {
        let user = self.get_current_user().await?;
        Ok(user.credits.unwrap_or(0.0))
    }

    /// Report whether the user has an API key
    pub async fn check_user_api_key(&self, user_id: &str) -> Result<ApiKeyStatus> {
        require(user_id, USER_ID_REQUIRED)?;
        self.send_as(
            Method::GET,
            &["api", "v1", "user", "keys", "my-key"],
            RequestOptions::new(),
        )
        .await
    }

    /// Create the user's API key, or replace the existing one
    pub async fn generate_user_api_key(&self, user_id: &str) -> Result<ApiKeyGenerated> {
        require(user_id, USER_ID_REQUIRED)?;
        let generated: ApiKeyGenerated = self
            .send_as(
                Method::POST,
                &["api", "v1", "user", "keys", "generate"],
                RequestOptions::new(),
            )
            .await?;
        info!(action = ?generated.action, "API key generated");
        Ok(generated)
    }

    /// Revoke the user's API key
    pub async fn revoke_user_api_key(&self, user_id: &str) -> Result<ApiKeyRevoked> {
        require(user_id, USER_ID_REQUIRED)?;
        let revoked: ApiKeyRevoked = self
            .send_as(
                Method::DELETE,
                &["api", "v1", "user", "keys", "revoke"],
                RequestOptions::new(),
            )
            .await?;
        info!("API key revoked");
        Ok(revoked)
    }
}
