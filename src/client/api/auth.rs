//! Authentication API trait

use async_trait::async_trait;

use crate::client::models::SessionToken;
use crate::error::Result;

/// Anonymous authentication against the LabelCheck backend
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Sign in anonymously with the configured API key and get an access token
    async fn sign_in_anonymous(&self, api_key: &str) -> Result<SessionToken>;
}
