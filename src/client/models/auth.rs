//! Authentication token model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anonymous session token returned by the auth endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionToken {
    /// The JWT access token string
    pub access_token: String,

    /// Refresh token for re-authentication without a new sign-in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token expiration time, decoded from the JWT `exp` claim
    pub expires_at: DateTime<Utc>,
}
