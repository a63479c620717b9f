//! LabelCheck API client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tokio::sync::RwLock;

use super::models::{HistoryPage, ScanRecord, SessionToken, UploadAck};
use super::pagination::HistoryParams;
use super::{AuthApi, HistoryApi, ScanApi};
use crate::error::{ApiError, Result};

/// Decode base64url (URL-safe base64 without padding)
fn base64_decode_url(input: &str) -> std::result::Result<Vec<u8>, String> {
    use base64::{Engine as _, engine::general_purpose};

    // Base64url uses - instead of + and _ instead of /
    let standard_b64 = input.replace('-', "+").replace('_', "/");

    // Add padding if needed
    let padding = match standard_b64.len() % 4 {
        0 => "",
        2 => "==",
        3 => "=",
        _ => return Err("Invalid base64url length".to_string()),
    };

    let padded = format!("{}{}", standard_b64, padding);

    general_purpose::STANDARD
        .decode(&padded)
        .map_err(|e| e.to_string())
}

/// Extract the `exp` claim from a JWT without verifying the signature.
///
/// The client only needs the expiry for proactive refresh; verification is
/// the server's job.
fn jwt_expiry(token: &str) -> Result<chrono::DateTime<Utc>> {
    #[derive(Deserialize)]
    struct JwtPayload {
        exp: i64, // Unix timestamp
    }

    // JWT format: header.payload.signature
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() != 3 {
        return Err(ApiError::InvalidToken.into());
    }

    let payload_bytes = base64_decode_url(parts[1])
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to decode JWT payload: {}", e)))?;

    let payload: JwtPayload = serde_json::from_slice(&payload_bytes)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse JWT payload: {}", e)))?;

    chrono::DateTime::from_timestamp(payload.exp, 0)
        .ok_or_else(|| ApiError::InvalidResponse("Invalid JWT expiration timestamp".to_string()).into())
}

/// LabelCheck API base URL
const API_BASE_URL: &str = "https://api.labelcheck.app/v2";

/// Rate limit: 360 requests per minute (6 per second)
const RATE_LIMIT_PER_SECOND: u32 = 6;

/// Query flag opting into the nullable-verdict contract on scan endpoints.
///
/// With it, `overall_match` may be null to mean "analysis skipped because the
/// user has no preferences configured", distinct from "not yet analyzed".
const NULLABLE_ANALYSIS: (&str, &str) = ("nullable_analysis", "true");

/// LabelCheck API client
pub struct LabelCheckClient {
    http: HttpClient,
    base_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    auth_state: Arc<RwLock<AuthState>>,
}

/// Internal authentication state
#[derive(Debug, Clone)]
struct AuthState {
    api_key: Option<String>,
    access_token: Option<String>,
    expires_at: Option<chrono::DateTime<Utc>>,
}

impl LabelCheckClient {
    /// Create a new LabelCheck API client against the default host
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_host(api_key, None)
    }

    /// Create a client against a specific host (used by tests and dev setups)
    pub fn with_host(api_key: Option<String>, api_host: Option<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        // Rate limiter: 6 requests per second = 360 per minute
        let quota = Quota::per_second(std::num::NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap());
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        let base_url = api_host
            .map(|h| h.trim_end_matches('/').to_string())
            .unwrap_or_else(|| API_BASE_URL.to_string());

        Ok(Self {
            http,
            base_url,
            rate_limiter,
            auth_state: Arc::new(RwLock::new(AuthState {
                api_key,
                access_token: None,
                expires_at: None,
            })),
        })
    }

    /// Set the access token and expiry
    pub async fn set_token(&self, token: SessionToken) {
        let mut state = self.auth_state.write().await;
        state.access_token = Some(token.access_token);
        state.expires_at = Some(token.expires_at);
    }

    /// Check if the token is expired or will expire soon (within 5 minutes)
    async fn is_token_expired(&self) -> bool {
        let state = self.auth_state.read().await;
        match state.expires_at {
            None => true,
            Some(expires_at) => {
                let now = Utc::now();
                let buffer = chrono::Duration::minutes(5);
                expires_at - buffer < now
            }
        }
    }

    /// Get the current access token, signing in again if necessary
    async fn get_valid_token(&self) -> Result<String> {
        if self.is_token_expired().await {
            let api_key = {
                let state = self.auth_state.read().await;
                state.api_key.clone().ok_or(ApiError::Unauthorized)?
            };

            let token = self.sign_in_anonymous(&api_key).await?;
            self.set_token(token).await;
        }

        let state = self.auth_state.read().await;
        state.access_token.clone().ok_or(ApiError::Unauthorized.into())
    }

    /// The configured `apikey` header value
    async fn api_key(&self) -> Result<String> {
        let state = self.auth_state.read().await;
        state.api_key.clone().ok_or(ApiError::Unauthorized.into())
    }

    /// Make an authenticated JSON request
    async fn request<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        self.request_inner(method, path, query, true).await
    }

    /// Internal request implementation
    ///
    /// `allow_refresh` permits exactly one re-sign-in on a 401; the retried
    /// request runs with it cleared so a persistently rejecting backend
    /// surfaces `Unauthorized` instead of looping.
    async fn request_inner<T: for<'de> Deserialize<'de>>(
        &self,
        method: reqwest::Method,
        path: &str,
        query: &[(&str, String)],
        allow_refresh: bool,
    ) -> Result<T> {
        // Apply rate limiting
        self.rate_limiter.until_ready().await;

        let token = self.get_valid_token().await?;
        let api_key = self.api_key().await?;

        let url = format!("{}/{}", self.base_url, path);
        debug!("{} {} (query: {:?})", method, url, query);

        let response = self
            .http
            .request(method.clone(), &url)
            .query(query)
            .header("apikey", &api_key)
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        match status {
            StatusCode::OK => {
                let data = response.json::<T>().await.map_err(|e| {
                    ApiError::InvalidResponse(format!("Failed to parse response: {}", e))
                })?;
                Ok(data)
            }
            StatusCode::UNAUTHORIZED => {
                if allow_refresh {
                    let api_key = {
                        let state = self.auth_state.read().await;
                        state.api_key.clone()
                    };

                    if let Some(api_key) = api_key {
                        let token = self.sign_in_anonymous(&api_key).await?;
                        self.set_token(token).await;

                        // Retry once - box the recursive call
                        return Box::pin(self.request_inner(method, path, query, false)).await;
                    }
                }
                Err(ApiError::Unauthorized.into())
            }
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }
}

#[async_trait]
impl AuthApi for LabelCheckClient {
    async fn sign_in_anonymous(&self, api_key: &str) -> Result<SessionToken> {
        // Apply rate limiting
        self.rate_limiter.until_ready().await;

        #[derive(Deserialize)]
        struct SignInResponse {
            access_token: String,
            #[serde(default)]
            refresh_token: Option<String>,
        }

        let url = format!("{}/auth/anonymous", self.base_url);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("apikey", api_key)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(ApiError::Unauthorized.into());
        }

        // Keep the raw body around so a shape mismatch is diagnosable
        let response_text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        let sign_in: SignInResponse = serde_json::from_str(&response_text).map_err(|e| {
            ApiError::InvalidResponse(format!(
                "Failed to parse sign-in response: {}. Body was: {}",
                e, response_text
            ))
        })?;

        let expires_at = jwt_expiry(&sign_in.access_token)?;

        Ok(SessionToken {
            access_token: sign_in.access_token,
            refresh_token: sign_in.refresh_token,
            expires_at,
        })
    }
}

#[async_trait]
impl ScanApi for LabelCheckClient {
    async fn submit_scan_image(&self, scan_id: &str, image: &[u8]) -> Result<UploadAck> {
        self.rate_limiter.until_ready().await;

        let token = self.get_valid_token().await?;
        let api_key = self.api_key().await?;

        let part = reqwest::multipart::Part::bytes(image.to_vec())
            .file_name("image.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let url = format!("{}/scan/{}/image", self.base_url, scan_id);
        debug!("POST {} ({} bytes)", url, image.len());

        // Exactly one attempt: upload retries are the caller's decision
        let response = self
            .http
            .post(&url)
            .header("apikey", &api_key)
            .header("Authorization", format!("Bearer {}", token))
            .multipart(form)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        if status == StatusCode::OK {
            let ack = response.json::<UploadAck>().await.map_err(|e| {
                ApiError::InvalidResponse(format!("Failed to parse upload ack: {}", e))
            })?;
            return Ok(ack);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(body).into()),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(ApiError::BadRequest(body).into())
            }
            status if status.is_server_error() => Err(ApiError::ServerError(body).into()),
            status => {
                Err(ApiError::InvalidResponse(format!("Unexpected status code: {}", status)).into())
            }
        }
    }

    async fn get_scan(&self, scan_id: &str) -> Result<ScanRecord> {
        let path = format!("scan/{}", scan_id);
        let query = [(NULLABLE_ANALYSIS.0, NULLABLE_ANALYSIS.1.to_string())];
        self.request(reqwest::Method::GET, &path, &query).await
    }

    async fn reanalyze_scan(&self, scan_id: &str) -> Result<ScanRecord> {
        let path = format!("scan/{}/reanalyze", scan_id);
        let query = [(NULLABLE_ANALYSIS.0, NULLABLE_ANALYSIS.1.to_string())];
        self.request(reqwest::Method::POST, &path, &query).await
    }
}

#[async_trait]
impl HistoryApi for LabelCheckClient {
    async fn scan_history(&self, params: Option<&HistoryParams>) -> Result<HistoryPage> {
        let mut query: Vec<(&str, String)> = params
            .copied()
            .unwrap_or_default()
            .to_query_params()
            .into_iter()
            .map(|(k, v)| (k, v))
            .collect();
        query.push((NULLABLE_ANALYSIS.0, NULLABLE_ANALYSIS.1.to_string()));

        self.request(reqwest::Method::GET, "scan/history", &query)
            .await
    }
}
