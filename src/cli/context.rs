//! Command execution context
//!
//! Provides a unified context for command execution, eliminating boilerplate
//! for config loading, authentication, and client initialization.

use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::client::models::SessionToken;
use crate::client::{AuthApi, LabelCheckClient};
use crate::config::{Config, StoredToken};
use crate::error::Result;

/// Context for command execution containing config, client, and runtime options.
///
/// This struct encapsulates all shared state needed by commands, providing:
/// - Loaded and validated configuration
/// - Authenticated API client with a valid token (Arc-wrapped so the
///   polling/parallel paths can share it)
/// - Output format preference
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Authenticated API client
    pub client: Arc<LabelCheckClient>,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context with full initialization.
    ///
    /// This handles:
    /// - Loading config from path (or default location)
    /// - Resolving the API host (flag/env wins over config)
    /// - Validating authentication (API key present)
    /// - Reusing the cached token, or signing in and caching a new one
    ///
    /// # Errors
    /// Returns error if config cannot be loaded or authentication fails.
    pub async fn new(
        format: OutputFormat,
        config_path: Option<&str>,
        api_host: Option<&str>,
    ) -> Result<Self> {
        let mut config = Config::load_at(config_path)?;
        config.validate_auth()?;

        let host = api_host
            .map(|h| h.to_string())
            .or_else(|| config.api_host.clone());

        let client = Arc::new(LabelCheckClient::with_host(config.api_key.clone(), host)?);

        if !config.is_token_expired() {
            // Use cached token
            if let Some(ref stored) = config.session {
                client
                    .set_token(SessionToken {
                        access_token: stored.access_token.clone(),
                        refresh_token: stored.refresh_token.clone(),
                        expires_at: stored.expires_at,
                    })
                    .await;
            }
        } else {
            // Sign in and cache the new token
            let api_key = config.api_key.as_ref().expect("validated above");
            let token = client.sign_in_anonymous(api_key).await?;

            // Save to config for future runs
            config.session = Some(StoredToken {
                access_token: token.access_token.clone(),
                refresh_token: token.refresh_token.clone(),
                expires_at: token.expires_at,
            });
            config.save_at(config_path)?;

            client.set_token(token).await;
        }

        Ok(Self {
            config,
            client,
            format,
        })
    }
}
