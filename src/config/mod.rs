//! Configuration management for LabelCheck

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// LabelCheck API key (sent as the `apikey` header on every request)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// API host override for development/testing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Cached anonymous session token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<StoredToken>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// Access token with expiry, cached between runs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    /// The JWT access token string
    pub access_token: String,

    /// Refresh token issued alongside the access token
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Token expiration time
    pub expires_at: DateTime<Utc>,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Default page size for scan history requests
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,
}

fn default_history_page_size() -> usize {
    20
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            history_page_size: default_history_page_size(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".labelcheck").join("config.yaml"))
    }

    /// Resolve the effective config path from an optional override
    pub fn resolve_path(path_override: Option<&str>) -> Result<PathBuf> {
        match path_override {
            Some(path) => Ok(PathBuf::from(path)),
            None => Self::default_path(),
        }
    }

    /// Load configuration from an optional path override
    pub fn load_at(path_override: Option<&str>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path_override)?)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Save configuration to an optional path override
    pub fn save_at(&self, path_override: Option<&str>) -> Result<()> {
        self.save_to(Self::resolve_path(path_override)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Config holds credentials; keep it private on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Check if the access token is expired or will expire soon (within 5 minutes)
    pub fn is_token_expired(&self) -> bool {
        match &self.session {
            None => true,
            Some(token) => {
                let now = Utc::now();
                let buffer = chrono::Duration::minutes(5);
                token.expires_at - buffer < now
            }
        }
    }

    /// Validate that required configuration is present
    pub fn validate_auth(&self) -> Result<()> {
        if self.api_key.is_none() {
            return Err(ConfigError::MissingApiKey.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.api_key.is_none());
        assert!(config.api_host.is_none());
        assert!(config.session.is_none());
        assert_eq!(config.preferences.history_page_size, 20);
    }

    #[test]
    fn test_token_expiry() {
        let mut config = Config::default();

        // No token should be expired
        assert!(config.is_token_expired());

        // Token expired in the past
        config.session = Some(StoredToken {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at: Utc::now() - chrono::Duration::hours(1),
        });
        assert!(config.is_token_expired());

        // Token expires in the future (more than 5 minutes)
        config.session = Some(StoredToken {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::hours(1),
        });
        assert!(!config.is_token_expired());

        // Token expires soon (less than 5 minutes)
        config.session = Some(StoredToken {
            access_token: "test".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::minutes(2),
        });
        assert!(config.is_token_expired());
    }

    #[test]
    fn test_validate_auth() {
        let mut config = Config::default();
        assert!(config.validate_auth().is_err());

        config.api_key = Some("lc_test_key".to_string());
        assert!(config.validate_auth().is_ok());
    }

    #[test]
    fn test_round_trip_yaml() {
        let config = Config {
            api_key: Some("lc_key".to_string()),
            api_host: Some("http://localhost:9999".to_string()),
            session: Some(StoredToken {
                access_token: "jwt".to_string(),
                refresh_token: Some("refresh".to_string()),
                expires_at: Utc::now() + chrono::Duration::hours(1),
            }),
            preferences: Preferences {
                format: Some("json".to_string()),
                history_page_size: 50,
            },
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();

        assert_eq!(parsed.api_key.as_deref(), Some("lc_key"));
        assert_eq!(parsed.api_host.as_deref(), Some("http://localhost:9999"));
        assert_eq!(parsed.preferences.history_page_size, 50);
        assert_eq!(
            parsed.session.unwrap().refresh_token.as_deref(),
            Some("refresh")
        );
    }
}
