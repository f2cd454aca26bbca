//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the API base URL override, the last used login email, and the
//! credential scheme selection.
//!
//! Configuration is stored at `~/.config/campusdesk/config.json`; the
//! session file and logs live under the platform data directory.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::DEFAULT_API_URL;
use crate::auth::CredentialScheme;

/// Application name used for config/data directory paths
const APP_NAME: &str = "campusdesk";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding the API base URL
const API_URL_ENV: &str = "CAMPUSDESK_API_URL";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub last_email: Option<String>,
    #[serde(default)]
    pub credential_scheme: CredentialScheme,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The API base URL, resolved env var > config file > default
    pub fn resolved_api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .or_else(|| self.api_url.clone())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory holding the session file and logs
    pub fn data_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scheme_is_token() {
        // Older config files predate the credential_scheme field
        let config: Config = serde_json::from_str(r#"{"last_email": "a@b.com"}"#)
            .expect("Failed to parse config JSON");
        assert_eq!(config.credential_scheme, CredentialScheme::Token);
        assert_eq!(config.last_email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_scheme_round_trip() {
        let config = Config {
            api_url: Some("http://campus.example:9080".to_string()),
            last_email: None,
            credential_scheme: CredentialScheme::Cookie,
        };
        let json = serde_json::to_string(&config).expect("Failed to serialize config");
        assert!(json.contains(r#""credential_scheme":"cookie""#));
        let parsed: Config = serde_json::from_str(&json).expect("Failed to parse config");
        assert_eq!(parsed.credential_scheme, CredentialScheme::Cookie);
    }
}
