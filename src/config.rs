use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::signaling::Quality;

/// Value shipped in the stock config file before a real key is filled in.
const PLACEHOLDER_API_KEY: &str = "YourApiKey";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Connection settings for the signaling service.
///
/// Matches the JSON config file the service distributes
/// (`{"apiKey": ..., "serverUrl": ...}`); the remaining fields are
/// optional tuning knobs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientConfig {
    pub api_key: String,
    pub server_url: String,
    /// Quality tier requested at session creation.
    #[serde(default)]
    pub quality: Quality,
    /// Upper bound on each signaling round trip. The service contract
    /// specifies none, so an unresponsive endpoint would otherwise hang
    /// a lifecycle command forever.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>, server_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            server_url: server_url.into(),
            quality: Quality::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Loads and validates the JSON config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::parse(&std::fs::read_to_string(path)?)
    }

    fn parse(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.is_empty() || self.api_key == PLACEHOLDER_API_KEY {
            return Err(ConfigError::Invalid(
                "apiKey is missing; enter your API key in the config file".into(),
            ));
        }
        if self.server_url.is_empty() {
            return Err(ConfigError::Invalid(
                "serverUrl is missing; enter the server URL in the config file".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
