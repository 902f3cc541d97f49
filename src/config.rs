//! Configuration management for autothumb
//! Reads the Anthropic API key and optional overrides from the environment

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable holding the Anthropic API key
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

/// Default vision model used for frame analysis and text generation
pub const DEFAULT_MODEL: &str = "claude-3-opus-20240229";

/// Default timeout for hosted-model requests, in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Runtime configuration resolved once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Anthropic API key
    pub api_key: String,
    /// Model identifier (override with AUTOTHUMB_MODEL)
    pub model: String,
    /// Hosted-model request timeout in seconds (override with AUTOTHUMB_TIMEOUT_SECS)
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from the environment, reading a local `.env` first.
    ///
    /// A missing API key is a configuration error raised before any
    /// external tool or network call.
    pub fn load() -> Result<Self> {
        // Best effort; a missing .env file is not an error.
        let _ = dotenvy::dotenv();

        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                Error::Config(format!(
                    "Anthropic API key required. Set the {} environment variable \
                     or add it to a .env file.",
                    API_KEY_VAR
                ))
            })?;

        let model =
            env::var("AUTOTHUMB_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = match env::var("AUTOTHUMB_TIMEOUT_SECS") {
            Ok(raw) => raw.parse().map_err(|_| {
                Error::Config(format!(
                    "AUTOTHUMB_TIMEOUT_SECS must be a number of seconds, got '{}'",
                    raw
                ))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            api_key,
            model,
            timeout_secs,
        })
    }

    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeout() {
        let config = AppConfig {
            api_key: "test-key".to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            api_key: "test-key".to_string(),
            model: "claude-3-opus-20240229".to_string(),
            timeout_secs: 30,
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.model, config.model);
        assert_eq!(parsed.timeout_secs, 30);
    }
}
