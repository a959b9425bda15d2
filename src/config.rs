use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::constants::{DEFAULT_FORUM_BASE_URL, DEFAULT_USER_AGENT};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Forum
    pub forum_base_url: String,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to a value that cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 9001)?,

            // Forum
            forum_base_url: env_or_default("FORUM_BASE_URL", DEFAULT_FORUM_BASE_URL),
            request_timeout: parse_env_optional_u64("REQUEST_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            user_agent: env_or_default("USER_AGENT", DEFAULT_USER_AGENT),
        })
    }

    /// Configuration with defaults only, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
            forum_base_url: DEFAULT_FORUM_BASE_URL.to_string(),
            request_timeout: Some(Duration::from_secs(10)),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = Url::parse(&self.forum_base_url).map_err(|e| ConfigError::InvalidValue {
            name: "FORUM_BASE_URL".to_string(),
            message: e.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                name: "FORUM_BASE_URL".to_string(),
                message: format!("must be an http(s) URL, got '{}'", self.forum_base_url),
            });
        }
        if self.request_timeout == Some(Duration::ZERO) {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.user_agent.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "USER_AGENT".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_optional_u64(name: &str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => {
            val.parse().map(Some).map_err(|e| ConfigError::ParseInt {
                name: name.to_string(),
                source: e,
            })
        }
        _ => Ok(None),
    }
}
