//! Configuration for the Long Distance Love backend.
//!
//! Everything is driven by environment variables; defaults apply when a
//! variable is unset.
//!
//! # Environment Variable Mapping
//!
//! - `PORT` → server.port (default 3000)
//! - `BIND_ADDRESS` → server.host (default 127.0.0.1)
//! - `OPENAI_API_KEY` → llm.api_key
//! - `OPENAI_BASE_URL` → llm.base_url (default https://api.openai.com)
//! - `LOG_LEVEL` → observability.log_level (default info)
//! - `LOG_FORMAT` → observability.log_format (pretty | json)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address. Default: "127.0.0.1" (local only); set to "0.0.0.0"
    /// for remote access.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    3000
}

/// Completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmConfig {
    /// OpenAI API key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the OpenAI endpoint (Azure / compatible APIs)
    #[serde(default)]
    pub base_url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Base log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format: "pretty" or "json"
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

/// Top-level service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides onto the current values.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .with_context(|| format!("invalid PORT value: {port}"))?;
        }
        if let Ok(host) = std::env::var("BIND_ADDRESS") {
            self.server.host = host;
        }
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("OPENAI_BASE_URL") {
            if !url.is_empty() {
                self.llm.base_url = Some(url);
            }
        }
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.observability.log_format = format;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.observability.log_level, "info");
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config =
            serde_json::from_str(r#"{"server": {"port": 8080}}"#).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
    }
}
