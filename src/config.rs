//! Configuration management for the proxy
//!
//! Parses TOML configuration files and provides typed access to settings.
//! Every section has defaults, so an empty file is a valid configuration.

use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::Path;
use std::str::FromStr;

/// Default upstream chat-completions endpoint
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.openai.com/v1/chat/completions";
/// Model identifier injected into every forwarded payload
pub const DEFAULT_MODEL: &str = "gpt-5-mini";
/// Completion token budget injected into every forwarded payload
pub const DEFAULT_MAX_COMPLETION_TOKENS: u32 = 2000;
/// Environment variable holding the upstream credential
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Largest accepted inbound request body (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Inbound bodies larger than this are rejected with 413
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Bind address as an IP; `validate()` guarantees `host` parses
    pub fn ip(&self) -> Result<IpAddr, std::net::AddrParseError> {
        self.host.parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8787
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

/// Upstream provider configuration
///
/// Fields are private; values are checked by `Config::validate()` and only
/// read through accessors afterwards.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_upstream_url")]
    url: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default = "default_max_completion_tokens")]
    max_completion_tokens: u32,
    /// Name of the environment variable the credential is read from
    #[serde(default = "default_api_key_env")]
    api_key_env: String,
}

impl UpstreamConfig {
    /// Full URL of the upstream chat-completions endpoint
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Model identifier sent upstream
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Completion token budget sent upstream
    pub fn max_completion_tokens(&self) -> u32 {
        self.max_completion_tokens
    }

    /// Environment variable the credential is read from
    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Point the proxy at a different upstream endpoint
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: default_upstream_url(),
            model: default_model(),
            max_completion_tokens: default_max_completion_tokens(),
            api_key_env: default_api_key_env(),
        }
    }
}

fn default_upstream_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_completion_tokens() -> u32 {
    DEFAULT_MAX_COMPLETION_TOKENS
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

/// Observability configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path_display = path.as_ref().display().to_string();

        let content = std::fs::read_to_string(path.as_ref()).map_err(|source| {
            AppError::ConfigFileRead {
                path: path_display.clone(),
                source,
            }
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|source| AppError::ConfigParseFailed {
                path: path_display.clone(),
                source,
            })?;

        config
            .validate()
            .map_err(|e| AppError::ConfigValidationFailed {
                path: path_display,
                reason: e.to_string(),
            })?;

        Ok(config)
    }

    /// Validate configuration after parsing
    ///
    /// Called by `from_file()` and `from_str()`; call it explicitly when a
    /// `Config` is assembled by hand.
    pub fn validate(&self) -> AppResult<()> {
        if self.server.ip().is_err() {
            return Err(AppError::Config(format!(
                "server.host '{}' must be an IP address such as 127.0.0.1 or 0.0.0.0",
                self.server.host
            )));
        }

        if self.server.max_body_bytes == 0 {
            return Err(AppError::Config(
                "server.max_body_bytes must be greater than 0".to_string(),
            ));
        }

        let upstream = &self.upstream;

        if !upstream.url.starts_with("http://") && !upstream.url.starts_with("https://") {
            return Err(AppError::Config(format!(
                "upstream.url '{}' must start with 'http://' or 'https://'",
                upstream.url
            )));
        }

        if upstream.model.trim().is_empty() {
            return Err(AppError::Config(
                "upstream.model cannot be empty".to_string(),
            ));
        }

        if upstream.max_completion_tokens == 0 {
            return Err(AppError::Config(
                "upstream.max_completion_tokens must be greater than 0".to_string(),
            ));
        }

        if upstream.api_key_env.trim().is_empty() {
            return Err(AppError::Config(
                "upstream.api_key_env cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl FromStr for Config {
    type Err = AppError;

    fn from_str(toml_str: &str) -> Result<Self, Self::Err> {
        let config: Config =
            toml::from_str(toml_str).map_err(|source| AppError::ConfigParseFailed {
                path: "<string>".to_string(),
                source,
            })?;

        config.validate()?;
        Ok(config)
    }
}
