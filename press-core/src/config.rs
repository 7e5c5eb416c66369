//! Configuration management

use crate::error::{ErrorContext, PressError, PressResult};
use crate::logging::LoggingConfig;
use crate::types::TeamBootstrap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration of the console client
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Site URL, e.g. `https://cloud.example.com`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
    /// Raw `Cookie` header of the logged-in browser session (`sid=...; user_id=...`)
    pub cookie: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_seconds: 30,
            user_agent: format!("press-console/{}", env!("CARGO_PKG_VERSION")),
            cookie: None,
        }
    }
}

/// Session settings, including the values a host page would inject
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(flatten)]
    pub bootstrap: TeamBootstrap,
    /// Where the local key-value store lives; in-memory when unset
    #[serde(default)]
    pub storage_path: Option<PathBuf>,
}

impl ConsoleConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> PressResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| PressError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        let config: ConsoleConfig = toml::from_str(&content).map_err(|e| PressError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        Ok(config)
    }

    /// Save configuration to a TOML file, creating parent directories
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> PressResult<()> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self).map_err(|e| PressError::Config {
            message: format!("Failed to serialize config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config").with_operation("serialize_toml"),
        })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content).map_err(|e| PressError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> PressResult<()> {
        let url = url::Url::parse(&self.server.base_url).map_err(|e| PressError::Config {
            message: format!("Invalid server.base_url '{}': {}", self.server.base_url, e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("validate")
                .with_suggestion("Use an absolute URL such as https://cloud.example.com"),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(PressError::Config {
                message: format!("Unsupported URL scheme: {}", url.scheme()),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Use http or https"),
            });
        }

        if self.server.timeout_seconds == 0 {
            return Err(PressError::Config {
                message: "server.timeout_seconds must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set server.timeout_seconds to a positive value"),
            });
        }

        if self
            .session
            .bootstrap
            .valid_teams
            .iter()
            .any(|team| team.name.trim().is_empty())
        {
            return Err(crate::validation_error!(
                "valid_teams entries must have a name",
                "session.valid_teams",
                "config"
            ));
        }

        Ok(())
    }
}
