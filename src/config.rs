//! Configuration management for the workbench.
//!
//! Handles loading configuration from a TOML file, with environment and
//! command-line overrides for the query service location.

use crate::error::{Result, WorkbenchError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable that overrides the configured service URL.
pub const SERVICE_URL_ENV: &str = "WORKBENCH_URL";

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Query service settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Progress indicator settings.
    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Location and timeouts of the remote query-execution service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// Base URL, e.g. `http://localhost:8080`.
    #[serde(default = "default_url")]
    pub url: String,

    /// Path of the query endpoint, appended to `url`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_endpoint() -> String {
    "/query".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ServiceConfig {
    /// Returns the full query endpoint URL, validating the scheme.
    pub fn query_url(&self) -> Result<Url> {
        let base = Url::parse(&self.url).map_err(|e| {
            WorkbenchError::config(format!("Invalid service URL '{}': {e}", self.url))
        })?;

        if base.scheme() != "http" && base.scheme() != "https" {
            return Err(WorkbenchError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                base.scheme()
            )));
        }

        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            self.endpoint.trim_start_matches('/')
        );
        Url::parse(&joined).map_err(|e| {
            WorkbenchError::config(format!("Invalid endpoint '{}': {e}", self.endpoint))
        })
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns a short string for the header bar.
    pub fn display_string(&self) -> String {
        match Url::parse(&self.url) {
            Ok(url) => match (url.host_str(), url.port()) {
                (Some(host), Some(port)) => format!("{host}:{port}"),
                (Some(host), None) => host.to_string(),
                _ => self.url.clone(),
            },
            Err(_) => self.url.clone(),
        }
    }
}

/// Cosmetic progress simulation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressConfig {
    /// Milliseconds between progress ticks.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Largest increment of a single tick.
    #[serde(default = "default_max_step")]
    pub max_step: u8,
}

fn default_interval_ms() -> u64 {
    200
}

fn default_max_step() -> u8 {
    7
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            max_step: default_max_step(),
        }
    }
}

impl ProgressConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("query-workbench")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| WorkbenchError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            WorkbenchError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Applies the service URL override with precedence:
    /// 1. explicit value (command line)
    /// 2. `WORKBENCH_URL` environment variable
    /// 3. config file / default
    pub fn apply_url_override(&mut self, cli_url: Option<&str>) -> Result<()> {
        let env_url = std::env::var(SERVICE_URL_ENV).ok();
        if let Some(url) = cli_url.map(String::from).or(env_url) {
            self.service.url = url;
        }
        self.service.query_url()?;
        Ok(())
    }
}
