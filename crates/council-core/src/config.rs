//! Configuration management for the council client.
//!
//! Loads configuration from ${COUNCIL_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::conversation::ExecutionMode;

/// Client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root URL of the council backend.
    pub base_url: String,
    /// Execution mode used for new pipeline runs.
    pub default_mode: ExecutionMode,
    /// Timeout for unary requests (seconds).
    pub request_timeout_secs: u64,
    /// Maximum silence between stream events (seconds, 0 = wait forever).
    pub stream_idle_timeout_secs: u64,
    /// Delay between provisioning a replacement conversation and replaying
    /// the edited prompt (milliseconds).
    pub restart_settle_ms: u64,
    /// Log filter used when `COUNCIL_LOG` is not set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            default_mode: ExecutionMode::default(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            stream_idle_timeout_secs: 0,
            restart_settle_ms: Self::DEFAULT_RESTART_SETTLE_MS,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8001";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
    const DEFAULT_RESTART_SETTLE_MS: u64 = 50;

    /// Loads configuration from the default config path.
    ///
    /// `COUNCIL_BASE_URL` overrides the file value.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&paths::config_path())?;
        config.base_url =
            resolve_base_url(std::env::var("COUNCIL_BASE_URL").ok(), &config.base_url)?;
        Ok(config)
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns None when the idle timeout is disabled.
    pub fn stream_idle_timeout(&self) -> Option<Duration> {
        (self.stream_idle_timeout_secs > 0)
            .then(|| Duration::from_secs(self.stream_idle_timeout_secs))
    }

    pub fn restart_settle(&self) -> Duration {
        Duration::from_millis(self.restart_settle_ms)
    }
}

/// Resolves the backend URL with precedence: env > config > default.
///
/// # Errors
/// Returns an error if the chosen URL does not parse.
pub fn resolve_base_url(env_url: Option<String>, config_url: &str) -> Result<String> {
    let chosen = env_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .or_else(|| Some(config_url.trim()).filter(|url| !url.is_empty()))
        .unwrap_or(Config::DEFAULT_BASE_URL);

    url::Url::parse(chosen).with_context(|| format!("Invalid backend base URL: {chosen}"))?;
    Ok(chosen.trim_end_matches('/').to_string())
}

pub mod paths {
    //! Path resolution for council configuration and logs.
    //!
    //! COUNCIL_HOME resolution order:
    //! 1. COUNCIL_HOME environment variable (if set)
    //! 2. ~/.config/council (default)
    //! 3. ./.council when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the council home directory.
    pub fn council_home() -> PathBuf {
        if let Ok(home) = std::env::var("COUNCIL_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".council"),
            |h| h.join(".config").join("council"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        council_home().join("config.toml")
    }

    /// Returns the directory rolling log files are written to.
    pub fn logs_dir() -> PathBuf {
        council_home().join("logs")
    }
}
