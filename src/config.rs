//! Configuration loading and management for resumo.
//!
//! Loads settings from `resumo.toml` with environment variable overrides for
//! the backend location. A missing file is fine: every field has a default.

use crate::hooks::OverlapPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Environment variable overriding `api.base_url`
pub const ENV_API_URL: &str = "RESUMO_API_URL";
/// Environment variable overriding `api.timeout_ms`
pub const ENV_API_TIMEOUT: &str = "RESUMO_API_TIMEOUT";

const CONFIG_FILE_NAME: &str = "resumo.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Backend connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the document service
    pub base_url: String,
    /// Default request timeout in milliseconds
    pub timeout_ms: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_ms: 60_000,
        }
    }
}

/// Health poller settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    /// Seconds between two checks
    pub interval_secs: u64,
}

impl HealthConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

/// Feature hook settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// What a hook does when triggered while a call is still in flight
    pub overlap: OverlapPolicy,
}

/// Where exported Markdown lands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub health: HealthConfig,
    pub hooks: HooksConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from the default location (resumo.toml in cwd or home),
    /// falling back to defaults when no file exists.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Config::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Override backend settings from environment variables.
    ///
    /// Takes a lookup function so tests don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(raw) = lookup(ENV_API_TIMEOUT) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.api.timeout_ms = ms,
                Err(_) => warn!(value = %raw, "ignoring invalid {}", ENV_API_TIMEOUT),
            }
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        // Check current directory first
        let local_config = PathBuf::from(CONFIG_FILE_NAME);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("resumo")
            .join(CONFIG_FILE_NAME);
        home_config.exists().then_some(home_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_backend_contract() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout(), Duration::from_secs(60));
        assert_eq!(config.health.interval(), Duration::from_secs(30));
        assert_eq!(config.hooks.overlap, OverlapPolicy::LastWriteWins);
    }

    #[test]
    fn env_overrides_url_and_timeout() {
        let mut config = Config::default();
        config.apply_env(env(&[
            (ENV_API_URL, "https://docs.example.com"),
            (ENV_API_TIMEOUT, "1500"),
        ]));
        assert_eq!(config.api.base_url, "https://docs.example.com");
        assert_eq!(config.api.timeout_ms, 1500);
    }

    #[test]
    fn invalid_timeout_keeps_default() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_API_TIMEOUT, "soon")]));
        assert_eq!(config.api.timeout_ms, 60_000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[api]\nbase_url = \"http://10.0.0.2:9000\"\n\n[hooks]\noverlap = \"reject\""
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.api.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.api.timeout_ms, 60_000);
        assert_eq!(config.hooks.overlap, OverlapPolicy::Reject);
        assert_eq!(config.output.dir, PathBuf::from("."));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[api\nbase_url = 3").unwrap();
        assert!(matches!(
            Config::from_file(file.path()),
            Err(ConfigError::ParseError(_))
        ));
    }
}
