//! Configuration management for taskdeck.
//!
//! Loads configuration from ${TASKDECK_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default value for serde when log_level is missing.
fn default_log_level() -> String {
    Config::DEFAULT_LOG_LEVEL.to_string()
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the task API server (optional; env var wins)
    pub base_url: Option<String>,

    /// Default log filter when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            log_level: default_log_level(),
        }
    }
}

/// Returns the default config template with comments.
///
/// This is embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

impl Config {
    const DEFAULT_BASE_URL: &str = "http://localhost:3000";
    const DEFAULT_LOG_LEVEL: &str = "warn";

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
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

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved value is not a well-formed URL.
    pub fn effective_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var("TASKDECK_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        if let Some(config_url) = self.base_url.as_deref() {
            let trimmed = config_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.trim_end_matches('/').to_string());
            }
        }

        Ok(Self::DEFAULT_BASE_URL.to_string())
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path)
            .with_context(|| format!("Failed to move config into place at {}", path.display()))?;
        Ok(())
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid base URL: {url}"))?;
    Ok(())
}

pub mod paths {
    //! Path resolution for taskdeck configuration and credential files.
    //!
    //! TASKDECK_HOME resolution order:
    //! 1. TASKDECK_HOME environment variable (if set)
    //! 2. ~/.config/taskdeck (default)

    use std::path::PathBuf;

    /// Returns the taskdeck home directory.
    ///
    /// Checks TASKDECK_HOME env var first, falls back to ~/.config/taskdeck
    pub fn taskdeck_home() -> PathBuf {
        if let Ok(home) = std::env::var("TASKDECK_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("taskdeck"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        taskdeck_home().join("config.toml")
    }

    /// Returns the path to the stored credential file.
    pub fn credentials_path() -> PathBuf {
        taskdeck_home().join("credentials.json")
    }
}
