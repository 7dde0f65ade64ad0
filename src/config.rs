//! Application configuration.
//!
//! The configuration is loaded from a JSON file, by default
//! `$XDG_CONFIG_HOME/hyprsnap/config.json`.  Every section is optional and
//! falls back to compiled-in defaults, so a minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "rules": { "tick_interval_ms": 2000, "autostart": true },
//!   "launch": { "max_attempts": 20, "poll_interval_ms": 250 },
//!   "storage": { "data_dir": "/home/me/.local/share/hyprsnap" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Rule monitor settings.
    #[serde(default)]
    pub rules: RulesConfig,

    /// How long layout replay waits for launched applications.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Where layouts, rules and positions are stored.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Rule monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Interval between two scans for new windows (ms).
    pub tick_interval_ms: u64,
    /// Start the monitor when the daemon starts.
    pub autostart: bool,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 2000,
            autostart: true,
        }
    }
}

impl RulesConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

/// Bounded wait for a launched application's window.
///
/// The total wait is at most `max_attempts × poll_interval_ms`; the wait
/// ends as soon as the window shows up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    pub max_attempts: u32,
    pub poll_interval_ms: u64,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            poll_interval_ms: 250,
        }
    }
}

impl LaunchConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Storage location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `layouts.json`, `window_rules.json` and
    /// `positions.json`.  Defaults to `$XDG_DATA_HOME/hyprsnap`.
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// The configured directory, or the platform default.
    pub fn resolve_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// `$XDG_DATA_HOME/hyprsnap`, or `/tmp/hyprsnap` when no home is known.
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hyprsnap")
}

/// `$XDG_CONFIG_HOME/hyprsnap/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("hyprsnap")
        .join("config.json")
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);
