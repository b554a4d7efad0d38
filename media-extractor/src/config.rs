//! Configuration management for the media extractor.
//!
//! Loads configuration from TOML files and provides runtime defaults. The
//! `[sites]` table carries the user's site settings in the same camelCase
//! shape the extension stores them in.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Errors from reading or writing the config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub sites: Settings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether extraction is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Interval between media info polls
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Interval between background bridge refreshes
    #[serde(default = "default_bridge_refresh")]
    pub bridge_refresh_ms: u64,
}

impl TimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn bridge_refresh(&self) -> Duration {
        Duration::from_millis(self.bridge_refresh_ms.max(1))
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            bridge_refresh_ms: default_bridge_refresh(),
        }
    }
}

/// User site settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Site names excluded from resolution
    #[serde(default)]
    pub disabled_sites: Vec<String>,

    /// Fall back to the generic adapter on unsupported sites
    #[serde(default)]
    pub use_generic: bool,

    /// Restrict the generic fallback with `generic_list`
    #[serde(default)]
    pub use_generic_list: bool,

    /// Whether `generic_list` is a blocklist (true) or an allowlist
    #[serde(default = "default_true")]
    pub is_list_blocked: bool,

    /// Hostnames, glob wildcards allowed
    #[serde(default)]
    pub generic_list: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            disabled_sites: Vec::new(),
            use_generic: false,
            use_generic_list: false,
            is_list_blocked: true,
            generic_list: Vec::new(),
        }
    }
}

impl Settings {
    pub fn is_disabled(&self, site: &str) -> bool {
        self.disabled_sites.iter().any(|s| s == site)
    }

    pub fn generic_filter(&self) -> GenericListFilter {
        GenericListFilter::new(self)
    }
}

/// Decides whether the generic adapter may run on a host
#[derive(Debug, Clone)]
pub struct GenericListFilter {
    enabled: bool,
    use_list: bool,
    is_blocklist: bool,
    patterns: Vec<glob::Pattern>,
}

impl GenericListFilter {
    pub fn new(settings: &Settings) -> Self {
        let patterns = settings
            .generic_list
            .iter()
            .filter_map(|pattern| {
                glob::Pattern::new(pattern)
                    .map_err(|e| {
                        warn!("Invalid generic list pattern '{}': {}", pattern, e);
                        e
                    })
                    .ok()
            })
            .collect();

        Self {
            enabled: settings.use_generic,
            use_list: settings.use_generic_list,
            is_blocklist: settings.is_list_blocked,
            patterns,
        }
    }

    /// Whether a host is on the list
    pub fn is_listed(&self, hostname: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(hostname))
    }

    pub fn allows(&self, hostname: &str) -> bool {
        if !self.enabled {
            return false;
        }
        if !self.use_list {
            return true;
        }

        let listed = self.is_listed(hostname);
        let allowed = listed != self.is_blocklist;
        if !allowed {
            debug!("Generic adapter not allowed on '{}'", hostname);
        }
        allowed
    }
}

// Default value functions for serde
fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    250
}

fn default_bridge_refresh() -> u64 {
    1000
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Self {
        Self::load_from_path(&Self::default_config_path())
    }

    /// Load configuration from a specific path, falling back to defaults
    pub fn load_from_path(path: &Path) -> Self {
        match Self::try_load_from_path(path) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", path);
                config
            }
            Err(ConfigError::Io(_)) => {
                info!("No config file found at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => {
                warn!("{}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load configuration from a specific path, surfacing any error
    pub fn try_load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("media-extractor")
            .join("config.toml")
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&Self::default_config_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!("Saved configuration to {:?}", path);
        Ok(())
    }
}
