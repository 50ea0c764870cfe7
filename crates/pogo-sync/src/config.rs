//! # Mirror Configuration
//!
//! Configuration management for the inventory mirror.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     POGO_ACCOUNT=ash                                                   │
//! │     POGO_CACHE_DIR=/tmp/pogo                                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/pogo-mirror/mirror.toml (Linux)                          │
//! │     ~/Library/Application Support/com.pogo.mirror/mirror.toml (macOS)  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [session]
//! account = "ash"
//! max_staleness_secs = 300
//!
//! [inventory]
//! warn_on_duplicates = true
//! change_channel_capacity = 256
//!
//! [location]
//! cache_dir = "/var/cache/pogo"
//! file_name = "location.json"
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{SyncError, SyncResult};

// =============================================================================
// Session Settings
// =============================================================================

/// Settings for one account session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Account label, used in log fields only.
    #[serde(default = "default_account")]
    pub account: String,

    /// Age after which the last applied batch counts as stale (seconds).
    #[serde(default = "default_max_staleness")]
    pub max_staleness_secs: u64,
}

fn default_account() -> String {
    "default".to_string()
}

fn default_max_staleness() -> u64 {
    300
}

impl Default for SessionSettings {
    fn default() -> Self {
        SessionSettings {
            account: default_account(),
            max_staleness_secs: default_max_staleness(),
        }
    }
}

// =============================================================================
// Inventory Settings
// =============================================================================

/// Reconciler behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventorySettings {
    /// Log a warning for each delta that matches more than one record.
    #[serde(default = "default_true")]
    pub warn_on_duplicates: bool,

    /// Buffer size of the async change broadcast channel.
    #[serde(default = "default_channel_capacity")]
    pub change_channel_capacity: usize,
}

fn default_true() -> bool {
    true
}

fn default_channel_capacity() -> usize {
    256
}

impl Default for InventorySettings {
    fn default() -> Self {
        InventorySettings {
            warn_on_duplicates: true,
            change_channel_capacity: default_channel_capacity(),
        }
    }
}

// =============================================================================
// Location Settings
// =============================================================================

/// Where the last known position is cached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationSettings {
    /// Cache directory. Falls back to the platform cache dir, then `./cache`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    #[serde(default = "default_location_file")]
    pub file_name: String,
}

fn default_location_file() -> String {
    "location.json".to_string()
}

impl Default for LocationSettings {
    fn default() -> Self {
        LocationSettings {
            cache_dir: None,
            file_name: default_location_file(),
        }
    }
}

impl LocationSettings {
    /// Full path of the location cache file.
    pub fn location_path(&self) -> PathBuf {
        let dir = self
            .cache_dir
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.cache_dir().to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("cache"));
        dir.join(&self.file_name)
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete mirror configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MirrorConfig {
    #[serde(default)]
    pub session: SessionSettings,

    #[serde(default)]
    pub inventory: InventorySettings,

    #[serde(default)]
    pub location: LocationSettings,
}

impl MirrorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (mirror.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SyncResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading mirror config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| SyncError::ConfigLoadFailed(e.to_string()))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load mirror config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SyncResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SyncError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| SyncError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Mirror config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SyncResult<()> {
        if self.session.account.trim().is_empty() {
            return Err(SyncError::InvalidConfig("session.account must not be empty".into()));
        }

        if self.inventory.change_channel_capacity == 0 {
            return Err(SyncError::InvalidConfig(
                "inventory.change_channel_capacity must be greater than 0".into(),
            ));
        }

        if self.location.file_name.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "location.file_name must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any key lookup (environment in production).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(account) = lookup("POGO_ACCOUNT") {
            debug!(account = %account, "Overriding account from environment");
            self.session.account = account;
        }

        if let Some(secs) = lookup("POGO_MAX_STALENESS_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.session.max_staleness_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring invalid POGO_MAX_STALENESS_SECS"),
            }
        }

        if let Some(capacity) = lookup("POGO_CHANGE_CHANNEL_CAPACITY") {
            match capacity.parse::<usize>() {
                Ok(c) => self.inventory.change_channel_capacity = c,
                Err(_) => warn!(value = %capacity, "Ignoring invalid POGO_CHANGE_CHANNEL_CAPACITY"),
            }
        }

        if let Some(dir) = lookup("POGO_CACHE_DIR") {
            debug!(dir = %dir, "Overriding cache dir from environment");
            self.location.cache_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("mirror.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn account(&self) -> &str {
        &self.session.account
    }

    pub fn max_staleness(&self) -> Duration {
        Duration::from_secs(self.session.max_staleness_secs)
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "pogo", "mirror")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = MirrorConfig::default();
        assert_eq!(config.account(), "default");
        assert_eq!(config.max_staleness(), Duration::from_secs(300));
        assert!(config.inventory.warn_on_duplicates);
        assert_eq!(config.inventory.change_channel_capacity, 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = MirrorConfig::default();
        config.session.account = "  ".into();
        assert!(config.validate().unwrap_err().is_config_error());

        let mut config = MirrorConfig::default();
        config.inventory.change_channel_capacity = 0;
        assert!(config.validate().is_err());

        let mut config = MirrorConfig::default();
        config.location.file_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("POGO_ACCOUNT", "misty"),
            ("POGO_MAX_STALENESS_SECS", "60"),
            ("POGO_CHANGE_CHANNEL_CAPACITY", "not-a-number"),
            ("POGO_CACHE_DIR", "/tmp/pogo"),
        ]
        .into_iter()
        .collect();

        let mut config = MirrorConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.account(), "misty");
        assert_eq!(config.session.max_staleness_secs, 60);
        assert_eq!(config.inventory.change_channel_capacity, 256);
        assert_eq!(
            config.location.location_path(),
            PathBuf::from("/tmp/pogo/location.json")
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: MirrorConfig = toml::from_str(
            r#"
            [session]
            account = "brock"

            [inventory]
            warn_on_duplicates = false
            "#,
        )
        .unwrap();

        assert_eq!(config.account(), "brock");
        assert_eq!(config.session.max_staleness_secs, 300);
        assert!(!config.inventory.warn_on_duplicates);
        assert_eq!(config.location.file_name, "location.json");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("mirror.toml");

        let mut config = MirrorConfig::default();
        config.session.account = "ash".into();
        config.location.cache_dir = Some(dir.path().to_path_buf());
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[session]"));
        assert!(contents.contains("[inventory]"));

        let loaded: MirrorConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.account(), "ash");
        assert_eq!(loaded.location.cache_dir.as_deref(), Some(dir.path()));
    }
}
