//! User configuration and preferences

use crate::error::{Result, SortError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    /// Whether the welcome dialog has been shown
    pub welcome_shown: bool,
    /// Select the next image after a resolution or a successful commit
    pub auto_advance: bool,
}

impl UserConfig {
    /// Get the config file path (~/.config/digisort/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("digisort").join("config.json"))
    }

    /// Load config from `path`, or the default if the file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|e| {
            SortError::ConfigError(format!("Failed to read config file: {}", e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| SortError::ConfigError(format!("Failed to parse config file: {}", e)))
    }

    /// Save config to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                SortError::ConfigError(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            SortError::ConfigError(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, contents).map_err(|e| {
            SortError::ConfigError(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }
}

/// Shared preference cell.
///
/// Writes are persisted and pushed to every subscriber. Another process
/// editing the same file is picked up by [`Preferences::sync_from_disk`].
#[derive(Debug)]
pub struct Preferences {
    tx: watch::Sender<UserConfig>,
    path: Option<PathBuf>,
    last_modified: Option<SystemTime>,
}

impl Preferences {
    /// Loads from the default config location.
    pub fn load() -> Result<Self> {
        let path = UserConfig::config_path().ok_or_else(|| {
            SortError::ConfigError("Could not determine config directory".to_string())
        })?;
        Self::load_from(path)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let config = UserConfig::load_from(&path)?;
        let last_modified = modified_time(&path);
        let (tx, _) = watch::channel(config);
        Ok(Self {
            tx,
            path: Some(path),
            last_modified,
        })
    }

    /// In-memory only; nothing is written.
    pub fn ephemeral(config: UserConfig) -> Self {
        let (tx, _) = watch::channel(config);
        Self {
            tx,
            path: None,
            last_modified: None,
        }
    }

    pub fn get(&self) -> UserConfig {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UserConfig> {
        self.tx.subscribe()
    }

    pub fn set_auto_advance(&mut self, enabled: bool) -> Result<()> {
        self.update(|c| c.auto_advance = enabled)
    }

    pub fn mark_welcome_shown(&mut self) -> Result<()> {
        self.update(|c| c.welcome_shown = true)
    }

    fn update(&mut self, f: impl FnOnce(&mut UserConfig)) -> Result<()> {
        let mut next = self.get();
        f(&mut next);
        if let Some(path) = &self.path {
            next.save_to(path)?;
            self.last_modified = modified_time(path);
        }
        self.tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        Ok(())
    }

    /// Reloads the file if its modification time moved. Returns whether subscribers were notified.
    pub fn sync_from_disk(&mut self) -> Result<bool> {
        let Some(path) = self.path.clone() else {
            return Ok(false);
        };
        let modified = modified_time(&path);
        if modified == self.last_modified {
            return Ok(false);
        }
        self.last_modified = modified;

        let loaded = UserConfig::load_from(&path)?;
        Ok(self.tx.send_if_modified(|current| {
            if *current == loaded {
                false
            } else {
                *current = loaded;
                true
            }
        }))
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert!(!config.welcome_shown);
        assert!(!config.auto_advance);
    }

    #[test]
    fn test_config_serialization() {
        let config = UserConfig {
            welcome_shown: true,
            auto_advance: true,
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: UserConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, config);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: UserConfig = serde_json::from_str(r#"{"welcome_shown":true}"#).unwrap();
        assert!(config.welcome_shown);
        assert!(!config.auto_advance);
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::load_from(&temp_dir.path().join("config.json")).unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ nope").unwrap();
        assert!(matches!(
            UserConfig::load_from(&path),
            Err(SortError::ConfigError(_))
        ));
    }

    mod preferences_tests {
        use super::*;

        #[test]
        fn test_set_persists_and_notifies() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("nested").join("config.json");
            let mut prefs = Preferences::load_from(path.clone()).unwrap();
            let mut rx = prefs.subscribe();

            prefs.set_auto_advance(true).unwrap();

            assert!(rx.has_changed().unwrap());
            assert!(rx.borrow_and_update().auto_advance);
            assert!(UserConfig::load_from(&path).unwrap().auto_advance);
        }

        #[test]
        fn test_unchanged_value_does_not_notify() {
            let mut prefs = Preferences::ephemeral(UserConfig::default());
            let rx = prefs.subscribe();
            prefs.set_auto_advance(false).unwrap();
            assert!(!rx.has_changed().unwrap());
        }

        #[test]
        fn test_sync_picks_up_external_edit() {
            let temp_dir = TempDir::new().unwrap();
            let path = temp_dir.path().join("config.json");
            let mut prefs = Preferences::load_from(path.clone()).unwrap();
            let rx = prefs.subscribe();

            UserConfig {
                welcome_shown: false,
                auto_advance: true,
            }
            .save_to(&path)
            .unwrap();

            assert!(prefs.sync_from_disk().unwrap());
            assert!(rx.has_changed().unwrap());
            assert!(prefs.get().auto_advance);

            // No further change on disk
            assert!(!prefs.sync_from_disk().unwrap());
        }

        #[test]
        fn test_ephemeral_sync_is_noop() {
            let mut prefs = Preferences::ephemeral(UserConfig::default());
            assert!(!prefs.sync_from_disk().unwrap());
            prefs.mark_welcome_shown().unwrap();
            assert!(prefs.get().welcome_shown);
        }
    }
}
