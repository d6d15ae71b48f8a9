//! Persistence for calculator settings
//!
//! The calculator talks to a [`SettingsStore`] so that it can be driven from
//! a JSON file on disk, from memory, or from a mock in tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::config::{default_settings_path, CalculatorSettings, ConfigError};

/// Load and save [`CalculatorSettings`]
pub trait SettingsStore: Send + Sync {
    /// Load the stored settings. A store with nothing saved yields the defaults.
    fn load(&self) -> Result<CalculatorSettings, ConfigError>;

    /// Persist `config`
    fn save(&self, config: &CalculatorSettings) -> Result<(), ConfigError>;
}

/// Settings kept as pretty-printed JSON in a single file
#[derive(Debug)]
pub struct JsonSettingsStore {
    /// Path to the settings file
    path: PathBuf,
    /// When the settings were last written by this store
    last_save: Mutex<Option<DateTime<Utc>>>,
}

impl Default for JsonSettingsStore {
    fn default() -> Self {
        Self::new(default_settings_path())
    }
}

impl JsonSettingsStore {
    /// Create a store backed by `path`
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            last_save: Mutex::new(None),
        }
    }

    /// Path to the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if a settings file exists
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// When this store last saved, if it has
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_save.lock().ok().and_then(|guard| *guard)
    }
}

impl SettingsStore for JsonSettingsStore {
    fn load(&self) -> Result<CalculatorSettings, ConfigError> {
        CalculatorSettings::load_from_path(&self.path)
    }

    fn save(&self, config: &CalculatorSettings) -> Result<(), ConfigError> {
        config.save_to_path(&self.path)?;
        if let Ok(mut last_save) = self.last_save.lock() {
            *last_save = Some(Utc::now());
        }
        Ok(())
    }
}

/// Settings kept in memory only
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    config: Mutex<Option<CalculatorSettings>>,
}

impl MemorySettingsStore {
    /// Create a store that starts out holding `config`
    pub fn with_config(config: CalculatorSettings) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }

    /// The most recently saved settings
    pub fn snapshot(&self) -> Option<CalculatorSettings> {
        self.config.lock().ok().and_then(|guard| guard.clone())
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<CalculatorSettings, ConfigError> {
        Ok(self.snapshot().unwrap_or_default())
    }

    fn save(&self, config: &CalculatorSettings) -> Result<(), ConfigError> {
        let mut guard = self
            .config
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "settings lock poisoned"))?;
        *guard = Some(config.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battery::BatteryProfile;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempdir().unwrap();
        let store = JsonSettingsStore::new(dir.path().join("settings.json"));
        assert!(!store.exists());
        assert!(store.last_saved().is_none());

        let config = CalculatorSettings {
            profile: BatteryProfile::V60,
            controller_cutoff: 52.0,
            ..CalculatorSettings::default()
        };
        store.save(&config).unwrap();
        assert!(store.exists());
        assert!(store.last_saved().is_some());

        let loaded = store.load().unwrap();
        assert_eq!(loaded.profile, BatteryProfile::V60);
        assert_eq!(loaded.controller_cutoff, 52.0);
    }

    #[test]
    fn test_json_store_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let store = JsonSettingsStore::new(&path);
        assert!(matches!(store.load(), Err(ConfigError::Serialization(_))));
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySettingsStore::default();
        assert_eq!(store.load().unwrap().profile, BatteryProfile::V72);

        let config = CalculatorSettings {
            profile: BatteryProfile::V36,
            ..CalculatorSettings::default()
        };
        store.save(&config).unwrap();
        assert_eq!(store.snapshot().map(|c| c.profile), Some(BatteryProfile::V36));
    }
}
