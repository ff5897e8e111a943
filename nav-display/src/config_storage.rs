//! Configuration storage for display settings.
//!
//! All config is stored in ~/.nd_config/ by default.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::{ConfigResult, SymbologyConfig};

/// Configuration storage manager.
///
/// Manages loading and saving of display configuration files from a
/// centralized directory (defaults to ~/.nd_config/).
#[derive(Debug, Clone)]
pub struct ConfigStorage {
    /// Root directory for all configuration (e.g., ~/.nd_config)
    root_path: PathBuf,
}

impl ConfigStorage {
    /// Create a new config storage with default path (~/.nd_config)
    pub fn new() -> std::io::Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::NotFound, "HOME not set"))?;
        let root_path = PathBuf::from(home).join(".nd_config");
        Ok(Self { root_path })
    }

    /// Create a new config storage with custom root path
    pub fn with_path(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Get the root configuration path
    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    fn symbology_config_path(&self) -> PathBuf {
        self.root_path.join("symbology.json")
    }

    /// Get the symbology config.
    ///
    /// Returns None if no config exists.
    /// Returns Some(Err) if the file exists but cannot be loaded.
    pub fn get_symbology_config(&self) -> Option<ConfigResult<SymbologyConfig>> {
        let path = self.symbology_config_path();

        if !path.exists() {
            return None;
        }

        Some(SymbologyConfig::load_from_file(&path))
    }

    /// Stored config, or defaults when none is stored or it fails to load.
    pub fn load_or_default(&self) -> SymbologyConfig {
        match self.get_symbology_config() {
            None => {
                debug!(path = %self.root_path.display(), "no stored config, using defaults");
                SymbologyConfig::default()
            }
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                warn!("Failed to load stored config, using defaults: {e}");
                SymbologyConfig::default()
            }
        }
    }

    /// Save the symbology config.
    ///
    /// Creates the config directory if it doesn't exist.
    /// Returns the path where the config was saved.
    pub fn save_symbology_config(&self, config: &SymbologyConfig) -> ConfigResult<PathBuf> {
        config.validate()?;
        std::fs::create_dir_all(&self.root_path)?;

        let path = self.symbology_config_path();
        config.save_to_file(&path)?;
        Ok(path)
    }

    /// Delete the symbology config.
    ///
    /// Returns Ok(true) if the file was deleted, Ok(false) if it didn't exist.
    pub fn delete_symbology_config(&self) -> std::io::Result<bool> {
        let path = self.symbology_config_path();

        if !path.exists() {
            return Ok(false);
        }

        std::fs::remove_file(path)?;
        Ok(true)
    }
}

impl Default for ConfigStorage {
    fn default() -> Self {
        Self::new().unwrap_or_else(|_| Self::with_path(PathBuf::from(".nd_config")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigError, XtkValidityPolicy};
    use crate::modes::EfisSide;

    fn create_test_storage() -> (tempfile::TempDir, ConfigStorage) {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = ConfigStorage::with_path(temp_dir.path().join("nd_config"));
        (temp_dir, storage)
    }

    #[test]
    fn test_get_nonexistent_config() {
        let (_dir, storage) = create_test_storage();
        assert!(storage.get_symbology_config().is_none());
        assert_eq!(storage.load_or_default(), SymbologyConfig::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let (_dir, storage) = create_test_storage();

        let config = SymbologyConfig {
            display_index: 2,
            side: EfisSide::R,
            xtk_validity: XtkValidityPolicy::Always,
            ..Default::default()
        };
        let path = storage.save_symbology_config(&config).unwrap();
        assert!(path.ends_with("symbology.json"));

        let loaded = storage
            .get_symbology_config()
            .expect("Config should exist")
            .expect("Config should load successfully");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_save_rejects_invalid_config() {
        let (_dir, storage) = create_test_storage();
        let config = SymbologyConfig {
            display_index: 0,
            ..Default::default()
        };
        assert!(matches!(
            storage.save_symbology_config(&config),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(storage.get_symbology_config().is_none());
    }

    #[test]
    fn test_corrupt_config_falls_back_to_defaults() {
        let (_dir, storage) = create_test_storage();
        std::fs::create_dir_all(storage.root_path()).unwrap();
        std::fs::write(storage.root_path().join("symbology.json"), "[]").unwrap();

        assert!(matches!(storage.get_symbology_config(), Some(Err(_))));
        assert_eq!(storage.load_or_default(), SymbologyConfig::default());
    }

    #[test]
    fn test_delete_config() {
        let (_dir, storage) = create_test_storage();
        assert!(!storage.delete_symbology_config().unwrap());

        storage
            .save_symbology_config(&SymbologyConfig::default())
            .unwrap();
        assert!(storage.delete_symbology_config().unwrap());
        assert!(storage.get_symbology_config().is_none());
    }
}
