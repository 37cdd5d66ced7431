//! Persisted user settings (selected model and backend).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use codeloom_core::{Backend, LoomError, Result};

use crate::atomic_toml::AtomicTomlFile;

/// Settings persisted across runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Id of the last selected model, if any.
    pub selected_model_id: Option<String>,
    /// Backend to load the model on.
    #[serde(default)]
    pub backend: Backend,
}

/// TOML-backed settings store under the user config directory.
pub struct SettingsStore {
    file: AtomicTomlFile<Settings>,
}

impl SettingsStore {
    /// Store at the default location (`<config-dir>/codeloom/settings.toml`).
    pub fn new_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| LoomError::config("cannot resolve a config directory"))?;
        Ok(Self::with_path(dir.join("codeloom").join("settings.toml")))
    }

    /// Store at a custom path (for testing).
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }

    /// Loads the settings, falling back to defaults when the file is
    /// missing.
    pub fn load(&self) -> Result<Settings> {
        Ok(self.file.load()?.unwrap_or_default())
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        self.file.save(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_settings_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::with_path(dir.path().join("settings.toml"));
        let settings = store.load().unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.backend, Backend::Cpu);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::with_path(dir.path().join("settings.toml"));
        let settings = Settings {
            selected_model_id: Some("tiny-coder".to_string()),
            backend: Backend::Gpu,
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load().unwrap(), settings);
    }
}
