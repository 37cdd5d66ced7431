//! Model catalog discovery.
//!
//! The catalog is a `models.toml` file listing the models the UI can offer
//! for loading. Availability discovery stays thin by design: the runtime
//! itself decides whether a model actually loads.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use codeloom_core::{LoomError, ModelInfo, Result};

#[derive(Debug, Serialize, Deserialize, Default)]
struct CatalogFile {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

/// Loader for the model catalog.
pub struct ModelCatalog {
    path: PathBuf,
}

impl ModelCatalog {
    /// Catalog at the default location (`<config-dir>/codeloom/models.toml`).
    pub fn new_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| LoomError::config("cannot resolve a config directory"))?;
        Ok(Self::with_path(dir.join("codeloom").join("models.toml")))
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads all catalog entries; an absent file is an empty catalog.
    pub fn load(&self) -> Result<Vec<ModelInfo>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let parsed: CatalogFile = toml::from_str(&raw)?;
        Ok(parsed.models)
    }

    /// Finds one entry by id.
    pub fn find(&self, id: &str) -> Result<ModelInfo> {
        self.load()?
            .into_iter()
            .find(|m| m.id == id)
            .ok_or_else(|| LoomError::not_found("model", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[[models]]
id = "tiny-coder"
display_name = "Tiny Coder 1B"
path_or_url = "/models/tiny-coder.gguf"
context_window = 4096

[[models]]
id = "big-coder"
display_name = "Big Coder 7B"
path_or_url = "/models/big-coder.gguf"
"#;

    #[test]
    fn test_parse_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models.toml");
        std::fs::write(&path, SAMPLE).unwrap();

        let catalog = ModelCatalog::with_path(&path);
        let models = catalog.load().unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].context_window, 4096);
        // Defaulted context window.
        assert_eq!(models[1].context_window, 8192);
    }

    #[test]
    fn test_missing_catalog_is_empty() {
        let catalog = ModelCatalog::with_path("/nonexistent/models.toml");
        assert!(catalog.load().unwrap().is_empty());
    }

    #[test]
    fn test_find_unknown_model() {
        let catalog = ModelCatalog::with_path("/nonexistent/models.toml");
        let err = catalog.find("absent").unwrap_err();
        assert!(err.is_not_found());
    }
}
