//! Atomic TOML file operations.
//!
//! Thin layer for safe persistence of TOML configuration files: writes go
//! to a temp file in the same directory and are renamed into place, so a
//! crash mid-write never leaves a truncated file behind.

use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use codeloom_core::{LoomError, Result};

/// A typed handle to one TOML file persisted atomically.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize + DeserializeOwned> AtomicTomlFile<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file, returning `None` when it does not exist yet.
    pub fn load(&self) -> Result<Option<T>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(toml::from_str(&raw)?))
    }

    /// Serializes `value` and renames it into place atomically.
    pub fn save(&self, value: &T) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| LoomError::config(format!("no parent dir for {:?}", self.path)))?;
        fs::create_dir_all(parent)?;

        let rendered = toml::to_string_pretty(value)?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, rendered)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
