//! Directory-backed CreatorRepository implementation.
//!
//! Directory structure (one creator = one file):
//! ```text
//! base_dir/
//! └── creators/
//!     ├── <uuid-1>.toml
//!     ├── <uuid-2>.toml
//!     └── <uuid-3>.toml
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use codeloom_core::creator::{Creator, CreatorRepository, default_creators};
use codeloom_core::{LoomError, Result};

pub struct TomlDirCreatorRepository {
    dir: PathBuf,
}

impl TomlDirCreatorRepository {
    /// Repository under the default location
    /// (`<config-dir>/codeloom/creators/`).
    pub fn new_default() -> Result<Self> {
        let dir = dirs::config_dir()
            .ok_or_else(|| LoomError::config("cannot resolve a config directory"))?;
        Ok(Self::with_dir(dir.join("codeloom").join("creators")))
    }

    /// Repository under a custom directory (for testing).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.toml"))
    }

    async fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Seeds the built-in presets when the repository is empty.
    pub async fn ensure_seeded(&self) -> Result<()> {
        if self.get_all().await?.is_empty() {
            for creator in default_creators() {
                self.save(&creator).await?;
            }
        }
        Ok(())
    }

    async fn read_creator(path: &Path) -> Result<Creator> {
        let raw = fs::read_to_string(path).await?;
        Ok(toml::from_str(&raw)?)
    }
}

#[async_trait]
impl CreatorRepository for TomlDirCreatorRepository {
    async fn get_all(&self) -> Result<Vec<Creator>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut creators = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            match Self::read_creator(&path).await {
                Ok(creator) => creators.push(creator),
                Err(err) => {
                    tracing::warn!("[CreatorRepository] skipping unreadable {path:?}: {err}")
                }
            }
        }
        creators.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(creators)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Creator>> {
        let path = self.file_path(id);
        match fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(toml::from_str(&raw)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, creator: &Creator) -> Result<()> {
        self.ensure_dir().await?;
        let rendered = toml::to_string_pretty(creator)?;
        let path = self.file_path(&creator.id);
        let tmp = path.with_extension("toml.tmp");
        fs::write(&tmp, rendered).await?;
        fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        match fs::remove_file(self.file_path(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(LoomError::not_found("creator", id))
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> (tempfile::TempDir, TomlDirCreatorRepository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = TomlDirCreatorRepository::with_dir(dir.path().join("creators"));
        (dir, repo)
    }

    #[tokio::test]
    async fn test_empty_repository() {
        let (_guard, repo) = repo();
        assert!(repo.get_all().await.unwrap().is_empty());
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_find_delete() {
        let (_guard, repo) = repo();
        let creator = Creator::new("Pixel", "game designer", "retro palette");

        repo.save(&creator).await.unwrap();
        let found = repo.find_by_id(&creator.id).await.unwrap();
        assert_eq!(found, Some(creator.clone()));

        repo.delete(&creator.id).await.unwrap();
        assert!(repo.find_by_id(&creator.id).await.unwrap().is_none());
        assert!(repo.delete(&creator.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_seeding_is_idempotent() {
        let (_guard, repo) = repo();
        repo.ensure_seeded().await.unwrap();
        let first = repo.get_all().await.unwrap();
        assert!(!first.is_empty());

        repo.ensure_seeded().await.unwrap();
        assert_eq!(repo.get_all().await.unwrap().len(), first.len());
    }
}
