//! Filesystem-backed key-value store.
//!
//! Each key lives in its own file named by the SHA-256 of the key, so arbitrary
//! key strings map onto safe file names. The file holds the key next to the value
//! so [`KeyValueStore::keys`] can report original keys.

use crate::KeyValueStore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use uuid::Uuid;
use vignette_error::{StorageError, StorageErrorKind, StorageResult};

const ENTRY_EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    key: String,
    value: String,
}

/// Filesystem storage backend.
///
/// Layout: `{base_path}/{sha256(key)}.json`. Writes go to a temp file that is
/// then renamed over the entry.
#[derive(Debug, Clone)]
pub struct FileSystemStore {
    base_path: PathBuf,
}

impl FileSystemStore {
    /// Create a store rooted at `base_path`.
    ///
    /// Creates the directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Opened filesystem store");
        Ok(Self { base_path })
    }

    /// Root directory.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn compute_hash(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidKey(
                "key must not be empty".to_string(),
            )));
        }
        Ok(self
            .base_path
            .join(format!("{}.{}", Self::compute_hash(key), ENTRY_EXTENSION)))
    }

    async fn read_entry(path: &Path) -> StorageResult<Option<Entry>> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Read(format!(
                    "{}: {}",
                    path.display(),
                    e
                ))));
            }
        };
        serde_json::from_str(&raw).map(Some).map_err(|e| {
            StorageError::new(StorageErrorKind::Serialization(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })
    }
}

#[async_trait::async_trait]
impl KeyValueStore for FileSystemStore {
    #[tracing::instrument(skip(self))]
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.entry_path(key)?;
        Ok(Self::read_entry(&path).await?.map(|entry| entry.value))
    }

    #[tracing::instrument(skip(self, value), fields(size = value.len()))]
    async fn put(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        let entry = Entry {
            key: key.to_string(),
            value: value.to_string(),
        };
        let raw = serde_json::to_string(&entry)
            .map_err(|e| StorageError::new(StorageErrorKind::Serialization(e.to_string())))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&temp_path, raw).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, &path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Write(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::debug!(path = %path.display(), "Stored entry");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.entry_path(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Deleted entry");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::new(StorageErrorKind::Delete(format!(
                "{}: {}",
                path.display(),
                e
            )))),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn keys(&self) -> StorageResult<Vec<String>> {
        let mut dir = tokio::fs::read_dir(&self.base_path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::Read(format!(
                "{}: {}",
                self.base_path.display(),
                e
            )))
        })?;

        let mut keys = Vec::new();
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Read(e.to_string())))?
        {
            let path = item.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(ENTRY_EXTENSION) {
                continue;
            }
            if let Some(entry) = Self::read_entry(&path).await? {
                keys.push(entry.key);
            }
        }
        Ok(keys)
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
