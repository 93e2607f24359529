//! Durable client storage.
//!
//! A small key/value store that survives restarts, used for the persisted
//! session. Values are JSON strings; keys are fixed names.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use attendance_core::error::{AppError, ErrorKind};
use attendance_core::result::AppResult;

/// Key/value storage that outlives the process.
#[async_trait]
pub trait DurableStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Read a value. Returns `None` if the key was never written or was removed.
    async fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Write a value. After this returns, a `get` sees either the whole new
    /// value or (on error) the whole old one.
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Remove a value. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> AppResult<()>;
}

/// File-backed storage: one `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    /// Create a store rooted at `directory`. The directory is created on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(AppError::storage(format!("Invalid storage key '{key}'")));
        }
        Ok(self.directory.join(format!("{key}.json")))
    }
}

#[async_trait]
impl DurableStorage for FileStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        String::from_utf8(bytes).map(Some).map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Record '{key}' is not valid UTF-8"),
                e,
            )
        })
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::create_dir_all(&self.directory).await?;

        // Rename is atomic on the same filesystem, so readers never see a half-written record.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!(key, path = %path.display(), "stored record");
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Process-local storage, for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<R>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> R) -> R {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut entries)
    }
}

#[async_trait]
impl DurableStorage for MemoryStorage {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.with_entries(|entries| entries.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.with_entries(|entries| entries.insert(key.to_string(), value.to_string()));
        Ok(())
    }

    async fn remove(&self, key: &str) -> AppResult<()> {
        self.with_entries(|entries| entries.remove(key));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_storage_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));

        assert_eq!(storage.get("attendance_session").await.unwrap(), None);

        storage.set("attendance_session", r#"{"a":1}"#).await.unwrap();
        assert_eq!(
            storage.get("attendance_session").await.unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
        assert!(dir.path().join("nested/attendance_session.json").exists());
        assert!(!dir.path().join("nested/attendance_session.json.tmp").exists());

        storage.remove("attendance_session").await.unwrap();
        assert_eq!(storage.get("attendance_session").await.unwrap(), None);
        storage.remove("attendance_session").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_storage_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(storage.set("../escape", "x").await.is_err());
    }

    #[tokio::test]
    async fn test_file_storage_reports_non_utf8_as_serialization() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("attendance_session.json"), [0xff, 0xfe]).unwrap();
        let storage = FileStorage::new(dir.path());

        let err = storage.get("attendance_session").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Serialization);
    }

    #[tokio::test]
    async fn test_memory_storage_overwrites() {
        let storage = MemoryStorage::new();
        storage.set("k", "1").await.unwrap();
        storage.set("k", "2").await.unwrap();
        assert_eq!(storage.get("k").await.unwrap().as_deref(), Some("2"));
    }
}
