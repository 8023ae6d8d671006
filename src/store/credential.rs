// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistent credential slot.
//!
//! The slot holds a single opaque string. The token manager reads it once at
//! startup and writes it after every successful redemption.

use crate::error::{Result, SyncError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A single string-valued storage location.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the slot. An empty slot is `Ok(None)`.
    async fn load(&self) -> Result<Option<String>>;

    /// Overwrite the slot.
    async fn save(&self, blob: &str) -> Result<()>;
}

/// Slot backed by a single file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn load(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) if contents.trim().is_empty() => Ok(None),
            Ok(contents) => Ok(Some(contents.trim().to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SyncError::Storage(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }

    async fn save(&self, blob: &str) -> Result<()> {
        // Write next to the target and rename so a crash never leaves half a blob.
        let tmp = super::temp_path(&self.path);
        tokio::fs::write(&tmp, blob).await.map_err(|e| {
            SyncError::Storage(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| {
            SyncError::Storage(format!("Failed to replace {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

/// In-memory slot for tests and dry runs.
#[derive(Debug)]
pub struct MemoryCredentialStore {
    value: Mutex<Option<String>>,
    writable: bool,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            value: Mutex::new(None),
            writable: true,
        }
    }

    /// Slot pre-populated with `blob`.
    pub fn with_value(blob: impl Into<String>) -> Self {
        Self {
            value: Mutex::new(Some(blob.into())),
            writable: true,
        }
    }

    /// Slot whose writes always fail.
    pub fn unwritable() -> Self {
        Self {
            value: Mutex::new(None),
            writable: false,
        }
    }

    /// Current contents of the slot.
    pub fn value(&self) -> Option<String> {
        self.value.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<String>> {
        Ok(self.value().filter(|v| !v.is_empty()))
    }

    async fn save(&self, blob: &str) -> Result<()> {
        if !self.writable {
            return Err(SyncError::Storage("Credential slot is read-only".to_string()));
        }
        let mut value = self
            .value
            .lock()
            .map_err(|_| SyncError::Storage("Credential slot lock poisoned".to_string()))?;
        *value = Some(blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("slot.txt"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("slot.txt"));

        store.save("eyJhY2Nlc3NUb2tlbiI6bnVsbH0=").await.unwrap();
        assert_eq!(
            store.load().await.unwrap().as_deref(),
            Some("eyJhY2Nlc3NUb2tlbiI6bnVsbH0=")
        );

        store.save("second").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("second"));
        assert!(!dir.path().join("slot.txt.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_blank_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slot.txt");
        std::fs::write(&path, "  \n").unwrap();
        assert_eq!(FileCredentialStore::new(path).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_file_store_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("missing").join("slot.txt"));
        assert!(matches!(
            store.save("blob").await,
            Err(SyncError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load().await.unwrap(), None);
        store.save("blob").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("blob"));

        let store = MemoryCredentialStore::unwritable();
        assert!(store.save("blob").await.is_err());
        assert_eq!(store.value(), None);
    }
}
