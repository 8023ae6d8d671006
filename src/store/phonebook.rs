// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local phonebook command interface.
//!
//! Mirrors the endpoint's phonebook commands: search folders, delete a
//! folder, add a folder (returns its id), add a contact into a folder.

use crate::error::{Result, SyncError};
use crate::models::{LocalContact, LocalFolder, NewContact};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Folder/contact CRUD on the local phonebook.
#[async_trait]
pub trait Phonebook: Send + Sync {
    /// List every entry of type folder.
    async fn search_folders(&self) -> Result<Vec<LocalFolder>>;

    /// Delete a folder and everything in it.
    async fn delete_folder(&self, folder_id: &str) -> Result<()>;

    /// Create a folder and return its assigned id.
    async fn add_folder(&self, name: &str) -> Result<String>;

    /// Add a contact under an existing folder.
    async fn add_contact(&self, contact: &NewContact) -> Result<()>;
}

/// Phonebook contents as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonebookSnapshot {
    pub folders: Vec<LocalFolder>,
    pub contacts: Vec<LocalContact>,
    #[serde(default)]
    next_id: u64,
}

impl PhonebookSnapshot {
    /// Contacts in `folder_id`, in insertion order.
    pub fn contacts_in(&self, folder_id: &str) -> Vec<&LocalContact> {
        self.contacts
            .iter()
            .filter(|c| c.folder_id == folder_id)
            .collect()
    }

    /// Folder with the given name, if any.
    pub fn folder_named(&self, name: &str) -> Option<&LocalFolder> {
        self.folders.iter().find(|f| f.name == name)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Phonebook kept as JSON, either in a file or only in memory.
pub struct JsonPhonebook {
    state: Mutex<PhonebookSnapshot>,
    path: Option<PathBuf>,
}

impl JsonPhonebook {
    /// Open a file-backed phonebook, starting empty if the file doesn't exist.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let state = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                SyncError::Rebuild(format!("Corrupt phonebook {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => PhonebookSnapshot::default(),
            Err(e) => {
                return Err(SyncError::Rebuild(format!(
                    "Failed to read phonebook {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        tracing::info!(
            path = %path.display(),
            folders = state.folders.len(),
            contacts = state.contacts.len(),
            "Phonebook opened"
        );

        Ok(Self {
            state: Mutex::new(state),
            path: Some(path),
        })
    }

    /// Create an in-memory phonebook (tests, dry runs).
    pub fn in_memory() -> Self {
        Self {
            state: Mutex::new(PhonebookSnapshot::default()),
            path: None,
        }
    }

    /// Copy of the current contents.
    pub async fn snapshot(&self) -> PhonebookSnapshot {
        self.state.lock().await.clone()
    }

    async fn persist(&self, state: &PhonebookSnapshot) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(state)
            .map_err(|e| SyncError::Rebuild(format!("Failed to serialize phonebook: {}", e)))?;
        let tmp = super::temp_path(path);
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| SyncError::Rebuild(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| SyncError::Rebuild(format!("Failed to replace {}: {}", path.display(), e)))
    }
}

#[async_trait]
impl Phonebook for JsonPhonebook {
    async fn search_folders(&self) -> Result<Vec<LocalFolder>> {
        Ok(self.state.lock().await.folders.clone())
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        let before = state.folders.len();
        state.folders.retain(|f| f.folder_id != folder_id);
        if state.folders.len() == before {
            return Err(SyncError::Rebuild(format!("No such folder: {}", folder_id)));
        }
        state.contacts.retain(|c| c.folder_id != folder_id);
        self.persist(&state).await
    }

    async fn add_folder(&self, name: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let folder_id = format!("localGroupId-{}", state.allocate_id());
        state.folders.push(LocalFolder {
            folder_id: folder_id.clone(),
            name: name.to_string(),
        });
        self.persist(&state).await?;
        Ok(folder_id)
    }

    async fn add_contact(&self, contact: &NewContact) -> Result<()> {
        let mut state = self.state.lock().await;
        if !state.folders.iter().any(|f| f.folder_id == contact.folder_id) {
            return Err(SyncError::Rebuild(format!(
                "No such folder: {}",
                contact.folder_id
            )));
        }
        let contact_id = format!("localContactId-{}", state.allocate_id());
        state.contacts.push(LocalContact {
            contact_id,
            folder_id: contact.folder_id.clone(),
            name: contact.name.clone(),
            number: contact.number.clone(),
            device: contact.device.to_string(),
            protocol: contact.protocol.to_string(),
            tag: contact.tag.to_string(),
        });
        self.persist(&state).await
    }
}
