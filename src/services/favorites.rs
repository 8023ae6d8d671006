// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites synchronization cycle.
//!
//! One cycle:
//! 1. Make sure we hold a usable access token
//! 2. Fetch the devices for every tag, sequentially and in configured order
//! 3. Delete every local phonebook folder
//! 4. Recreate one folder per non-empty tag and add its devices as favorites
//!
//! Local state is never diffed; each cycle replaces it wholesale. Nothing
//! here returns an error: failures are logged and summarized in the
//! [`CycleReport`] so the scheduler keeps ticking.

use crate::error::Result;
use crate::models::{Credential, CycleOutcome, CycleReport, FavoritesMap, NewContact, TagSummary};
use crate::services::directory::log_fetch_error;
use crate::services::{DirectoryClient, TokenManager};
use crate::store::Phonebook;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mirrors directory tags into local phonebook folders.
pub struct FavoritesSynchronizer {
    tags: Vec<String>,
    /// Held for the whole cycle; a second caller finding it locked skips.
    tokens: Mutex<TokenManager>,
    directory: DirectoryClient,
    phonebook: Arc<dyn Phonebook>,
}

impl FavoritesSynchronizer {
    pub fn new(
        tags: Vec<String>,
        tokens: TokenManager,
        directory: DirectoryClient,
        phonebook: Arc<dyn Phonebook>,
    ) -> Self {
        Self {
            tags,
            tokens: Mutex::new(tokens),
            directory,
            phonebook,
        }
    }

    /// Load the persisted credential. Call once at startup.
    pub async fn restore_credential(&self) {
        self.tokens.lock().await.restore().await;
    }

    /// Copy of the credential currently held.
    pub async fn credential(&self) -> Credential {
        self.tokens.lock().await.credential().clone()
    }

    /// Run one full cycle.
    pub async fn run_cycle(&self) -> CycleReport {
        let mut report = CycleReport::new(Utc::now());

        let Ok(mut tokens) = self.tokens.try_lock() else {
            tracing::warn!("Previous cycle still running, skipping this one");
            return report.finish(CycleOutcome::Skipped);
        };

        if self.tags.is_empty() {
            tracing::info!("No favorite tags configured, nothing to do");
            return report.finish(CycleOutcome::NoTags);
        }

        tracing::info!(tags = self.tags.len(), "Updating favorites");

        let token = match tokens.ensure_valid_token().await {
            Ok(token) => token,
            Err(e) => match tokens.current_token() {
                // Still inside the refresh margin, so usually still accepted
                Some(previous) => {
                    tracing::warn!(error = %e, "Continuing with previous access token");
                    previous.to_string()
                }
                None => {
                    tracing::error!(error = %e, "No access token available, skipping update");
                    return report.finish(CycleOutcome::Aborted(e.to_string()));
                }
            },
        };

        let favorites = self.fetch_favorites(&mut tokens, token).await;
        report.tags = favorites
            .iter()
            .map(|(tag, devices)| TagSummary {
                tag: tag.clone(),
                devices: devices.len(),
            })
            .collect();

        if let Err(e) = self.delete_all_folders(&mut report).await {
            tracing::error!(error = %e, "Failed to list local folders, leaving phonebook as is");
            return report.finish(CycleOutcome::Aborted(e.to_string()));
        }

        self.add_favorites(&favorites, &mut report).await;

        let report = report.finish(CycleOutcome::Completed);
        tracing::info!(
            folders = report.folders_created,
            contacts = report.contacts_added,
            failures = report.rebuild_failures,
            "Favorites updated"
        );
        report
    }

    /// Fetch every tag in order. A 401 triggers at most one forced redemption
    /// per cycle, after which that tag is fetched once more.
    async fn fetch_favorites(&self, tokens: &mut TokenManager, mut token: String) -> FavoritesMap {
        let mut refreshed = false;
        let mut favorites = Vec::with_capacity(self.tags.len());

        for tag in &self.tags {
            let devices = match self.directory.fetch_devices(&token, tag).await {
                Ok(devices) => devices,
                Err(e) if e.is_token_error() && !refreshed => {
                    log_fetch_error(tag, &e);
                    refreshed = true;
                    match tokens.force_refresh().await {
                        Ok(new_token) => {
                            token = new_token;
                            self.directory.list_devices_for_tag(&token, tag).await
                        }
                        Err(e) => {
                            tracing::error!(tag = %tag, error = %e, "Refresh after 401 failed");
                            Vec::new()
                        }
                    }
                }
                Err(e) => {
                    log_fetch_error(tag, &e);
                    Vec::new()
                }
            };
            favorites.push((tag.clone(), devices));
        }

        favorites
    }

    /// Delete every folder in the local phonebook, ours or not.
    async fn delete_all_folders(&self, report: &mut CycleReport) -> Result<()> {
        let folders = self.phonebook.search_folders().await?;
        if folders.is_empty() {
            tracing::debug!("No local folders to delete");
            return Ok(());
        }

        tracing::info!(count = folders.len(), "Deleting all folders");
        for folder in folders {
            match self.phonebook.delete_folder(&folder.folder_id).await {
                Ok(()) => report.folders_deleted += 1,
                Err(e) => {
                    tracing::warn!(
                        folder_id = %folder.folder_id,
                        name = %folder.name,
                        error = %e,
                        "Failed to delete folder"
                    );
                    report.rebuild_failures += 1;
                }
            }
        }
        Ok(())
    }

    /// Create a folder per non-empty tag and add its devices, awaiting each add.
    async fn add_favorites(&self, favorites: &FavoritesMap, report: &mut CycleReport) {
        for (tag, devices) in favorites {
            if devices.is_empty() {
                tracing::info!(tag = %tag, "No favorites for tag, folder will not be added");
                continue;
            }

            let folder_id = match self.phonebook.add_folder(tag).await {
                Ok(folder_id) => folder_id,
                Err(e) => {
                    tracing::error!(tag = %tag, error = %e, "Failed to create folder");
                    report.rebuild_failures += 1;
                    continue;
                }
            };
            report.folders_created += 1;

            tracing::info!(
                tag = %tag,
                count = devices.len(),
                folder_id = %folder_id,
                "Adding favorites to folder"
            );
            for device in devices {
                let contact = NewContact::favorite(&folder_id, &device.name, &device.contact_id);
                match self.phonebook.add_contact(&contact).await {
                    Ok(()) => report.contacts_added += 1,
                    Err(e) => {
                        tracing::warn!(
                            tag = %tag,
                            name = %device.name,
                            error = %e,
                            "Failed to add favorite"
                        );
                        report.rebuild_failures += 1;
                    }
                }
            }
        }
    }
}
