// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Directory lookups: devices carrying a tag, normalized into contacts.

use crate::error::{Result, SyncError};
use crate::models::DeviceRecord;
use crate::services::WebexClient;

/// Turns the directory `devices` listing into [`DeviceRecord`]s.
#[derive(Clone)]
pub struct DirectoryClient {
    client: WebexClient,
}

impl DirectoryClient {
    pub fn new(client: WebexClient) -> Self {
        Self { client }
    }

    /// Fetch the devices tagged `tag`, in directory order.
    ///
    /// Items whose workspace reference is missing or undecodable are skipped.
    /// A 401 surfaces as [`SyncError::Unauthorized`].
    pub async fn fetch_devices(&self, access_token: &str, tag: &str) -> Result<Vec<DeviceRecord>> {
        tracing::debug!(tag, "Getting device list");
        let listing = self.client.list_devices(access_token, tag).await?;

        let total = listing.items.len();
        let records: Vec<DeviceRecord> = listing
            .items
            .iter()
            .filter_map(|item| {
                let record = item.to_record();
                if record.is_none() {
                    tracing::warn!(
                        tag,
                        device = %item.display_name,
                        "Device has no usable workspace id, skipping"
                    );
                }
                record
            })
            .collect();

        tracing::info!(tag, count = total, usable = records.len(), "Tag returned devices");
        Ok(records)
    }

    /// Like [`fetch_devices`](Self::fetch_devices) but never fails: errors are
    /// logged and the tag contributes no devices.
    pub async fn list_devices_for_tag(&self, access_token: &str, tag: &str) -> Vec<DeviceRecord> {
        match self.fetch_devices(access_token, tag).await {
            Ok(records) => records,
            Err(e) => {
                log_fetch_error(tag, &e);
                Vec::new()
            }
        }
    }
}

/// Log a failed tag lookup, flagging 401s as a likely expired token.
pub(crate) fn log_fetch_error(tag: &str, e: &SyncError) {
    if e.is_token_error() {
        tracing::warn!(tag, status = 401, "Access token may be expired");
    } else {
        tracing::error!(
            tag,
            error = %e,
            status = e.status_code(),
            "Error getting device list"
        );
    }
}
