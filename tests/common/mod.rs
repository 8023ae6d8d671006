// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use favorites_sync::config::{AuthConfig, Config};
use favorites_sync::error::{Result, SyncError};
use favorites_sync::models::{LocalFolder, NewContact};
use favorites_sync::services::{DirectoryClient, FavoritesSynchronizer, TokenManager, WebexClient};
use favorites_sync::store::{CredentialStore, JsonPhonebook, Phonebook, PhonebookSnapshot};
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Workspace reference as the directory returns it.
#[allow(dead_code)]
pub fn workspace_id(contact_id: &str) -> String {
    BASE64.encode(format!("ciscospark://us/PLACE/{}", contact_id))
}

/// Directory item JSON.
#[allow(dead_code)]
pub fn device(name: &str, contact_id: &str) -> serde_json::Value {
    json!({
        "id": BASE64.encode(format!("ciscospark://us/DEVICE/{}", name)),
        "displayName": name,
        "workspaceId": workspace_id(contact_id),
        "product": "Cisco Room Kit",
    })
}

/// Webex client pointed at the mock server.
#[allow(dead_code)]
pub fn webex_client(server: &MockServer) -> WebexClient {
    WebexClient::new(server.uri(), Duration::from_secs(5)).expect("client should build")
}

/// Token manager using the test OAuth credentials.
#[allow(dead_code)]
pub fn token_manager(server: &MockServer, store: Arc<dyn CredentialStore>) -> TokenManager {
    TokenManager::new(webex_client(server), Config::test_default().auth, store)
}

/// Token manager using a static bot token.
#[allow(dead_code)]
pub fn bot_token_manager(server: &MockServer, store: Arc<dyn CredentialStore>) -> TokenManager {
    TokenManager::new(
        webex_client(server),
        AuthConfig::BotToken("bot-token".to_string()),
        store,
    )
}

/// Synchronizer over the mock server.
#[allow(dead_code)]
pub fn synchronizer(
    server: &MockServer,
    tags: &[&str],
    store: Arc<dyn CredentialStore>,
    phonebook: Arc<dyn Phonebook>,
) -> FavoritesSynchronizer {
    FavoritesSynchronizer::new(
        tags.iter().map(|t| t.to_string()).collect(),
        token_manager(server, store),
        DirectoryClient::new(webex_client(server)),
        phonebook,
    )
}

/// Expect token redemption with the test credentials.
#[allow(dead_code)]
pub fn token_endpoint(access_token: &str, expires_in: i64) -> Mock {
    Mock::given(method("POST"))
        .and(path("/access_token"))
        .and(body_json(json!({
            "grant_type": "refresh_token",
            "client_id": "test_client_id",
            "client_secret": "test_secret",
            "refresh_token": "test_refresh_token",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": access_token,
            "expires_in": expires_in,
            "refresh_token": "test_refresh_token",
            "refresh_token_expires_in": 7_776_000,
        })))
}

/// Devices listing for `tag` when called with `access_token`.
#[allow(dead_code)]
pub fn devices_endpoint(tag: &str, access_token: &str, items: Vec<serde_json::Value>) -> Mock {
    Mock::given(method("GET"))
        .and(path("/devices"))
        .and(query_param("tag", tag))
        .and(header("authorization", format!("Bearer {}", access_token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
}

/// A phonebook operation as seen by [`RecordingPhonebook`].
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhonebookOp {
    Search,
    DeleteFolder(String),
    AddFolder(String),
    AddContact { name: String, number: String },
}

/// In-memory phonebook that records every call and can inject failures.
#[allow(dead_code)]
pub struct RecordingPhonebook {
    inner: JsonPhonebook,
    ops: Mutex<Vec<PhonebookOp>>,
    fail_search: bool,
    fail_contact_named: Option<String>,
}

#[allow(dead_code)]
impl RecordingPhonebook {
    pub fn new() -> Self {
        Self {
            inner: JsonPhonebook::in_memory(),
            ops: Mutex::new(Vec::new()),
            fail_search: false,
            fail_contact_named: None,
        }
    }

    pub fn failing_search() -> Self {
        Self {
            fail_search: true,
            ..Self::new()
        }
    }

    pub fn failing_contact(name: &str) -> Self {
        Self {
            fail_contact_named: Some(name.to_string()),
            ..Self::new()
        }
    }

    /// Seed a folder without recording it.
    pub async fn seed_folder(&self, name: &str) -> String {
        self.inner.add_folder(name).await.unwrap()
    }

    pub fn ops(&self) -> Vec<PhonebookOp> {
        self.ops.lock().unwrap().clone()
    }

    pub fn clear_ops(&self) {
        self.ops.lock().unwrap().clear();
    }

    pub async fn snapshot(&self) -> PhonebookSnapshot {
        self.inner.snapshot().await
    }

    /// Folder names with their (name, number) contacts, ignoring ids.
    pub async fn layout(&self) -> Vec<(String, Vec<(String, String)>)> {
        let snapshot = self.snapshot().await;
        snapshot
            .folders
            .iter()
            .map(|f| {
                let contacts = snapshot
                    .contacts_in(&f.folder_id)
                    .into_iter()
                    .map(|c| (c.name.clone(), c.number.clone()))
                    .collect();
                (f.name.clone(), contacts)
            })
            .collect()
    }

    fn record(&self, op: PhonebookOp) {
        self.ops.lock().unwrap().push(op);
    }
}

#[async_trait]
impl Phonebook for RecordingPhonebook {
    async fn search_folders(&self) -> Result<Vec<LocalFolder>> {
        self.record(PhonebookOp::Search);
        if self.fail_search {
            return Err(SyncError::Rebuild("search failed".to_string()));
        }
        self.inner.search_folders().await
    }

    async fn delete_folder(&self, folder_id: &str) -> Result<()> {
        self.record(PhonebookOp::DeleteFolder(folder_id.to_string()));
        self.inner.delete_folder(folder_id).await
    }

    async fn add_folder(&self, name: &str) -> Result<String> {
        self.record(PhonebookOp::AddFolder(name.to_string()));
        self.inner.add_folder(name).await
    }

    async fn add_contact(&self, contact: &NewContact) -> Result<()> {
        self.record(PhonebookOp::AddContact {
            name: contact.name.clone(),
            number: contact.number.clone(),
        });
        if self.fail_contact_named.as_deref() == Some(contact.name.as_str()) {
            return Err(SyncError::Rebuild("contact add failed".to_string()));
        }
        self.inner.add_contact(contact).await
    }
}
