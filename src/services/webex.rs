// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Webex API client.
//!
//! Handles:
//! - Refresh-token redemption at the token endpoint
//! - Device listing filtered by tag
//! - 401 detection (token likely expired)

use crate::error::SyncError;
use crate::models::DirectoryListing;
use serde::Deserialize;
use std::time::Duration;

/// Webex API client.
#[derive(Clone)]
pub struct WebexClient {
    http: reqwest::Client,
    base_url: String,
}

impl WebexClient {
    /// Create a client rooted at `base_url` (e.g. `https://webexapis.com/v1`).
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::Internal(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Redeem a refresh token for a new access token.
    pub async fn refresh_token(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, SyncError> {
        let url = format!("{}/access_token", self.base_url);

        let body = serde_json::json!({
            "grant_type": "refresh_token",
            "client_id": client_id,
            "client_secret": client_secret,
            "refresh_token": refresh_token,
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SyncError::Auth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Auth(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Auth(format!("Failed to parse token response: {}", e)))
    }

    /// List devices carrying `tag`.
    pub async fn list_devices(
        &self,
        access_token: &str,
        tag: &str,
    ) -> Result<DirectoryListing, SyncError> {
        let url = format!("{}/devices", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("tag", tag)])
            .send()
            .await
            .map_err(|e| SyncError::Directory(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SyncError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Unauthorized - token may be expired
            if status.as_u16() == 401 {
                return Err(SyncError::Unauthorized);
            }

            return Err(SyncError::Directory(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| SyncError::Directory(format!("JSON parse error: {}", e)))
    }
}

/// Token endpoint response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
}
