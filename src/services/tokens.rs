// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token lifecycle.
//!
//! The manager owns the only copy of the in-memory [`Credential`]. It is
//! restored from the credential slot once at startup and rewritten after every
//! successful redemption. Redemption happens whenever the token is absent or
//! expires within [`TOKEN_REFRESH_MARGIN_SECS`]; there is no retry loop, a
//! failed redemption is simply tried again on the next cycle.
//!
//! [`TOKEN_REFRESH_MARGIN_SECS`]: crate::models::credential::TOKEN_REFRESH_MARGIN_SECS

use crate::config::AuthConfig;
use crate::error::{Result, SyncError};
use crate::models::Credential;
use crate::services::WebexClient;
use crate::store::CredentialStore;
use crate::time_utils::{format_utc_rfc3339, seconds_until};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Owns the bearer token used for directory queries.
pub struct TokenManager {
    client: WebexClient,
    auth: AuthConfig,
    store: Arc<dyn CredentialStore>,
    credential: Credential,
}

impl TokenManager {
    /// Create a manager with an empty credential. Call [`restore`](Self::restore)
    /// once before the first cycle.
    pub fn new(client: WebexClient, auth: AuthConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self {
            client,
            auth,
            store,
            credential: Credential::default(),
        }
    }

    /// Current in-memory credential.
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Adopt the persisted credential if there is a readable one.
    ///
    /// Never fails: a missing, unreadable or unparseable slot leaves the
    /// credential empty so the first cycle redeems a fresh token.
    pub async fn restore(&mut self) {
        if matches!(self.auth, AuthConfig::BotToken(_)) {
            tracing::debug!("Using static bot token, nothing to restore");
            return;
        }

        let blob = match self.store.load().await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                tracing::info!("No stored access token");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored access token, ignoring");
                return;
            }
        };

        match Credential::decode(&blob) {
            Ok(credential) => {
                let expires_at = credential.expires_at.map(format_utc_rfc3339);
                tracing::info!(expires_at = expires_at.as_deref(), "Access token restored");
                self.credential = credential;
            }
            Err(e) => tracing::warn!(error = %e, "Error parsing stored access token, ignoring"),
        }
    }

    /// Returns true if a redemption is needed before the token can be used.
    pub fn needs_refresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.auth {
            AuthConfig::BotToken(_) => false,
            AuthConfig::OAuth { .. } => !self.credential.is_valid_at(now),
        }
    }

    /// Best token currently held, even if it is inside the refresh margin.
    pub fn current_token(&self) -> Option<&str> {
        match &self.auth {
            AuthConfig::BotToken(token) => Some(token),
            AuthConfig::OAuth { .. } => self.credential.access_token.as_deref(),
        }
    }

    /// Return a usable access token, redeeming the refresh token if needed.
    pub async fn ensure_valid_token(&mut self) -> Result<String> {
        if let AuthConfig::BotToken(token) = &self.auth {
            return Ok(token.clone());
        }

        let now = Utc::now();
        if self.credential.access_token.is_none() {
            tracing::info!("No access token, generating");
        } else if self.needs_refresh_at(now) {
            tracing::info!("Access token expired or expiring soon, generating new one");
        } else {
            let remaining_secs = self.credential.expires_at.map(|at| seconds_until(at, now));
            tracing::debug!(remaining_secs, "Access token valid");
            return self
                .credential
                .access_token
                .clone()
                .ok_or_else(|| SyncError::Auth("Access token missing".to_string()));
        }

        self.redeem().await
    }

    /// Redeem a new access token regardless of the current expiry.
    ///
    /// Used when the directory rejects a token the manager still considered valid.
    pub async fn force_refresh(&mut self) -> Result<String> {
        if matches!(self.auth, AuthConfig::BotToken(_)) {
            return Err(SyncError::Auth(
                "Static bot token was rejected and cannot be refreshed".to_string(),
            ));
        }
        tracing::info!("Forcing access token refresh");
        self.redeem().await
    }

    async fn redeem(&mut self) -> Result<String> {
        let AuthConfig::OAuth {
            client_id,
            client_secret,
            refresh_token,
        } = &self.auth
        else {
            return Err(SyncError::Auth("No refresh token configured".to_string()));
        };

        let response = match self
            .client
            .refresh_token(client_id, client_secret, refresh_token)
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(
                    error = %e,
                    status = e.status_code(),
                    "Error getting access token"
                );
                return Err(e);
            }
        };

        let credential =
            match Credential::issued(response.access_token, Utc::now(), response.expires_in) {
                Ok(credential) => credential,
                Err(e) => {
                    tracing::error!(error = %e, "Token endpoint returned an unusable expiry");
                    return Err(e);
                }
            };
        let expires_at = credential.expires_at.map(format_utc_rfc3339);
        tracing::info!(
            expires_in = response.expires_in,
            expires_at = expires_at.as_deref(),
            "New access token obtained"
        );
        self.credential = credential;

        // The in-memory token stays usable even if it can't be persisted.
        match self.credential.encode() {
            Ok(blob) => match self.store.save(&blob).await {
                Ok(()) => tracing::info!("New access token stored"),
                Err(e) => tracing::warn!(error = %e, "Error storing new access token"),
            },
            Err(e) => tracing::warn!(error = %e, "Error encoding new access token"),
        }

        self.credential
            .access_token
            .clone()
            .ok_or_else(|| SyncError::Auth("Access token missing".to_string()))
    }
}
