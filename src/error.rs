// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Error types for the synchronization cycle.
//!
//! None of these escape a scheduled tick: they are caught at the cycle
//! boundary and logged with whatever tag/status context is available.

/// Errors raised while refreshing credentials, querying the directory or
/// rebuilding the local phonebook.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Token redemption failed: {0}")]
    Auth(String),

    #[error("Directory rejected the access token (401)")]
    Unauthorized,

    #[error("Directory query failed: {0}")]
    Directory(String),

    #[error("Credential storage error: {0}")]
    Storage(String),

    #[error("Phonebook rebuild failed: {0}")]
    Rebuild(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl SyncError {
    /// Returns true if the error means the bearer token was rejected and a
    /// redemption might fix it.
    pub fn is_token_error(&self) -> bool {
        matches!(self, SyncError::Unauthorized)
    }

    /// HTTP status carried in the message, if any (e.g. "HTTP 503 ...").
    pub fn status_code(&self) -> Option<u16> {
        let msg = match self {
            SyncError::Auth(msg) | SyncError::Directory(msg) => msg,
            SyncError::Unauthorized => return Some(401),
            _ => return None,
        };
        msg.strip_prefix("HTTP ")?
            .split_whitespace()
            .next()?
            .parse()
            .ok()
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
