// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Favorites-Sync: mirror tagged Webex devices into a local phonebook
//!
//! Periodically looks up the organization's devices by tag and rebuilds the
//! endpoint's phonebook so each tag is a folder of favorite contacts.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod time_utils;

use services::SharedStatus;

/// Shared state for the status server.
pub struct AppState {
    pub tags: Vec<String>,
    pub status: SharedStatus,
}
