// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - the sync cycle and its collaborators.

pub mod directory;
pub mod favorites;
pub mod scheduler;
pub mod tokens;
pub mod webex;

pub use directory::DirectoryClient;
pub use favorites::FavoritesSynchronizer;
pub use scheduler::{Scheduler, SchedulerStatus, SharedStatus};
pub use tokens::TokenManager;
pub use webex::{TokenRefreshResponse, WebexClient};
