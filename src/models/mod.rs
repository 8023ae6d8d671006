// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the sync job.

pub mod credential;
pub mod device;
pub mod phonebook;
pub mod report;

pub use credential::Credential;
pub use device::{DeviceRecord, DirectoryListing, FavoritesMap};
pub use phonebook::{LocalContact, LocalFolder, NewContact};
pub use report::{CycleOutcome, CycleReport, TagSummary};
