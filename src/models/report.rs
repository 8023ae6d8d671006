// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Summary of a synchronization cycle.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// How a cycle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum CycleOutcome {
    /// Fetched, wiped and rebuilt.
    Completed,
    /// No tags configured; nothing touched.
    NoTags,
    /// Another cycle was still running.
    Skipped,
    /// Stopped before the local wipe; local state untouched.
    Aborted(String),
}

/// Device count fetched for one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagSummary {
    pub tag: String,
    pub devices: usize,
}

/// Result of one cycle, published for the status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: CycleOutcome,
    pub tags: Vec<TagSummary>,
    pub folders_deleted: usize,
    pub folders_created: usize,
    pub contacts_added: usize,
    /// Folder deletes, folder creates or contact adds that failed
    pub rebuild_failures: usize,
}

impl CycleReport {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            outcome: CycleOutcome::Completed,
            tags: Vec::new(),
            folders_deleted: 0,
            folders_created: 0,
            contacts_added: 0,
            rebuild_failures: 0,
        }
    }

    /// Stamp the finish time and outcome.
    pub fn finish(mut self, outcome: CycleOutcome) -> Self {
        self.finished_at = Utc::now();
        self.outcome = outcome;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == CycleOutcome::Completed
    }
}
