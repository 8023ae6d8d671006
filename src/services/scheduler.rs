// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Fixed-interval cycle scheduling.
//!
//! The first cycle runs after a startup grace delay, then every
//! `refresh_period` measured from the previous tick's start. Cycles are
//! awaited inline, so ticks that fall due while a slow cycle is still running
//! are skipped rather than piling up.

use crate::models::CycleReport;
use crate::services::FavoritesSynchronizer;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::MissedTickBehavior;

/// What the scheduler has done so far.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerStatus {
    /// Cycles run since startup (including skipped/aborted ones)
    pub cycles: u64,
    pub last_cycle: Option<CycleReport>,
}

/// Status shared with the status server.
pub type SharedStatus = Arc<RwLock<SchedulerStatus>>;

/// Runs the synchronizer forever.
pub struct Scheduler {
    synchronizer: Arc<FavoritesSynchronizer>,
    startup_delay: Duration,
    refresh_period: Duration,
    status: SharedStatus,
}

impl Scheduler {
    pub fn new(
        synchronizer: Arc<FavoritesSynchronizer>,
        startup_delay: Duration,
        refresh_period: Duration,
    ) -> Self {
        Self {
            synchronizer,
            startup_delay,
            refresh_period,
            status: SharedStatus::default(),
        }
    }

    /// Handle to the status updated after every cycle.
    pub fn status(&self) -> SharedStatus {
        self.status.clone()
    }

    /// Wait for the startup delay, then run a cycle every period. Never returns.
    pub async fn run(self) {
        tracing::info!(
            startup_delay = ?self.startup_delay,
            refresh_period = ?self.refresh_period,
            "Scheduler started"
        );
        tokio::time::sleep(self.startup_delay).await;

        // First tick completes immediately.
        let mut interval = tokio::time::interval(self.refresh_period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.tick().await;
        }
    }

    /// Run one cycle and record its report.
    pub async fn tick(&self) -> CycleReport {
        let report = self.synchronizer.run_cycle().await;

        let elapsed_ms = (report.finished_at - report.started_at).num_milliseconds();
        tracing::info!(
            outcome = ?report.outcome,
            elapsed_ms,
            "Cycle finished"
        );

        let mut status = self.status.write().await;
        status.cycles += 1;
        status.last_cycle = Some(report.clone());
        report
    }
}
