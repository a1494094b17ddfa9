// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Statistics snapshots for coordination rings
//!
//! Lets callers and tests observe admission behavior without touching the
//! raw phase and occupancy arrays.

use crate::clock::Clock;
use crate::ring::WorkerId;
use crate::state::{RingState, WorkerPhase};
use std::time::Duration;

/// Per-worker admission statistics
#[derive(Clone, Copy, Debug, Default)]
pub struct WorkerStats {
    /// Times this worker was admitted
    pub grants: u64,
    /// Total time spent waiting across all admissions
    pub total_wait: Duration,
    /// Longest single wait before an admission
    pub max_wait: Duration,
    /// How long the worker has been waiting right now, if it is
    pub waiting_for: Option<Duration>,
}

/// Statistics about a coordination ring
#[derive(Clone, Debug, Default)]
pub struct RingStats {
    pub active_workers: usize,
    pub waiting_workers: usize,
    pub occupied_boards: usize,
    /// One entry per worker, indexed by id
    pub workers: Vec<WorkerStats>,
}

impl RingStats {
    /// Collect statistics from a ring state
    pub fn collect(state: &RingState, clock: &impl Clock) -> Self {
        let now = clock.now();
        let workers = state
            .ring
            .worker_ids()
            .map(|worker| {
                let record = state.records[worker.0];
                WorkerStats {
                    grants: record.grants,
                    total_wait: record.total_wait,
                    max_wait: record.max_wait,
                    waiting_for: state.waiting_since[worker.0]
                        .map(|since| now.duration_since(since)),
                }
            })
            .collect();

        Self {
            active_workers: state
                .phases
                .iter()
                .filter(|p| **p == WorkerPhase::Active)
                .count(),
            waiting_workers: state
                .phases
                .iter()
                .filter(|p| **p == WorkerPhase::Waiting)
                .count(),
            occupied_boards: state.occupied.iter().filter(|o| **o).count(),
            workers,
        }
    }

    /// Workers that have never been admitted
    pub fn never_admitted(&self) -> Vec<WorkerId> {
        self.workers
            .iter()
            .enumerate()
            .filter(|(_, w)| w.grants == 0)
            .map(|(i, _)| WorkerId(i))
            .collect()
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
