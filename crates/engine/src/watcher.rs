// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Periodic stall detection for suspended workers

use crate::monitor::Coordinator;
use ringboard_core::Clock;
use std::time::Duration;
use tokio::time::interval;

/// Configuration for the stall watcher
#[derive(Clone, Debug)]
pub struct WatcherConfig {
    /// How often to check for stalled waiters
    pub interval: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

impl WatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Background task emitting stall warnings for long waits
///
/// Purely observational: it never changes a phase or an occupancy flag,
/// it only surfaces waits that exceed the ring's stall threshold.
pub struct StallWatcher<C: Clock> {
    coordinator: Coordinator<C>,
    config: WatcherConfig,
}

impl<C: Clock> StallWatcher<C> {
    pub fn new(coordinator: Coordinator<C>, config: WatcherConfig) -> Self {
        Self {
            coordinator,
            config,
        }
    }

    /// Run a single check cycle
    pub fn run_once(&self) {
        self.coordinator.check_stalls();
    }

    /// Run until the owning task is aborted
    pub async fn run(&self) {
        let mut ticker = interval(self.config.interval);
        loop {
            ticker.tick().await;
            self.run_once();
        }
    }

    /// Get the check interval
    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
