// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker-loop harness
//!
//! Drives every worker through the plan → acquire → work → release cycle a
//! fixed number of times. The plan and work steps are caller-supplied; the
//! harness owns only the coordination choreography.

use crate::error::CrewError;
use crate::monitor::Coordinator;
use async_trait::async_trait;
use ringboard_core::{Clock, WorkerId};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Caller-supplied workload run between coordination points
#[async_trait]
pub trait Workload: Send + Sync + 'static {
    /// Off-board step before requesting access
    async fn plan(&self, worker: WorkerId, cycle: u32);
    /// On-board step, run while both boards are held
    async fn work(&self, worker: WorkerId, cycle: u32);
}

/// Runs one task per worker through a fixed number of cycles
pub struct Crew<W, C: Clock = ringboard_core::SystemClock> {
    coordinator: Coordinator<C>,
    workload: Arc<W>,
    cycles: u32,
}

impl<W, C> Crew<W, C>
where
    W: Workload,
    C: Clock + 'static,
{
    pub fn new(coordinator: Coordinator<C>, workload: W, cycles: u32) -> Self {
        Self {
            coordinator,
            workload: Arc::new(workload),
            cycles,
        }
    }

    /// Run every worker to completion
    ///
    /// Spawns one task per seat on the ring and joins them all; the first
    /// worker failure aborts the run.
    pub async fn run(&self) -> Result<(), CrewError> {
        let mut tasks = JoinSet::new();
        for worker in (0..self.coordinator.workers()).map(WorkerId) {
            let coordinator = self.coordinator.clone();
            let workload = Arc::clone(&self.workload);
            let cycles = self.cycles;
            tasks.spawn(worker_loop(coordinator, workload, worker, cycles));
        }

        while let Some(joined) = tasks.join_next().await {
            joined??;
        }
        Ok(())
    }
}

async fn worker_loop<W: Workload, C: Clock>(
    coordinator: Coordinator<C>,
    workload: Arc<W>,
    worker: WorkerId,
    cycles: u32,
) -> Result<(), CrewError> {
    for cycle in 0..cycles {
        workload.plan(worker, cycle).await;
        coordinator.acquire(worker).await?;
        workload.work(worker, cycle).await;
        coordinator.release(worker)?;
        tracing::debug!(worker = %worker, cycle, "cycle complete");
    }
    tracing::info!(worker = %worker, cycles, "worker finished");
    Ok(())
}

#[cfg(test)]
#[path = "crew_tests.rs"]
mod tests;
