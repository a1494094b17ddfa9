// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordination monitor.
//!
//! All phase and occupancy mutation happens inside one exclusive section;
//! workers suspended in [`Coordinator::acquire`] are resumed through
//! per-worker wake handles, so a release touches only the neighbors it may
//! have unblocked. Admission itself is decided by the state machine in
//! `ringboard-core`; this type runs the requested effects.

use crate::error::CoordinationError;
use crate::events::{EventBus, EventReceiver};
use ringboard_core::{
    BoardId, Clock, Effect, RingConfig, RingError, RingInput, RingState, RingStats, SystemClock,
    WorkerId, WorkerPhase,
};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Monitor coordinating ring-shaped board access
///
/// Cheap to clone; all clones share the same ring.
pub struct Coordinator<C: Clock = SystemClock> {
    inner: Arc<Inner<C>>,
}

struct Inner<C: Clock> {
    state: Mutex<RingState>,
    /// One wake handle per worker, indexed by id
    wake: Vec<Notify>,
    bus: EventBus,
    clock: C,
}

impl Coordinator<SystemClock> {
    /// Create a coordinator driven by the system clock
    pub fn new(config: RingConfig) -> Result<Self, RingError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> Coordinator<C> {
    /// Create a coordinator with a caller-supplied clock
    pub fn with_clock(config: RingConfig, clock: C) -> Result<Self, RingError> {
        let state = RingState::new(config)?;
        let wake = (0..state.ring().workers()).map(|_| Notify::new()).collect();
        Ok(Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                wake,
                bus: EventBus::new(),
                clock,
            }),
        })
    }

    /// Number of workers (and boards) on the ring
    pub fn workers(&self) -> usize {
        self.lock_state().ring().workers()
    }

    /// The configuration the ring was built from
    pub fn config(&self) -> RingConfig {
        self.lock_state().config().clone()
    }

    /// Subscribe to coordination events
    pub fn subscribe(&self) -> EventReceiver {
        self.inner.bus.subscribe()
    }

    /// Acquire both boards for a worker, suspending until admitted
    ///
    /// When this returns the worker is active and holds its two boards
    /// exclusively. Suspension is event-driven: the call resumes only when
    /// a release makes the worker admissible. Dropping the returned future
    /// mid-wait withdraws the request without disturbing any other
    /// worker's bookkeeping.
    pub async fn acquire(&self, worker: WorkerId) -> Result<(), CoordinationError> {
        self.apply(RingInput::Request { worker })?;

        let mut pending = PendingRequest {
            coordinator: self,
            worker,
            admitted: false,
        };
        pending.admitted_wait().await;
        Ok(())
    }

    /// Hand a worker's boards back and re-test its two ring neighbors
    ///
    /// Never blocks; wakes 0, 1, or 2 suspended neighbors.
    pub fn release(&self, worker: WorkerId) -> Result<(), CoordinationError> {
        self.apply(RingInput::Release { worker })
    }

    /// Emit stall warnings for workers waiting beyond the configured
    /// threshold
    pub fn check_stalls(&self) {
        // Tick is valid in every state
        let _ = self.apply(RingInput::Tick);
    }

    /// A worker's current phase, if it is on the ring
    pub fn phase(&self, worker: WorkerId) -> Option<WorkerPhase> {
        self.lock_state().phase(worker)
    }

    /// Whether a board is currently held
    pub fn is_occupied(&self, board: BoardId) -> bool {
        self.lock_state().is_occupied(board)
    }

    /// Whether every board is free
    pub fn all_free(&self) -> bool {
        self.lock_state().all_free()
    }

    /// Snapshot of admission statistics
    pub fn stats(&self) -> RingStats {
        let state = self.lock_state();
        RingStats::collect(&state, &self.inner.clock)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, RingState> {
        self.inner.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run one input through the state machine under the exclusive
    /// section, then perform the requested effects outside it.
    fn apply(&self, input: RingInput) -> Result<(), CoordinationError> {
        let effects = {
            let mut state = self.lock_state();
            let (next, effects) = state.transition(input, &self.inner.clock)?;
            *state = next;
            effects
        };
        self.run_effects(effects);
        Ok(())
    }

    /// Withdraw a worker whose acquire future was dropped mid-wait
    ///
    /// The phase inspection and the corrective transition happen under the
    /// same lock acquisition: admission racing the drop must either land
    /// entirely before (then the boards are handed back in full) or
    /// entirely after the withdrawal (then there is nothing to admit).
    fn withdraw(&self, worker: WorkerId) {
        let effects = {
            let mut state = self.lock_state();
            let input = match state.phase(worker) {
                Some(WorkerPhase::Waiting) => RingInput::Cancel { worker },
                Some(WorkerPhase::Active) => RingInput::Release { worker },
                _ => return,
            };
            match state.transition(input, &self.inner.clock) {
                Ok((next, effects)) => {
                    *state = next;
                    effects
                }
                Err(_) => return,
            }
        };
        self.run_effects(effects);
    }

    fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Wake { worker } => {
                    // notify_one stores a permit when nobody is parked yet,
                    // so an admission landing before the waiter re-polls is
                    // never lost
                    self.inner.wake[worker.0].notify_one();
                }
                Effect::Emit(event) => {
                    tracing::debug!(event = event.name(), worker = %event.worker(), "coordination event");
                    self.inner.bus.publish(event);
                }
            }
        }
    }
}

impl<C: Clock> Clone for Coordinator<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// An in-flight acquire: tracks whether the caller was admitted so a drop
/// mid-wait can withdraw the request through the exclusive section.
struct PendingRequest<'a, C: Clock> {
    coordinator: &'a Coordinator<C>,
    worker: WorkerId,
    admitted: bool,
}

impl<C: Clock> PendingRequest<'_, C> {
    async fn admitted_wait(&mut self) {
        loop {
            // Register for the wake before re-checking the phase, so an
            // admission between the check and the await leaves a permit
            let notified = self.coordinator.inner.wake[self.worker.0].notified();
            if self.coordinator.phase(self.worker) == Some(WorkerPhase::Active) {
                self.admitted = true;
                return;
            }
            notified.await;
        }
    }
}

impl<C: Clock> Drop for PendingRequest<'_, C> {
    fn drop(&mut self) {
        if !self.admitted {
            self.coordinator.withdraw(self.worker);
        }
    }
}

#[cfg(test)]
#[path = "monitor_tests.rs"]
mod tests;
