// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Coordination state machine for ring-shaped board access
//!
//! Admission is all-or-nothing: a worker becomes active only when both of
//! its boards are free, so it never sits on one board while blocked on the
//! other. A release frees both boards and re-tests only the two ring
//! neighbors, which is sufficient here because each freed board is shared
//! with exactly one other worker.

use crate::clock::Clock;
use crate::effect::{Effect, Event};
use crate::ring::{BoardId, Ring, RingError, WorkerId};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use thiserror::Error;

/// A worker's position in its request lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerPhase {
    /// Not interested in boards
    Planning,
    /// Asked for boards, not yet admitted
    Waiting,
    /// Holding both boards
    Active,
}

/// Ring coordination configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RingConfig {
    /// Number of workers (and boards) on the ring
    pub workers: usize,
    /// How long a worker may wait before a stall warning is emitted
    #[serde(with = "humantime_serde")]
    pub stall_threshold: Duration,
}

impl RingConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            stall_threshold: Duration::from_secs(30),
        }
    }

    pub fn with_stall_threshold(mut self, threshold: Duration) -> Self {
        self.stall_threshold = threshold;
        self
    }
}

/// Caller bugs: inputs that would corrupt the occupancy bookkeeping
///
/// These are never retried or swallowed; the caller violated the lifecycle
/// and must be surfaced immediately.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("unknown worker {worker} on a ring of {workers}")]
    UnknownWorker { worker: WorkerId, workers: usize },
    #[error("worker {worker} requested boards while {phase:?}, expected Planning")]
    NotPlanning { worker: WorkerId, phase: WorkerPhase },
    #[error("worker {worker} released boards while {phase:?}, expected Active")]
    NotActive { worker: WorkerId, phase: WorkerPhase },
    #[error("worker {worker} cancelled a request while {phase:?}, expected Waiting")]
    NotWaiting { worker: WorkerId, phase: WorkerPhase },
}

/// Inputs that drive the coordination state machine
#[derive(Clone, Debug)]
pub enum RingInput {
    /// Worker wants its two boards
    Request { worker: WorkerId },
    /// Worker hands its two boards back
    Release { worker: WorkerId },
    /// Worker abandons a pending request
    Cancel { worker: WorkerId },
    /// Check for stalled waiters (called periodically)
    Tick,
}

/// Per-worker admission accounting
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WaitRecord {
    pub(crate) grants: u64,
    pub(crate) total_wait: Duration,
    pub(crate) max_wait: Duration,
}

/// Coordination state: each worker's phase and each board's occupancy
///
/// Owned by the engine's Coordinator and mutated only through
/// [`RingState::transition`]; callers observe it through accessors, never
/// through the raw arrays.
#[derive(Clone, Debug)]
pub struct RingState {
    pub(crate) config: RingConfig,
    pub(crate) ring: Ring,
    pub(crate) phases: Vec<WorkerPhase>,
    pub(crate) occupied: Vec<bool>,
    pub(crate) waiting_since: Vec<Option<Instant>>,
    pub(crate) records: Vec<WaitRecord>,
}

impl RingState {
    pub fn new(config: RingConfig) -> Result<Self, RingError> {
        let ring = Ring::new(config.workers)?;
        let n = ring.workers();
        Ok(Self {
            config,
            ring,
            phases: vec![WorkerPhase::Planning; n],
            occupied: vec![false; n],
            waiting_since: vec![None; n],
            records: vec![WaitRecord::default(); n],
        })
    }

    /// The ring topology
    pub fn ring(&self) -> &Ring {
        &self.ring
    }

    /// The configuration this state was built from
    pub fn config(&self) -> &RingConfig {
        &self.config
    }

    /// A worker's current phase, if the id is on the ring
    pub fn phase(&self, worker: WorkerId) -> Option<WorkerPhase> {
        self.phases.get(worker.0).copied()
    }

    /// Whether a board is currently held by an active worker
    pub fn is_occupied(&self, board: BoardId) -> bool {
        self.occupied.get(board.0).copied().unwrap_or(false)
    }

    /// Number of workers currently holding their boards
    pub fn active_count(&self) -> usize {
        self.phases
            .iter()
            .filter(|p| **p == WorkerPhase::Active)
            .count()
    }

    /// Number of workers suspended waiting for boards
    pub fn waiting_count(&self) -> usize {
        self.phases
            .iter()
            .filter(|p| **p == WorkerPhase::Waiting)
            .count()
    }

    /// Whether every board is free
    pub fn all_free(&self) -> bool {
        self.occupied.iter().all(|o| !o)
    }

    fn check_worker(&self, worker: WorkerId) -> Result<(), ProtocolError> {
        if self.ring.contains(worker) {
            Ok(())
        } else {
            Err(ProtocolError::UnknownWorker {
                worker,
                workers: self.ring.workers(),
            })
        }
    }

    /// Admission test: a waiting worker whose boards are both free becomes
    /// active, occupies them, and is woken.
    fn try_admit(&mut self, worker: WorkerId, clock: &impl Clock, effects: &mut Vec<Effect>) {
        let (first, second) = self.ring.boards(worker);
        if self.phases[worker.0] != WorkerPhase::Waiting
            || self.occupied[first.0]
            || self.occupied[second.0]
        {
            return;
        }

        self.phases[worker.0] = WorkerPhase::Active;
        self.occupied[first.0] = true;
        self.occupied[second.0] = true;

        let waited = self.waiting_since[worker.0]
            .take()
            .map(|since| clock.now().duration_since(since))
            .unwrap_or_default();
        let record = &mut self.records[worker.0];
        record.grants += 1;
        record.total_wait += waited;
        record.max_wait = record.max_wait.max(waited);

        effects.push(Effect::Wake { worker });
        effects.push(Effect::Emit(Event::AccessGranted {
            worker,
            boards: (first, second),
            waited,
        }));
    }

    /// Pure state transition function
    ///
    /// Returns the successor state and the effects the engine must perform.
    /// A [`ProtocolError`] means the input violated the worker lifecycle and
    /// the state was left untouched.
    pub fn transition(
        &self,
        input: RingInput,
        clock: &impl Clock,
    ) -> Result<(RingState, Vec<Effect>), ProtocolError> {
        let mut next = self.clone();
        let mut effects = Vec::new();

        match input {
            RingInput::Request { worker } => {
                next.check_worker(worker)?;
                let phase = next.phases[worker.0];
                if phase != WorkerPhase::Planning {
                    return Err(ProtocolError::NotPlanning { worker, phase });
                }
                next.phases[worker.0] = WorkerPhase::Waiting;
                next.waiting_since[worker.0] = Some(clock.now());
                effects.push(Effect::Emit(Event::AccessRequested { worker }));
                // Self-test: the requester may be admissible right away
                next.try_admit(worker, clock, &mut effects);
            }

            RingInput::Release { worker } => {
                next.check_worker(worker)?;
                let phase = next.phases[worker.0];
                if phase != WorkerPhase::Active {
                    return Err(ProtocolError::NotActive { worker, phase });
                }
                let (first, second) = next.ring.boards(worker);
                next.phases[worker.0] = WorkerPhase::Planning;
                next.occupied[first.0] = false;
                next.occupied[second.0] = false;
                effects.push(Effect::Emit(Event::AccessReleased {
                    worker,
                    boards: (first, second),
                }));
                // The freed boards can unblock at most the two neighbors
                let (left, right) = next.ring.neighbors(worker);
                next.try_admit(left, clock, &mut effects);
                next.try_admit(right, clock, &mut effects);
            }

            RingInput::Cancel { worker } => {
                next.check_worker(worker)?;
                let phase = next.phases[worker.0];
                if phase != WorkerPhase::Waiting {
                    return Err(ProtocolError::NotWaiting { worker, phase });
                }
                next.phases[worker.0] = WorkerPhase::Planning;
                next.waiting_since[worker.0] = None;
                effects.push(Effect::Emit(Event::AccessCancelled { worker }));
            }

            RingInput::Tick => {
                for worker in next.ring.worker_ids() {
                    if let Some(since) = next.waiting_since[worker.0] {
                        let waited = clock.now().duration_since(since);
                        if waited > next.config.stall_threshold {
                            effects.push(Effect::Emit(Event::WorkerStalled { worker, waited }));
                        }
                    }
                }
            }
        }

        Ok((next, effects))
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
