// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Effects and events requested by the coordination state machine
//!
//! The state machine never performs a side effect itself; it returns the
//! wakes and events it wants and the engine carries them out.

use crate::ring::{BoardId, WorkerId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Side effects the state machine asks the engine to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Emit an event for observers
    Emit(Event),
    /// Resume a worker suspended in acquire
    Wake { worker: WorkerId },
}

/// Events emitted by the coordination state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// Worker asked for its boards and entered the waiting phase
    AccessRequested { worker: WorkerId },
    /// Worker was admitted and now holds both of its boards
    AccessGranted {
        worker: WorkerId,
        boards: (BoardId, BoardId),
        #[serde(with = "humantime_serde")]
        waited: Duration,
    },
    /// Worker handed both boards back
    AccessReleased {
        worker: WorkerId,
        boards: (BoardId, BoardId),
    },
    /// Worker abandoned its request before being admitted
    AccessCancelled { worker: WorkerId },
    /// Worker has been waiting longer than the stall threshold
    WorkerStalled {
        worker: WorkerId,
        #[serde(with = "humantime_serde")]
        waited: Duration,
    },
}

impl Event {
    /// Get the event name for log labels
    /// Format: "category:action"
    pub fn name(&self) -> &'static str {
        match self {
            Event::AccessRequested { .. } => "access:requested",
            Event::AccessGranted { .. } => "access:granted",
            Event::AccessReleased { .. } => "access:released",
            Event::AccessCancelled { .. } => "access:cancelled",
            Event::WorkerStalled { .. } => "worker:stalled",
        }
    }

    /// The worker the event is about
    pub fn worker(&self) -> WorkerId {
        match self {
            Event::AccessRequested { worker }
            | Event::AccessGranted { worker, .. }
            | Event::AccessReleased { worker, .. }
            | Event::AccessCancelled { worker }
            | Event::WorkerStalled { worker, .. } => *worker,
        }
    }
}

#[cfg(test)]
#[path = "effect_tests.rs"]
mod tests;
