// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event fan-out for coordination observers
//!
//! Every event the coordinator emits is delivered to all live subscribers.

use ringboard_core::Event;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// Receiver for coordination events
pub type EventReceiver = mpsc::UnboundedReceiver<Event>;

/// The event bus fans coordination events out to subscribers
pub struct EventBus {
    subscribers: Arc<RwLock<HashMap<u64, mpsc::UnboundedSender<Event>>>>,
    next_id: Arc<AtomicU64>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to every event published on this bus
    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
        subs.insert(id, tx);
        rx
    }

    /// Publish an event to all live subscribers, dropping closed ones
    pub fn publish(&self, event: Event) {
        let closed: Vec<u64> = {
            let subs = self.subscribers.read().unwrap_or_else(|e| e.into_inner());
            subs.iter()
                .filter(|(_, tx)| tx.send(event.clone()).is_err())
                .map(|(id, _)| *id)
                .collect()
        };

        if !closed.is_empty() {
            let mut subs = self.subscribers.write().unwrap_or_else(|e| e.into_inner());
            for id in closed {
                subs.remove(&id);
            }
        }
    }

    /// Get count of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

#[cfg(test)]
#[path = "events_tests.rs"]
mod tests;
