// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Ringboard execution engine: the coordination monitor and the
//! worker-loop harness that drives it

mod crew;
mod error;
mod events;
mod monitor;
mod watcher;

pub use crew::{Crew, Workload};
pub use error::{CoordinationError, CrewError};
pub use events::{EventBus, EventReceiver};
pub use monitor::Coordinator;
pub use watcher::{StallWatcher, WatcherConfig};
