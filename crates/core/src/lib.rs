//! ringboard-core: Pure state machines for ring-shaped board coordination
//!
//! This crate provides:
//! - The immutable ring topology (which boards a worker needs, who its
//!   neighbors are)
//! - The coordination state machine with its all-or-nothing admission test
//! - Effects and events the engine executes on the machine's behalf
//! - Statistics snapshots for observing admission behavior

pub mod clock;
pub mod effect;
pub mod ring;
pub mod state;
pub mod stats;

// Re-exports
pub use clock::{Clock, FakeClock, SystemClock};
pub use effect::{Effect, Event};
pub use ring::{BoardId, Ring, RingError, WorkerId};
pub use state::{ProtocolError, RingConfig, RingInput, RingState, WorkerPhase};
pub use stats::{RingStats, WorkerStats};
