// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the coordination engine

use ringboard_core::ProtocolError;
use thiserror::Error;
use tokio::task::JoinError;

/// Errors surfaced by the coordinator's public contract
#[derive(Debug, Error)]
pub enum CoordinationError {
    #[error("protocol violation: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors surfaced by the worker-loop harness
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("coordination failed: {0}")]
    Coordination(#[from] CoordinationError),
    #[error("worker task failed: {0}")]
    Join(#[from] JoinError),
}
