//! Scheduler error types.

use crate::core::MachineState;
use crate::door::DoorError;
use thiserror::Error;

/// Faults that abort a drain and discard the queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("door fault: {0}")]
    Door(#[from] DoorError),

    #[error("transition '{transition}' refused in state {state}")]
    TransitionRefused {
        transition: String,
        state: MachineState,
    },
}

/// Errors raised while rendering a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// Serialization to JSON failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}
