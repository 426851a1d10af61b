//! Point-in-time view of the whole scheduler, for logging and debugging.

use super::action::Action;
use super::error::SnapshotError;
use crate::core::{DoorStatus, Floor, MachineState, StateHistory};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version identifier for the snapshot format
pub const SNAPSHOT_VERSION: u32 = 1;

/// Serializable copy of the scheduler's state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot format version
    pub version: u32,

    /// When the snapshot was taken
    pub taken_at: DateTime<Utc>,

    pub current_floor: Floor,
    pub total_floors: Floor,
    pub machine_state: MachineState,
    pub door_status: DoorStatus,

    /// Pending actions, head first
    pub queue: Vec<Action>,

    /// Whether a drain was running
    pub processing: bool,

    /// Recent machine steps
    pub history: StateHistory<MachineState>,
}

impl Snapshot {
    /// Render as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SnapshotError::SerializationFailed(e.to_string()))
    }

    /// Human readable queue, head first.
    pub fn queue_labels(&self) -> Vec<String> {
        self.queue.iter().map(Action::describe).collect()
    }
}
