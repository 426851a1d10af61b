//! Queued actions and the FIFO queue that holds them.

use crate::core::Floor;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

/// Who asked for a door action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSource {
    /// A passenger pressed a door button.
    Button,
    /// Queued as part of arriving at a requested floor.
    Arrival,
}

/// A door button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoorCommand {
    Open,
    Close,
}

/// A unit of queued work. Immutable once queued.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    OpenDoor { source: ActionSource },
    CloseDoor { source: ActionSource },
    MoveToFloor { floor: Floor },
    /// Hold the car with its doors as they are.
    Dwell {
        #[serde(with = "millis")]
        duration: Duration,
    },
}

impl Action {
    /// Human readable label shown to passengers.
    pub fn describe(&self) -> String {
        self.to_string()
    }

    pub fn is_move(&self) -> bool {
        matches!(self, Self::MoveToFloor { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenDoor { .. } => f.write_str("Door open"),
            Self::CloseDoor { .. } => f.write_str("Door close"),
            Self::MoveToFloor { floor } => write!(f, "Floor {floor}"),
            Self::Dwell { duration } => write!(f, "Wait {}s", duration.as_secs_f64()),
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// FIFO of pending actions.
///
/// Mutated only by appending whole request batches, popping the completed head, and
/// discarding everything after a fault.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionQueue {
    actions: VecDeque<Action>,
}

impl ActionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_batch(&mut self, batch: impl IntoIterator<Item = Action>) {
        self.actions.extend(batch);
    }

    pub fn front(&self) -> Option<&Action> {
        self.actions.front()
    }

    pub fn pop_front(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// True if a `MoveToFloor` is pending anywhere in the queue.
    pub fn has_move(&self) -> bool {
        self.actions.iter().any(Action::is_move)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }

    /// Labels of every queued action, head first.
    pub fn describe(&self) -> Vec<String> {
        self.actions.iter().map(Action::describe).collect()
    }

    /// Whether the doors end up open once every queued door action has run, given
    /// whether they are open now.
    pub fn leaves_doors_open(&self, open_now: bool) -> bool {
        self.actions.iter().fold(open_now, |open, action| match action {
            Action::OpenDoor { .. } => true,
            Action::CloseDoor { .. } => false,
            Action::MoveToFloor { .. } | Action::Dwell { .. } => open,
        })
    }
}
