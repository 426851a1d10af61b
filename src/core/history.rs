//! State transition history tracking.
//!
//! The engine records every applied step here. History is bounded: once the
//! configured limit is reached the oldest record is dropped, so a car that runs for
//! days keeps a fixed-size window of recent movements.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Default number of records kept by [`StateHistory::new`].
pub const DEFAULT_HISTORY_LIMIT: usize = 64;

/// Record of a single applied step.
///
/// # Example
///
/// ```rust
/// use liftstate::core::{MachineState, StateTransition};
/// use chrono::Utc;
///
/// let transition = StateTransition {
///     from: MachineState::Idle,
///     to: MachineState::DoorOpening,
///     via: "openDoor".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.via, "openDoor");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// Name of the transition that produced this step
    pub via: String,
    /// When the step was applied
    pub timestamp: DateTime<Utc>,
}

/// Bounded, ordered history of applied steps.
///
/// # Example
///
/// ```rust
/// use liftstate::core::{MachineState, StateHistory, StateTransition};
/// use chrono::Utc;
///
/// let mut history = StateHistory::with_limit(2);
/// for (from, to) in [
///     (MachineState::Idle, MachineState::MovingUp),
///     (MachineState::MovingUp, MachineState::Idle),
///     (MachineState::Idle, MachineState::DoorOpening),
/// ] {
///     history.record(StateTransition {
///         from,
///         to,
///         via: "step".to_string(),
///         timestamp: Utc::now(),
///     });
/// }
///
/// // Only the two most recent steps are kept.
/// let path = history.get_path();
/// assert_eq!(
///     path,
///     vec![&MachineState::MovingUp, &MachineState::Idle, &MachineState::DoorOpening]
/// );
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: VecDeque<StateTransition<S>>,
    limit: usize,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create an empty history holding up to [`DEFAULT_HISTORY_LIMIT`] records.
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty history holding up to `limit` records.
    ///
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            transitions: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
            limit,
        }
    }

    /// Record a step, evicting the oldest record when full.
    pub fn record(&mut self, transition: StateTransition<S>) {
        if self.limit == 0 {
            return;
        }
        while self.transitions.len() >= self.limit {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Get the path of states traversed by the retained records.
    ///
    /// Returns the `from` state of the oldest retained record followed by the `to`
    /// state of each record.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::with_capacity(self.transitions.len() + 1);
        if let Some(first) = self.transitions.front() {
            path.push(&first.from);
        }
        path.extend(self.transitions.iter().map(|t| &t.to));
        path
    }

    /// Time between the oldest and newest retained records.
    ///
    /// Returns `None` if nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.transitions.front()?, self.transitions.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    /// Retained records, oldest first.
    pub fn transitions(&self) -> impl Iterator<Item = &StateTransition<S>> {
        self.transitions.iter()
    }

    /// Most recent record, if any.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.back()
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
