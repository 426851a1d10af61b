//! State types for the elevator car and its doors.
//!
//! Both enums are closed sets generated by [`state_enum!`](crate::state_enum), so every
//! dispatch over them is an exhaustive `match` and their display names are fixed.

use super::Floor;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure. States are small immutable values describing where a
/// machine currently is.
///
/// # Required Traits
///
/// - `Clone` + `PartialEq`: states are compared and copied into history records
/// - `Debug`: states show up in diagnostics
/// - `Serialize` + `Deserialize`: states appear in snapshots
///
/// # Example
///
/// ```rust
/// use liftstate::core::State;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Lamp {
///     Off,
///     On,
/// }
///
/// impl State for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "off",
///             Self::On => "on",
///         }
///     }
/// }
///
/// assert_eq!(Lamp::On.name(), "on");
/// ```
pub trait State:
    Clone + PartialEq + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync
{
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}

crate::state_enum! {
    /// The car's top-level mode. Exactly one is current at any time.
    pub enum MachineState {
        /// Parked at a floor with the doors closed.
        Idle => "idle",
        /// Travelling towards a higher floor. Doors closed.
        MovingUp => "moving-up",
        /// Travelling towards a lower floor. Doors closed.
        MovingDown => "moving-down",
        /// Parked with the doors fully open.
        DoorOpen => "door-open",
        /// Parked while the doors open.
        DoorOpening => "door-opening",
        /// Parked while the doors close.
        DoorClosing => "door-closing",
    }
}

impl MachineState {
    /// True while the car is travelling between floors.
    pub fn is_moving(&self) -> bool {
        matches!(self, Self::MovingUp | Self::MovingDown)
    }

    /// Direction of travel from `from` to `to`, or `None` when they are equal.
    pub fn heading(from: Floor, to: Floor) -> Option<Self> {
        match to.cmp(&from) {
            std::cmp::Ordering::Greater => Some(Self::MovingUp),
            std::cmp::Ordering::Less => Some(Self::MovingDown),
            std::cmp::Ordering::Equal => None,
        }
    }
}

crate::state_enum! {
    /// The door's own status, owned by the door subsystem.
    pub enum DoorStatus {
        Closed => "closed",
        Opening => "opening",
        Open => "open",
        Closing => "closing",
    }
}

impl DoorStatus {
    /// True while a motion has started but not been confirmed.
    pub fn is_in_motion(&self) -> bool {
        matches!(self, Self::Opening | Self::Closing)
    }
}
