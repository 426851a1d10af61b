//! Core state types.
//!
//! This module contains the pure part of the crate:
//! - The `State` trait plus the car's `MachineState` and the door's `DoorStatus`
//! - Bounded history of applied state changes
//!
//! Nothing in here performs I/O or waits.

mod history;
mod state;

pub use history::{StateHistory, StateTransition, DEFAULT_HISTORY_LIMIT};
pub use state::{DoorStatus, MachineState, State};

/// A floor number, counted from 1.
pub type Floor = u32;
