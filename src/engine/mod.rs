//! The transition table and the engine that executes it.
//!
//! - **Transition table**: pure lookup from `(state, transition)` to ordered steps
//! - **State machine**: applies those steps one by one, recording history and
//!   notifying a single subscriber after each

mod machine;
mod table;

pub use machine::{StateMachine, Subscriber};
pub use table::{ElevatorTransitions, Step, Target, Transition, TransitionTable};
