//! Liftstate: a state-machine-driven action scheduler for a single elevator car
//!
//! Liftstate follows a "pure core, imperative shell" layout. The transition table and
//! state types are pure values; the door, the clock and the presenter are injected
//! capabilities; the scheduler is the shell that sequences them.
//!
//! # Core Concepts
//!
//! - **State**: closed enums for the car ([`MachineState`]) and its doors ([`DoorStatus`])
//! - **Transition table**: the sole authority for legal state changes
//! - **Engine**: replays table steps, records history and notifies a subscriber
//! - **Scheduler**: turns requests into a FIFO of actions and drains it one at a time
//!
//! # Example
//!
//! ```rust
//! use liftstate::clock::VirtualClock;
//! use liftstate::scheduler::{Action, Scheduler, TracingPresenter};
//! use liftstate::{ElevatorConfig, MachineState};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scheduler =
//!     Scheduler::simulated(ElevatorConfig::new(6), TracingPresenter, VirtualClock::new())
//!         .unwrap();
//!
//! scheduler.enqueue_floor(4);
//! assert_eq!(scheduler.queue()[0], Action::MoveToFloor { floor: 4 });
//!
//! scheduler.tick().await;
//! assert_eq!(scheduler.current_floor(), 4);
//! assert_eq!(scheduler.machine_state(), MachineState::Idle);
//! # }
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod config;
pub mod core;
pub mod door;
pub mod engine;
pub mod scheduler;
pub mod travel;

// Re-export commonly used types
pub use config::{ConfigError, ElevatorConfig};
pub use crate::core::{DoorStatus, Floor, MachineState, State, StateHistory, StateTransition};
pub use door::{Door, DoorError, SimulatedDoor};
pub use engine::{StateMachine, Transition, TransitionTable};
pub use scheduler::{DrainOutcome, Presenter, RequestOutcome, Scheduler};
