//! Action queue scheduler.
//!
//! Requests become batches of [`Action`]s on a FIFO queue. A drain executes the head
//! action against the door and the travel simulation, drives the state machine
//! through the matching transitions, and pops the action only once it has finished.
//! A periodic tick re-attempts the drain so stalled heads are eventually retried.

mod action;
mod car;
mod error;
mod outcome;
mod presenter;
mod runner;
mod snapshot;

pub use action::{Action, ActionQueue, ActionSource, DoorCommand};
pub use car::Car;
pub use error::{SchedulerError, SnapshotError};
pub use outcome::{DrainOutcome, Rejection, RequestOutcome};
pub use presenter::{CarView, Presenter, TracingPresenter};
pub use runner::Scheduler;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};
