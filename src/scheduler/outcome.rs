//! Results of requests and drains.

use super::action::Action;
use super::error::SchedulerError;
use crate::core::Floor;
use thiserror::Error;

/// Why a request was turned down. Rejections leave the queue untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("floor {floor} is outside 1..={total}")]
    OutOfRange { floor: Floor, total: Floor },

    #[error("the car is already at the requested floor")]
    AlreadyThere,

    #[error("a move is already queued")]
    MoveQueued,

    #[error("the car is moving")]
    Moving,
}

/// Result of a floor or door request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Accepted,
    Rejected(Rejection),
}

impl RequestOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Result of one drain attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrainOutcome {
    /// Another drain was already running; nothing was done.
    Busy,
    /// The queue is empty.
    Drained,
    /// The head action cannot start in the current state and stays queued.
    Stalled(Action),
    /// A fault stopped the drain and the queue was discarded.
    Aborted(SchedulerError),
}
