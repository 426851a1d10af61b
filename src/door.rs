//! Door subsystem.
//!
//! Doors move in two phases: `open`/`close` start the motion and wait for it to run,
//! and `confirm_open`/`confirm_close` finalize it once the caller has observed the
//! motion settle. Between the two phases the status stays `Opening`/`Closing`.

use crate::clock::Clock;
use crate::core::DoorStatus;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors reported by a door.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DoorError {
    #[error("another door motion is already in progress")]
    Busy,

    #[error("cannot start {requested} while the door is {current}")]
    Reversal {
        requested: DoorStatus,
        current: DoorStatus,
    },

    #[error("nothing to confirm: expected door {expected}, found {actual}")]
    NotPending {
        expected: DoorStatus,
        actual: DoorStatus,
    },

    #[error("door fault: {0}")]
    Fault(String),
}

/// Door capability consumed by the scheduler.
pub trait Door: Send + Sync + 'static {
    /// Current status (pure).
    fn status(&self) -> DoorStatus;

    /// Start opening. Returns once the motion has run; the status is still `Opening`.
    /// No-op if already `Open` or `Opening`.
    fn open(&self) -> impl Future<Output = Result<(), DoorError>> + Send;

    /// Finalize `Opening -> Open`. Fails if no opening is pending.
    fn confirm_open(&self) -> impl Future<Output = Result<(), DoorError>> + Send;

    /// Start closing. Returns once the motion has run; the status is still `Closing`.
    /// No-op if already `Closed` or `Closing`.
    fn close(&self) -> impl Future<Output = Result<(), DoorError>> + Send;

    /// Finalize `Closing -> Closed`. Fails if no closing is pending.
    fn confirm_close(&self) -> impl Future<Output = Result<(), DoorError>> + Send;
}

/// Door timing constants, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoorTiming {
    /// How long a door motion runs before it can be confirmed.
    pub motion_ms: u64,
    /// Pause the scheduler takes between a motion and its confirmation.
    pub settle_ms: u64,
}

impl Default for DoorTiming {
    fn default() -> Self {
        Self {
            motion_ms: 1500,
            settle_ms: 250,
        }
    }
}

impl DoorTiming {
    pub fn motion(&self) -> Duration {
        Duration::from_millis(self.motion_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Simulated door driven by a [`Clock`].
pub struct SimulatedDoor<C: Clock> {
    status: Mutex<DoorStatus>,
    in_progress: AtomicBool,
    clock: C,
    timing: DoorTiming,
}

/// Clears the in-progress flag when the motion ends, however it ends.
struct Motion<'a>(&'a AtomicBool);

impl Drop for Motion<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<C: Clock> SimulatedDoor<C> {
    pub fn new(clock: C, timing: DoorTiming) -> Self {
        Self {
            status: Mutex::new(DoorStatus::Closed),
            in_progress: AtomicBool::new(false),
            clock,
            timing,
        }
    }

    fn begin_motion(&self) -> Result<Motion<'_>, DoorError> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Motion(&self.in_progress))
            .map_err(|_| DoorError::Busy)
    }

    /// Run one motion from `resting` towards `moving`, or do nothing if the door is
    /// already there or on its way.
    async fn start(
        &self,
        resting: DoorStatus,
        moving: DoorStatus,
        done: DoorStatus,
    ) -> Result<(), DoorError> {
        let current = self.status();
        if current == done || current == moving {
            return Ok(());
        }
        if current != resting {
            return Err(DoorError::Reversal {
                requested: moving,
                current,
            });
        }

        let _motion = self.begin_motion()?;
        *self.status.lock() = moving;
        tracing::trace!(status = %moving, "door motion started");
        self.clock.sleep(self.timing.motion()).await;
        Ok(())
    }

    fn confirm(&self, moving: DoorStatus, done: DoorStatus) -> Result<(), DoorError> {
        if self.in_progress.load(Ordering::Acquire) {
            return Err(DoorError::Busy);
        }
        let mut status = self.status.lock();
        match *status {
            current if current == moving => {
                *status = done;
                tracing::trace!(status = %done, "door motion confirmed");
                Ok(())
            }
            actual => Err(DoorError::NotPending {
                expected: moving,
                actual,
            }),
        }
    }
}

impl<C: Clock> Door for SimulatedDoor<C> {
    fn status(&self) -> DoorStatus {
        *self.status.lock()
    }

    async fn open(&self) -> Result<(), DoorError> {
        self.start(DoorStatus::Closed, DoorStatus::Opening, DoorStatus::Open)
            .await
    }

    async fn confirm_open(&self) -> Result<(), DoorError> {
        self.confirm(DoorStatus::Opening, DoorStatus::Open)
    }

    async fn close(&self) -> Result<(), DoorError> {
        self.start(DoorStatus::Open, DoorStatus::Closing, DoorStatus::Closed)
            .await
    }

    async fn confirm_close(&self) -> Result<(), DoorError> {
        self.confirm(DoorStatus::Closing, DoorStatus::Closed)
    }
}
