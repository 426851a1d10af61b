//! Presenter capability: the scheduler's only outbound view of the car.

use crate::core::{DoorStatus, Floor, MachineState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Everything a display needs to draw the car.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarView {
    pub current_floor: Floor,
    pub total_floors: Floor,
    pub door_status: DoorStatus,
    pub machine_state: MachineState,
    /// Human readable queue, head first.
    pub queue: Vec<String>,
}

/// Receives the car's view after every state-affecting change.
///
/// Called from the draining task and from request calls, never while scheduler
/// state is locked, so implementations may call back into the scheduler's getters.
pub trait Presenter: Send + Sync + 'static {
    fn render(&self, view: &CarView);

    /// Car position in fractional floors while travelling.
    fn travel_progress(&self, _position: f64) {}
}

impl<P: Presenter + ?Sized> Presenter for Arc<P> {
    fn render(&self, view: &CarView) {
        (**self).render(view);
    }

    fn travel_progress(&self, position: f64) {
        (**self).travel_progress(position);
    }
}

/// Presenter that writes every view to `tracing` at debug level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn render(&self, view: &CarView) {
        tracing::debug!(
            floor = view.current_floor,
            door = %view.door_status,
            state = %view.machine_state,
            queue = ?view.queue,
            "render"
        );
    }

    fn travel_progress(&self, position: f64) {
        tracing::trace!(position, "travel");
    }
}
