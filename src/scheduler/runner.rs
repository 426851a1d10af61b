//! The action queue scheduler.

use super::action::{Action, ActionQueue, ActionSource, DoorCommand};
use super::car::Car;
use super::error::SchedulerError;
use super::outcome::{DrainOutcome, Rejection, RequestOutcome};
use super::presenter::{CarView, Presenter};
use super::snapshot::{Snapshot, SNAPSHOT_VERSION};
use crate::clock::Clock;
use crate::config::{ConfigError, ElevatorConfig};
use crate::core::{DoorStatus, Floor, MachineState};
use crate::door::{Door, DoorError, SimulatedDoor};
use crate::engine::{ElevatorTransitions, StateMachine, Target, Transition};
use crate::travel::{self, TravelTiming};
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// State guarded by the scheduler's lock.
struct Inner {
    machine: StateMachine<ElevatorTransitions>,
    car: Car,
    queue: ActionQueue,
    processing: bool,
}

/// How far a single action got.
enum Progress {
    Completed,
    Waiting,
}

/// Clears `processing` if a drain ends without doing so itself, e.g. when its
/// future is dropped mid-action.
struct ProcessingGuard<'a> {
    inner: &'a Mutex<Inner>,
    armed: bool,
}

impl ProcessingGuard<'_> {
    /// Clear the flag through an already held lock.
    fn release(&mut self, inner: &mut Inner) {
        inner.processing = false;
        self.armed = false;
    }
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.lock().processing = false;
        }
    }
}

fn door_fault(err: DoorError) -> SchedulerError {
    tracing::warn!(%err, "door rejected command");
    SchedulerError::Door(err)
}

/// Serializes requests into an action queue and drains it one action at a time.
///
/// At most one physical operation runs at once: a drain executes the head action to
/// completion before looking at the next one, and concurrent drains return
/// [`DrainOutcome::Busy`] immediately. Requests and ticks may arrive at any time,
/// including while a drain is suspended mid-action; anything they append is picked
/// up by the running drain.
///
/// # Example
///
/// ```rust
/// use liftstate::clock::VirtualClock;
/// use liftstate::config::ElevatorConfig;
/// use liftstate::core::{DoorStatus, MachineState};
/// use liftstate::scheduler::{Scheduler, TracingPresenter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let scheduler =
///     Scheduler::simulated(ElevatorConfig::default(), TracingPresenter, VirtualClock::new())
///         .unwrap();
///
/// assert!(scheduler.request_floor(3).await.is_accepted());
/// assert_eq!(scheduler.current_floor(), 3);
/// assert_eq!(scheduler.machine_state(), MachineState::Idle);
/// assert_eq!(scheduler.door_status(), DoorStatus::Closed);
/// assert!(scheduler.queue().is_empty());
/// # }
/// ```
pub struct Scheduler<D: Door, P: Presenter, C: Clock> {
    inner: Mutex<Inner>,
    door: D,
    presenter: P,
    clock: C,
    travel: TravelTiming,
    settle: Duration,
    dwell: Option<Duration>,
    tick_interval: Duration,
}

impl<P: Presenter, C: Clock + Clone> Scheduler<SimulatedDoor<C>, P, C> {
    /// Build a scheduler around a [`SimulatedDoor`] sharing `clock`.
    pub fn simulated(config: ElevatorConfig, presenter: P, clock: C) -> Result<Self, ConfigError> {
        let door = SimulatedDoor::new(clock.clone(), config.door.clone());
        Self::new(config, door, presenter, clock)
    }
}

impl<D: Door, P: Presenter, C: Clock> Scheduler<D, P, C> {
    /// Validate `config` and build a scheduler with the car idle at its initial floor.
    pub fn new(config: ElevatorConfig, door: D, presenter: P, clock: C) -> Result<Self, ConfigError> {
        let config = config.validated()?;

        let machine = StateMachine::new(ElevatorTransitions, MachineState::Idle, None)
            .with_history_limit(config.history_limit);

        let tick_interval = config.tick_interval();
        let dwell = config.dwell();
        Ok(Self {
            inner: Mutex::new(Inner {
                machine,
                car: Car::new(config.initial_floor, config.total_floors),
                queue: ActionQueue::new(),
                processing: false,
            }),
            door,
            presenter,
            clock,
            settle: config.door.settle(),
            travel: config.travel,
            dwell,
            tick_interval,
        })
    }

    pub fn door(&self) -> &D {
        &self.door
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn current_floor(&self) -> Floor {
        self.inner.lock().car.current_floor
    }

    pub fn total_floors(&self) -> Floor {
        self.inner.lock().car.total_floors
    }

    pub fn machine_state(&self) -> MachineState {
        *self.inner.lock().machine.current_state()
    }

    pub fn door_status(&self) -> DoorStatus {
        self.door.status()
    }

    /// Pending actions, head first.
    pub fn queue(&self) -> Vec<Action> {
        self.inner.lock().queue.iter().cloned().collect()
    }

    pub fn is_processing(&self) -> bool {
        self.inner.lock().processing
    }

    /// Replace the machine's step subscriber. Step logging does not depend on it.
    ///
    /// The callback runs while scheduler state is locked and must not call back into
    /// the scheduler.
    pub fn subscribe<F>(&self, callback: F)
    where
        F: Fn(&MachineState, &Target) + Send + Sync + 'static,
    {
        self.inner.lock().machine.subscribe(callback);
    }

    /// What the presenter would be shown right now.
    pub fn view(&self) -> CarView {
        let door_status = self.door.status();
        let inner = self.inner.lock();
        CarView {
            current_floor: inner.car.current_floor,
            total_floors: inner.car.total_floors,
            door_status,
            machine_state: *inner.machine.current_state(),
            queue: inner.queue.describe(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let door_status = self.door.status();
        let inner = self.inner.lock();
        Snapshot {
            version: SNAPSHOT_VERSION,
            taken_at: Utc::now(),
            current_floor: inner.car.current_floor,
            total_floors: inner.car.total_floors,
            machine_state: *inner.machine.current_state(),
            door_status,
            queue: inner.queue.iter().cloned().collect(),
            processing: inner.processing,
            history: inner.machine.history().clone(),
        }
    }

    /// Emit the current snapshot at info level.
    pub fn log_state(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            floor = snapshot.current_floor,
            state = %snapshot.machine_state,
            door = %snapshot.door_status,
            queue = ?snapshot.queue_labels(),
            processing = snapshot.processing,
            steps = snapshot.history.len(),
            "elevator state"
        );
    }

    fn render(&self) {
        let view = self.view();
        self.presenter.render(&view);
    }

    /// Queue a trip to `floor` without draining.
    ///
    /// Rejected when the floor does not exist, the car is already there, the car is
    /// moving, or a move is already queued. If the doors are open, opening, or will
    /// be left open by what is already queued, a button close is queued first.
    pub fn enqueue_floor(&self, floor: Floor) -> RequestOutcome {
        let door_status = self.door.status();
        let outcome = {
            let mut inner = self.inner.lock();
            let state = *inner.machine.current_state();
            let car = inner.car;
            let rejection = if !car.serves(floor) {
                Some(Rejection::OutOfRange {
                    floor,
                    total: car.total_floors,
                })
            } else if floor == car.current_floor {
                Some(Rejection::AlreadyThere)
            } else if state.is_moving() {
                Some(Rejection::Moving)
            } else if inner.queue.has_move() {
                Some(Rejection::MoveQueued)
            } else {
                None
            };

            match rejection {
                Some(rejection) => RequestOutcome::Rejected(rejection),
                None => {
                    let open_now = matches!(
                        state,
                        MachineState::DoorOpen | MachineState::DoorOpening
                    ) || matches!(door_status, DoorStatus::Open | DoorStatus::Opening);

                    let mut batch = Vec::with_capacity(5);
                    if inner.queue.leaves_doors_open(open_now) {
                        batch.push(Action::CloseDoor {
                            source: ActionSource::Button,
                        });
                    }
                    batch.push(Action::MoveToFloor { floor });
                    batch.push(Action::OpenDoor {
                        source: ActionSource::Arrival,
                    });
                    if let Some(duration) = self.dwell {
                        batch.push(Action::Dwell { duration });
                    }
                    batch.push(Action::CloseDoor {
                        source: ActionSource::Arrival,
                    });
                    inner.queue.push_batch(batch);
                    RequestOutcome::Accepted
                }
            }
        };

        match outcome {
            RequestOutcome::Accepted => {
                tracing::debug!(floor, "floor request accepted");
                self.render();
            }
            RequestOutcome::Rejected(reason) => {
                tracing::debug!(floor, %reason, "floor request rejected");
            }
        }
        outcome
    }

    /// Queue a door button press without draining. Opening is refused while moving.
    pub fn enqueue_door(&self, command: DoorCommand) -> RequestOutcome {
        let outcome = {
            let mut inner = self.inner.lock();
            match command {
                DoorCommand::Open if inner.machine.current_state().is_moving() => {
                    RequestOutcome::Rejected(Rejection::Moving)
                }
                DoorCommand::Open => {
                    inner.queue.push_batch([Action::OpenDoor {
                        source: ActionSource::Button,
                    }]);
                    RequestOutcome::Accepted
                }
                DoorCommand::Close => {
                    inner.queue.push_batch([Action::CloseDoor {
                        source: ActionSource::Button,
                    }]);
                    RequestOutcome::Accepted
                }
            }
        };

        match outcome {
            RequestOutcome::Accepted => {
                tracing::debug!(?command, "door request accepted");
                self.render();
            }
            RequestOutcome::Rejected(reason) => {
                tracing::debug!(?command, %reason, "door request rejected");
            }
        }
        outcome
    }

    /// Queue a trip to `floor` and drain if it was accepted.
    pub async fn request_floor(&self, floor: Floor) -> RequestOutcome {
        let outcome = self.enqueue_floor(floor);
        if outcome.is_accepted() {
            self.drain().await;
        }
        outcome
    }

    /// Queue a door button press and drain if it was accepted.
    pub async fn request_door(&self, command: DoorCommand) -> RequestOutcome {
        let outcome = self.enqueue_door(command);
        if outcome.is_accepted() {
            self.drain().await;
        }
        outcome
    }

    /// Periodic entry point; identical to [`drain`](Self::drain).
    pub async fn tick(&self) -> DrainOutcome {
        self.drain().await
    }

    /// Advance the queue as far as the machine state allows.
    pub async fn drain(&self) -> DrainOutcome {
        {
            let mut inner = self.inner.lock();
            if inner.processing {
                return DrainOutcome::Busy;
            }
            if inner.queue.is_empty() {
                return DrainOutcome::Drained;
            }
            inner.processing = true;
        }
        let mut guard = ProcessingGuard {
            inner: &self.inner,
            armed: true,
        };

        loop {
            let head = {
                let mut inner = self.inner.lock();
                let front = inner.queue.front().cloned();
                match front {
                    Some(action) => action,
                    None => {
                        guard.release(&mut inner);
                        return DrainOutcome::Drained;
                    }
                }
            };

            match self.execute(&head).await {
                Ok(Progress::Completed) => {
                    self.inner.lock().queue.pop_front();
                    tracing::debug!(action = %head, "action completed");
                    self.render();
                }
                Ok(Progress::Waiting) => {
                    guard.release(&mut self.inner.lock());
                    tracing::debug!(action = %head, "action waiting");
                    return DrainOutcome::Stalled(head);
                }
                Err(err) => {
                    {
                        let mut inner = self.inner.lock();
                        inner.queue.clear();
                        guard.release(&mut inner);
                    }
                    tracing::error!(%err, action = %head, "drain aborted, queue discarded");
                    self.render();
                    return DrainOutcome::Aborted(err);
                }
            }
        }
    }

    /// Run the ticker on the current tokio runtime, draining every `tick_interval`.
    pub fn spawn_ticker(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        let period = self.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let outcome = scheduler.tick().await;
                tracing::trace!(?outcome, "tick");
            }
        })
    }

    fn machine_state_now(&self) -> MachineState {
        *self.inner.lock().machine.current_state()
    }

    /// Drive the machine through `transition` and render, or fail if it is refused.
    fn apply(&self, transition: Transition) -> Result<(), SchedulerError> {
        let (from, to) = {
            let mut inner = self.inner.lock();
            let from = *inner.machine.current_state();
            if inner.machine.perform_transition(&transition) == 0 {
                return Err(SchedulerError::TransitionRefused {
                    transition: transition.to_string(),
                    state: from,
                });
            }
            (from, *inner.machine.current_state())
        };
        tracing::debug!(%transition, %from, %to, "machine step");
        self.render();
        Ok(())
    }

    async fn execute(&self, action: &Action) -> Result<Progress, SchedulerError> {
        match action {
            Action::MoveToFloor { floor } => self.move_to(*floor).await,
            Action::OpenDoor { .. } => self.open_doors().await,
            Action::CloseDoor { .. } => self.close_doors().await,
            Action::Dwell { duration } => {
                self.clock.sleep(*duration).await;
                Ok(Progress::Completed)
            }
        }
    }

    async fn move_to(&self, target: Floor) -> Result<Progress, SchedulerError> {
        let (from, state) = {
            let inner = self.inner.lock();
            (inner.car.current_floor, *inner.machine.current_state())
        };
        if state != MachineState::Idle {
            return Ok(Progress::Waiting);
        }
        if from == target {
            return Ok(Progress::Completed);
        }

        self.apply(Transition::MoveToFloor { from, to: target })?;
        self.travel(from, target).await;
        self.inner.lock().car.current_floor = target;
        self.apply(Transition::Arrive)?;
        Ok(Progress::Completed)
    }

    /// Wait out the trip, reporting the eased position once per frame.
    async fn travel(&self, from: Floor, to: Floor) {
        let total = self.travel.between(from, to);
        let frame = self.travel.frame();
        let started = self.clock.now();

        loop {
            let elapsed = self.clock.now().saturating_sub(started);
            let progress = travel::progress(elapsed, total);
            self.presenter
                .travel_progress(travel::position(from, to, progress));
            if progress >= 1.0 {
                break;
            }
            self.clock.sleep(frame.min(total.saturating_sub(elapsed))).await;
        }
    }

    async fn open_doors(&self) -> Result<Progress, SchedulerError> {
        match self.machine_state_now() {
            MachineState::DoorOpen => return Ok(Progress::Completed),
            MachineState::Idle => {}
            _ => return Ok(Progress::Waiting),
        }

        self.apply(Transition::OpenDoor)?;
        self.door.open().await.map_err(door_fault)?;
        self.render();
        self.clock.sleep(self.settle).await;
        self.door.confirm_open().await.map_err(door_fault)?;
        self.apply(Transition::Complete)?;
        Ok(Progress::Completed)
    }

    async fn close_doors(&self) -> Result<Progress, SchedulerError> {
        match self.machine_state_now() {
            MachineState::Idle => return Ok(Progress::Completed),
            MachineState::DoorOpen => {}
            _ => return Ok(Progress::Waiting),
        }

        self.apply(Transition::CloseDoor)?;
        self.door.close().await.map_err(door_fault)?;
        self.render();
        self.clock.sleep(self.settle).await;
        self.door.confirm_close().await.map_err(door_fault)?;
        self.apply(Transition::Complete)?;
        Ok(Progress::Completed)
    }
}
