//! State machine engine that replays transition table steps.

use crate::core::{State, StateHistory, StateTransition};
use crate::engine::table::TransitionTable;
use chrono::Utc;

/// Callback notified after every applied step.
pub type Subscriber<S, P> = Box<dyn Fn(&S, &P) + Send + Sync>;

/// Holds the current state and payload and executes named transitions.
///
/// Only one subscriber is active at a time; registering a new one replaces the
/// previous one.
pub struct StateMachine<T: TransitionTable> {
    table: T,
    current: T::State,
    payload: T::Payload,
    history: StateHistory<T::State>,
    subscriber: Option<Subscriber<T::State, T::Payload>>,
}

impl<T: TransitionTable> StateMachine<T> {
    /// Create a machine in `initial` with the given payload.
    pub fn new(table: T, initial: T::State, payload: T::Payload) -> Self {
        Self {
            table,
            current: initial,
            payload,
            history: StateHistory::new(),
            subscriber: None,
        }
    }

    /// Keep at most `limit` history records.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history = StateHistory::with_limit(limit);
        self
    }

    /// Get current state (pure)
    pub fn current_state(&self) -> &T::State {
        &self.current
    }

    /// Get current payload (pure)
    pub fn payload(&self) -> &T::Payload {
        &self.payload
    }

    /// Get state history (pure)
    pub fn history(&self) -> &StateHistory<T::State> {
        &self.history
    }

    /// Register the subscriber, replacing any previous one.
    pub fn subscribe<F>(&mut self, callback: F)
    where
        F: Fn(&T::State, &T::Payload) + Send + Sync + 'static,
    {
        self.subscriber = Some(Box::new(callback));
    }

    /// Remove the subscriber.
    pub fn unsubscribe(&mut self) {
        self.subscriber = None;
    }

    /// Whether `transition` is legal from the current state (pure).
    pub fn can_perform(&self, transition: &T::Transition) -> bool {
        self.table
            .steps(&self.current, &self.payload, transition)
            .is_some()
    }

    /// Execute `transition`, applying each of its steps in order.
    ///
    /// Every step updates the state and payload, is recorded in the history and is
    /// announced to the subscriber before the next step is applied. An illegal
    /// transition changes nothing. Returns the number of steps applied.
    pub fn perform_transition(&mut self, transition: &T::Transition) -> usize {
        let Some(steps) = self.table.steps(&self.current, &self.payload, transition) else {
            tracing::trace!(
                state = self.current.name(),
                %transition,
                "transition not available"
            );
            return 0;
        };

        let via = transition.to_string();
        let applied = steps.len();
        for step in steps {
            let from = std::mem::replace(&mut self.current, step.state);
            self.payload = step.payload;
            self.history.record(StateTransition {
                from,
                to: self.current.clone(),
                via: via.clone(),
                timestamp: Utc::now(),
            });
            if let Some(subscriber) = &self.subscriber {
                subscriber(&self.current, &self.payload);
            }
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MachineState;
    use crate::engine::table::{ElevatorTransitions, Step, Transition};
    use serde::{Deserialize, Serialize};
    use std::fmt;
    use std::sync::{Arc, Mutex};

    fn elevator() -> StateMachine<ElevatorTransitions> {
        StateMachine::new(ElevatorTransitions, MachineState::Idle, None)
    }

    #[test]
    fn illegal_transition_is_a_no_op() {
        let mut machine = elevator();
        assert!(!machine.can_perform(&Transition::CloseDoor));
        assert_eq!(machine.perform_transition(&Transition::CloseDoor), 0);
        assert_eq!(machine.current_state(), &MachineState::Idle);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn move_stores_target_payload() {
        let mut machine = elevator();
        let applied = machine.perform_transition(&Transition::MoveToFloor { from: 1, to: 6 });
        assert_eq!(applied, 1);
        assert_eq!(machine.current_state(), &MachineState::MovingUp);
        assert_eq!(machine.payload(), &Some(6));

        machine.perform_transition(&Transition::Arrive);
        assert_eq!(machine.current_state(), &MachineState::Idle);
        assert_eq!(machine.history().last().unwrap().via, "arrive");
    }

    #[test]
    fn subscriber_sees_every_step() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut machine = elevator();
        let sink = Arc::clone(&seen);
        machine.subscribe(move |state, _| sink.lock().unwrap().push(*state));

        machine.perform_transition(&Transition::OpenDoor);
        machine.perform_transition(&Transition::Complete);
        machine.perform_transition(&Transition::CloseDoor);
        machine.perform_transition(&Transition::Complete);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                MachineState::DoorOpening,
                MachineState::DoorOpen,
                MachineState::DoorClosing,
                MachineState::Idle,
            ]
        );
    }

    #[test]
    fn last_subscriber_wins() {
        let first = Arc::new(Mutex::new(0));
        let second = Arc::new(Mutex::new(0));
        let mut machine = elevator();

        let sink = Arc::clone(&first);
        machine.subscribe(move |_, _| *sink.lock().unwrap() += 1);
        let sink = Arc::clone(&second);
        machine.subscribe(move |_, _| *sink.lock().unwrap() += 1);

        machine.perform_transition(&Transition::OpenDoor);
        assert_eq!(*first.lock().unwrap(), 0);
        assert_eq!(*second.lock().unwrap(), 1);
    }

    #[test]
    fn history_limit_is_applied() {
        let mut machine = elevator().with_history_limit(1);
        machine.perform_transition(&Transition::OpenDoor);
        machine.perform_transition(&Transition::Complete);
        assert_eq!(machine.history().len(), 1);
        assert_eq!(machine.history().last().unwrap().to, MachineState::DoorOpen);
    }

    // A table whose single transition passes through an intermediate state, to show
    // that multi-step sequences are observable step by step.
    #[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
    enum Phase {
        Parked,
        Warming,
        Running,
    }

    impl State for Phase {
        fn name(&self) -> &str {
            match self {
                Self::Parked => "parked",
                Self::Warming => "warming",
                Self::Running => "running",
            }
        }
    }

    #[derive(Clone, Debug)]
    struct Start;

    impl fmt::Display for Start {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("start")
        }
    }

    struct PhaseTable;

    impl TransitionTable for PhaseTable {
        type State = Phase;
        type Payload = u8;
        type Transition = Start;

        fn steps(&self, current: &Phase, _: &u8, _: &Start) -> Option<Vec<Step<Phase, u8>>> {
            match current {
                Phase::Parked => Some(vec![
                    Step::new(Phase::Warming, 1),
                    Step::new(Phase::Running, 2),
                ]),
                _ => None,
            }
        }
    }

    #[test]
    fn multi_step_sequence_is_applied_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut machine = StateMachine::new(PhaseTable, Phase::Parked, 0);
        let sink = Arc::clone(&seen);
        machine.subscribe(move |state, payload| sink.lock().unwrap().push((*state, *payload)));

        assert_eq!(machine.perform_transition(&Start), 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(Phase::Warming, 1), (Phase::Running, 2)]
        );
        let path: Vec<_> = machine.history().get_path().into_iter().copied().collect();
        assert_eq!(path, vec![Phase::Parked, Phase::Warming, Phase::Running]);

        assert_eq!(machine.perform_transition(&Start), 0);
    }
}
