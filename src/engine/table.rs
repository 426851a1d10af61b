//! Transition tables: the sole authority for legal state changes.

use crate::core::{Floor, MachineState, State};
use std::fmt::{self, Debug, Display};

/// One state update produced by a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<S, P> {
    pub state: S,
    pub payload: P,
}

impl<S, P> Step<S, P> {
    pub fn new(state: S, payload: P) -> Self {
        Self { state, payload }
    }
}

/// Lookup from `(current state, transition)` to the ordered steps it causes.
///
/// Implementations must be pure: the same inputs always yield the same steps and
/// nothing outside the returned value changes. `None` means the transition is not
/// legal from `current`.
pub trait TransitionTable: Send + Sync {
    type State: State;
    type Payload: Clone + Debug + Send + Sync;
    type Transition: Clone + Debug + Display + Send + Sync;

    fn steps(
        &self,
        current: &Self::State,
        payload: &Self::Payload,
        transition: &Self::Transition,
    ) -> Option<Vec<Step<Self::State, Self::Payload>>>;
}

/// Named operations on the elevator car.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Start travelling from `from` towards `to`.
    MoveToFloor { from: Floor, to: Floor },
    /// Travel finished.
    Arrive,
    /// Start opening the doors.
    OpenDoor,
    /// Start closing the doors.
    CloseDoor,
    /// The door motion in progress has been confirmed.
    Complete,
}

impl Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::MoveToFloor { .. } => "moveToFloor",
            Self::Arrive => "arrive",
            Self::OpenDoor => "openDoor",
            Self::CloseDoor => "closeDoor",
            Self::Complete => "complete",
        })
    }
}

/// Payload carried alongside the machine state: the floor the car is heading for or
/// has just reached.
pub type Target = Option<Floor>;

/// The elevator's adjacency table.
///
/// | from           | transition    | steps                         |
/// |----------------|---------------|-------------------------------|
/// | `Idle`         | `moveToFloor` | `MovingUp` or `MovingDown`    |
/// | `Idle`         | `openDoor`    | `DoorOpening`                 |
/// | `Moving*`      | `arrive`      | `Idle`                        |
/// | `DoorOpen`     | `closeDoor`   | `DoorClosing`                 |
/// | `DoorOpening`  | `complete`    | `DoorOpen`                    |
/// | `DoorClosing`  | `complete`    | `Idle`                        |
///
/// # Example
///
/// ```rust
/// use liftstate::core::MachineState;
/// use liftstate::engine::{ElevatorTransitions, Transition, TransitionTable};
///
/// let table = ElevatorTransitions;
/// let steps = table
///     .steps(&MachineState::Idle, &None, &Transition::MoveToFloor { from: 1, to: 4 })
///     .unwrap();
/// assert_eq!(steps[0].state, MachineState::MovingUp);
/// assert_eq!(steps[0].payload, Some(4));
///
/// assert!(table
///     .steps(&MachineState::Idle, &None, &Transition::CloseDoor)
///     .is_none());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ElevatorTransitions;

impl TransitionTable for ElevatorTransitions {
    type State = MachineState;
    type Payload = Target;
    type Transition = Transition;

    fn steps(
        &self,
        current: &MachineState,
        payload: &Target,
        transition: &Transition,
    ) -> Option<Vec<Step<MachineState, Target>>> {
        use MachineState::*;

        let steps = match (current, transition) {
            (Idle, Transition::MoveToFloor { from, to }) => {
                vec![Step::new(MachineState::heading(*from, *to)?, Some(*to))]
            }
            (Idle, Transition::OpenDoor) => vec![Step::new(DoorOpening, None)],
            (MovingUp | MovingDown, Transition::Arrive) => vec![Step::new(Idle, *payload)],
            (DoorOpen, Transition::CloseDoor) => vec![Step::new(DoorClosing, None)],
            (DoorOpening, Transition::Complete) => vec![Step::new(DoorOpen, None)],
            (DoorClosing, Transition::Complete) => vec![Step::new(Idle, None)],
            _ => return None,
        };
        Some(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_transitions() -> Vec<Transition> {
        vec![
            Transition::MoveToFloor { from: 2, to: 5 },
            Transition::MoveToFloor { from: 5, to: 2 },
            Transition::Arrive,
            Transition::OpenDoor,
            Transition::CloseDoor,
            Transition::Complete,
        ]
    }

    fn targets(state: MachineState, transition: Transition) -> Option<Vec<MachineState>> {
        ElevatorTransitions
            .steps(&state, &Some(5), &transition)
            .map(|steps| steps.into_iter().map(|s| s.state).collect())
    }

    #[test]
    fn move_picks_direction_from_floors() {
        assert_eq!(
            targets(MachineState::Idle, Transition::MoveToFloor { from: 2, to: 5 }),
            Some(vec![MachineState::MovingUp])
        );
        assert_eq!(
            targets(MachineState::Idle, Transition::MoveToFloor { from: 5, to: 2 }),
            Some(vec![MachineState::MovingDown])
        );
    }

    #[test]
    fn move_to_current_floor_is_absent() {
        assert_eq!(
            targets(MachineState::Idle, Transition::MoveToFloor { from: 3, to: 3 }),
            None
        );
    }

    #[test]
    fn arrive_returns_to_idle_and_keeps_target() {
        let steps = ElevatorTransitions
            .steps(&MachineState::MovingDown, &Some(2), &Transition::Arrive)
            .unwrap();
        assert_eq!(steps, vec![Step::new(MachineState::Idle, Some(2))]);
    }

    #[test]
    fn door_cycle_is_legal() {
        assert_eq!(
            targets(MachineState::Idle, Transition::OpenDoor),
            Some(vec![MachineState::DoorOpening])
        );
        assert_eq!(
            targets(MachineState::DoorOpening, Transition::Complete),
            Some(vec![MachineState::DoorOpen])
        );
        assert_eq!(
            targets(MachineState::DoorOpen, Transition::CloseDoor),
            Some(vec![MachineState::DoorClosing])
        );
        assert_eq!(
            targets(MachineState::DoorClosing, Transition::Complete),
            Some(vec![MachineState::Idle])
        );
    }

    #[test]
    fn table_has_eight_legal_pairs() {
        let legal = MachineState::ALL
            .iter()
            .flat_map(|state| all_transitions().into_iter().map(move |t| (*state, t)))
            .filter(|(state, t)| targets(*state, *t).is_some())
            .count();
        // Idle x {up, down, open}, Moving* x arrive, DoorOpen x close,
        // DoorOpening/DoorClosing x complete
        assert_eq!(legal, 8);
    }

    #[test]
    fn moving_states_reject_door_operations() {
        for state in [MachineState::MovingUp, MachineState::MovingDown] {
            assert!(targets(state, Transition::OpenDoor).is_none());
            assert!(targets(state, Transition::CloseDoor).is_none());
            assert!(targets(state, Transition::Complete).is_none());
        }
    }

    #[test]
    fn transition_names() {
        assert_eq!(Transition::MoveToFloor { from: 1, to: 2 }.to_string(), "moveToFloor");
        assert_eq!(Transition::Complete.to_string(), "complete");
    }
}
