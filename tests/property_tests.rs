//! Property-based tests for the elevator core and scheduler.
//!
//! These tests use proptest to verify properties hold across
//! many randomly generated inputs.

use chrono::Utc;
use liftstate::clock::VirtualClock;
use liftstate::core::{DoorStatus, MachineState, State, StateHistory, StateTransition};
use liftstate::engine::{ElevatorTransitions, Transition, TransitionTable};
use liftstate::scheduler::{Action, DoorCommand, Scheduler, TracingPresenter};
use liftstate::travel::{ease_in_out_cubic, position, TravelTiming};
use liftstate::ElevatorConfig;
use proptest::prelude::*;
use std::time::Duration;

prop_compose! {
    fn arbitrary_state()(index in 0..MachineState::ALL.len()) -> MachineState {
        MachineState::ALL[index]
    }
}

prop_compose! {
    fn arbitrary_transition()(variant in 0..5u8, from in 1..=10u32, to in 1..=10u32) -> Transition {
        match variant {
            0 => Transition::MoveToFloor { from, to },
            1 => Transition::Arrive,
            2 => Transition::OpenDoor,
            3 => Transition::CloseDoor,
            _ => Transition::Complete,
        }
    }
}

#[derive(Clone, Debug)]
enum Request {
    Floor(u32),
    Door(DoorCommand),
    Tick,
}

fn arbitrary_request() -> impl Strategy<Value = Request> {
    prop_oneof![
        4 => (0..=11u32).prop_map(Request::Floor),
        1 => Just(Request::Door(DoorCommand::Open)),
        1 => Just(Request::Door(DoorCommand::Close)),
        2 => Just(Request::Tick),
    ]
}

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

proptest! {
    #[test]
    fn state_name_is_stable(state in arbitrary_state()) {
        prop_assert_eq!(state.name(), state.to_string());
    }

    #[test]
    fn table_is_deterministic(
        state in arbitrary_state(),
        transition in arbitrary_transition(),
        target in proptest::option::of(1..=10u32),
    ) {
        let table = ElevatorTransitions;
        prop_assert_eq!(
            table.steps(&state, &target, &transition),
            table.steps(&state, &target, &transition)
        );
    }

    #[test]
    fn moving_never_leads_straight_to_a_door_state(
        state in arbitrary_state(),
        transition in arbitrary_transition(),
    ) {
        prop_assume!(state.is_moving());
        if let Some(steps) = ElevatorTransitions.steps(&state, &Some(5), &transition) {
            for step in steps {
                prop_assert_eq!(step.state, MachineState::Idle);
            }
        }
    }

    #[test]
    fn door_open_is_only_reached_through_door_opening(
        state in arbitrary_state(),
        transition in arbitrary_transition(),
    ) {
        if let Some(steps) = ElevatorTransitions.steps(&state, &None, &transition) {
            if steps.iter().any(|step| step.state == MachineState::DoorOpen) {
                prop_assert_eq!(state, MachineState::DoorOpening);
            }
        }
    }

    #[test]
    fn travel_duration_matches_formula(distance in 1..200u32) {
        let timing = TravelTiming::default();
        let expected = (1000 + u64::from(distance - 1) * 300).min(3000);
        prop_assert_eq!(timing.duration_for(distance), Duration::from_millis(expected));
    }

    #[test]
    fn easing_stays_in_bounds_and_is_monotonic(a in 0.0..=1.0f64, b in 0.0..=1.0f64) {
        let (low, high) = if a <= b { (a, b) } else { (b, a) };
        let (eased_low, eased_high) = (ease_in_out_cubic(low), ease_in_out_cubic(high));
        prop_assert!((0.0..=1.0).contains(&eased_low));
        prop_assert!((0.0..=1.0).contains(&eased_high));
        prop_assert!(eased_low <= eased_high + 1e-12);
    }

    #[test]
    fn position_stays_between_endpoints(from in 1..=10u32, to in 1..=10u32, progress in 0.0..=1.0f64) {
        let at = position(from, to, progress);
        let (low, high) = (from.min(to) as f64, from.max(to) as f64);
        prop_assert!(at >= low - 1e-9 && at <= high + 1e-9);
    }

    #[test]
    fn history_never_exceeds_its_limit(limit in 0..8usize, steps in 0..32usize) {
        let mut history = StateHistory::with_limit(limit);
        for _ in 0..steps {
            history.record(StateTransition {
                from: MachineState::Idle,
                to: MachineState::DoorOpening,
                via: "openDoor".to_string(),
                timestamp: Utc::now(),
            });
        }
        prop_assert_eq!(history.len(), steps.min(limit));
    }

    #[test]
    fn at_most_one_move_is_ever_queued(requests in prop::collection::vec(arbitrary_request(), 1..40)) {
        block_on(async {
            let scheduler =
                Scheduler::simulated(ElevatorConfig::default(), TracingPresenter, VirtualClock::new())
                    .unwrap();

            for request in requests {
                match request {
                    Request::Floor(floor) => {
                        let before = scheduler.queue();
                        let at = scheduler.current_floor();
                        scheduler.enqueue_floor(floor);
                        if floor == at {
                            assert_eq!(scheduler.queue(), before);
                        }
                    }
                    Request::Door(command) => {
                        scheduler.enqueue_door(command);
                    }
                    Request::Tick => {
                        scheduler.tick().await;
                    }
                }

                let moves = scheduler.queue().iter().filter(|action| action.is_move()).count();
                assert!(moves <= 1, "{moves} moves queued");
            }
        });
    }

    #[test]
    fn draining_always_reaches_a_coherent_rest(requests in prop::collection::vec(arbitrary_request(), 1..20)) {
        block_on(async {
            let scheduler =
                Scheduler::simulated(ElevatorConfig::default(), TracingPresenter, VirtualClock::new())
                    .unwrap();

            for request in requests {
                match request {
                    Request::Floor(floor) => {
                        scheduler.request_floor(floor).await;
                    }
                    Request::Door(command) => {
                        scheduler.request_door(command).await;
                    }
                    Request::Tick => {
                        scheduler.tick().await;
                    }
                }

                assert!(scheduler.queue().is_empty());
                assert!(!scheduler.is_processing());
                match scheduler.machine_state() {
                    MachineState::Idle => assert_eq!(scheduler.door_status(), DoorStatus::Closed),
                    MachineState::DoorOpen => assert_eq!(scheduler.door_status(), DoorStatus::Open),
                    other => panic!("drain stopped in {other}"),
                }
                assert!(!scheduler.queue().contains(&Action::MoveToFloor { floor: 0 }));
            }
        });
    }
}
