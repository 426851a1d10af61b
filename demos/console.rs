//! Console Elevator
//!
//! This example drives a ten-floor car in real time and prints every view the
//! scheduler renders.
//!
//! Key concepts:
//! - Requests queue actions; a drain executes them one at a time
//! - A ticker retries the queue so nothing is left behind
//! - Door requests and floor requests share the same FIFO
//!
//! Run with: cargo run --example console [config.json]
//! Set RUST_LOG=liftstate=debug to see every machine step.

use liftstate::clock::TokioClock;
use liftstate::scheduler::{CarView, DoorCommand, Presenter, Scheduler};
use liftstate::ElevatorConfig;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Prints a one-line shaft diagram per render.
struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn render(&self, view: &CarView) {
        let shaft: String = (1..=view.total_floors)
            .map(|floor| if floor == view.current_floor { '#' } else { '.' })
            .collect();
        println!(
            "[{shaft}] floor {:>2} | {:<12} | door {:<7} | queue: {}",
            view.current_floor,
            view.machine_state,
            view.door_status,
            view.queue.join(", ")
        );
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match ElevatorConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::error!(%path, %err, "could not load config");
                return ExitCode::FAILURE;
            }
        },
        None => ElevatorConfig::default(),
    };

    let scheduler = match Scheduler::simulated(config, ConsolePresenter, TokioClock::new()) {
        Ok(scheduler) => Arc::new(scheduler),
        Err(err) => {
            tracing::error!(%err, "invalid config");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Console Elevator ===\n");
    let ticker = scheduler.spawn_ticker();

    println!("\n-> request floor 5");
    scheduler.request_floor(5).await;

    println!("\n-> request floor 5 again (ignored)");
    let outcome = scheduler.request_floor(5).await;
    println!("   {outcome:?}");

    println!("\n-> hold the doors open, then ask for floor 2");
    scheduler.request_door(DoorCommand::Open).await;
    scheduler.enqueue_floor(2);
    scheduler.log_state();

    // Left to the ticker.
    tokio::time::sleep(Duration::from_secs(8)).await;

    scheduler.log_state();
    match scheduler.snapshot().to_json() {
        Ok(json) => println!("\n{json}"),
        Err(err) => tracing::warn!(%err, "snapshot failed"),
    }

    ticker.abort();
    ExitCode::SUCCESS
}
