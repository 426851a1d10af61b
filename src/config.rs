//! Scheduler configuration.
//!
//! Every field has a default, so an empty JSON object is a complete configuration.
//! Validation accumulates every violation instead of stopping at the first one.

use crate::core::{Floor, DEFAULT_HISTORY_LIMIT};
use crate::door::DoorTiming;
use crate::travel::TravelTiming;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// A single problem found while validating an [`ElevatorConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigViolation {
    #[error("total_floors must be at least 1")]
    NoFloors,

    #[error("initial_floor {initial} is outside 1..={total}")]
    InitialFloorOutOfRange { initial: Floor, total: Floor },

    #[error("travel.base_ms must be greater than zero")]
    ZeroBaseTravel,

    #[error("travel.max_ms ({max}) is below travel.base_ms ({base})")]
    MaxBelowBase { base: u64, max: u64 },

    #[error("travel.frame_ms must be greater than zero")]
    ZeroFrame,

    #[error("tick_interval_ms must be greater than zero")]
    ZeroTick,
}

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {}", describe(.0))]
    Invalid(Vec<ConfigViolation>),
}

fn check(ok: bool, violation: ConfigViolation) -> Validation<(), NonEmptyVec<ConfigViolation>> {
    if ok {
        Validation::success(())
    } else {
        Validation::fail(violation)
    }
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Settings for one car and its scheduler.
///
/// # Example
///
/// ```rust
/// use liftstate::config::ElevatorConfig;
///
/// let config = ElevatorConfig::from_json_str(r#"{ "total_floors": 5, "dwell_ms": 2000 }"#)
///     .unwrap();
/// assert_eq!(config.total_floors, 5);
/// assert_eq!(config.initial_floor, 1);
/// assert_eq!(config.door.motion_ms, 1500);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevatorConfig {
    pub total_floors: Floor,
    pub initial_floor: Floor,
    pub tick_interval_ms: u64,
    pub door: DoorTiming,
    pub travel: TravelTiming,
    /// Time the doors stay open at an arrival floor. `None` closes them right away.
    pub dwell_ms: Option<u64>,
    pub history_limit: usize,
}

impl Default for ElevatorConfig {
    fn default() -> Self {
        Self {
            total_floors: 10,
            initial_floor: 1,
            tick_interval_ms: 1000,
            door: DoorTiming::default(),
            travel: TravelTiming::default(),
            dwell_ms: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ElevatorConfig {
    /// Default settings for a building with `total_floors` floors.
    pub fn new(total_floors: Floor) -> Self {
        Self {
            total_floors,
            ..Self::default()
        }
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validated()
    }

    /// Read, parse and validate a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check every constraint, accumulating all violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let checks = vec![
            check(self.total_floors >= 1, ConfigViolation::NoFloors),
            check(
                (1..=self.total_floors).contains(&self.initial_floor),
                ConfigViolation::InitialFloorOutOfRange {
                    initial: self.initial_floor,
                    total: self.total_floors,
                },
            ),
            check(self.travel.base_ms > 0, ConfigViolation::ZeroBaseTravel),
            check(
                self.travel.max_ms >= self.travel.base_ms,
                ConfigViolation::MaxBelowBase {
                    base: self.travel.base_ms,
                    max: self.travel.max_ms,
                },
            ),
            check(self.travel.frame_ms > 0, ConfigViolation::ZeroFrame),
            check(self.tick_interval_ms > 0, ConfigViolation::ZeroTick),
        ];

        Validation::all_vec(checks).map(|_| ())
    }

    /// Return `self` if valid, or every violation as a [`ConfigError::Invalid`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(()) => Ok(self),
            Validation::Failure(errors) => {
                Err(ConfigError::Invalid(errors.iter().cloned().collect()))
            }
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn dwell(&self) -> Option<Duration> {
        self.dwell_ms.map(Duration::from_millis)
    }
}
