//! The car's physical position.

use crate::core::Floor;
use serde::{Deserialize, Serialize};

/// Where the car is parked. Updated only at the end of a completed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub current_floor: Floor,
    pub total_floors: Floor,
}

impl Car {
    pub fn new(current_floor: Floor, total_floors: Floor) -> Self {
        Self {
            current_floor,
            total_floors,
        }
    }

    /// Whether `floor` exists in this building.
    pub fn serves(&self, floor: Floor) -> bool {
        (1..=self.total_floors).contains(&floor)
    }
}
