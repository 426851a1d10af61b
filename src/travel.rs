//! Travel duration policy and car position interpolation.

use crate::core::Floor;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timing constants for car travel, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TravelTiming {
    /// Duration of a one-floor trip.
    pub base_ms: u64,
    /// Added for every floor beyond the first.
    pub per_floor_ms: u64,
    /// Upper bound on any trip.
    pub max_ms: u64,
    /// Interval between position updates while travelling.
    pub frame_ms: u64,
}

impl Default for TravelTiming {
    fn default() -> Self {
        Self {
            base_ms: 1000,
            per_floor_ms: 300,
            max_ms: 3000,
            frame_ms: 16,
        }
    }
}

impl TravelTiming {
    /// Trip duration for `distance` floors: `min(base + (distance - 1) * per_floor, max)`.
    ///
    /// ```rust
    /// use liftstate::travel::TravelTiming;
    /// use std::time::Duration;
    ///
    /// let timing = TravelTiming::default();
    /// assert_eq!(timing.duration_for(1), Duration::from_millis(1000));
    /// assert_eq!(timing.duration_for(5), Duration::from_millis(2200));
    /// assert_eq!(timing.duration_for(20), Duration::from_millis(3000));
    /// ```
    pub fn duration_for(&self, distance: Floor) -> Duration {
        if distance == 0 {
            return Duration::ZERO;
        }
        let extra = u64::from(distance - 1).saturating_mul(self.per_floor_ms);
        let total = self.base_ms.saturating_add(extra).min(self.max_ms);
        Duration::from_millis(total)
    }

    /// Trip duration between two floors.
    pub fn between(&self, from: Floor, to: Floor) -> Duration {
        self.duration_for(from.abs_diff(to))
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

/// Ease-in-out cubic: `4x³` below one half, `1 - (-2x + 2)³ / 2` above.
pub fn ease_in_out_cubic(x: f64) -> f64 {
    if x < 0.5 {
        4.0 * x * x * x
    } else {
        1.0 - (-2.0 * x + 2.0).powi(3) / 2.0
    }
}

/// Fraction of the trip completed after `elapsed`, clamped to `[0, 1]`.
pub fn progress(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

/// Car position, in fractional floors, at `progress` through a trip.
pub fn position(from: Floor, to: Floor, progress: f64) -> f64 {
    let (start, target) = (f64::from(from), f64::from(to));
    start + (target - start) * ease_in_out_cubic(progress.clamp(0.0, 1.0))
}
