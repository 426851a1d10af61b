//! Time capability injected into the door and the travel simulation.

use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Source of time and of waiting.
///
/// `now` is monotonic and measured from an arbitrary origin; only differences
/// between readings are meaningful.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Duration;

    /// Suspend the caller for `duration` without blocking other tasks.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// Wall-clock time backed by the tokio timer.
///
/// Honours `tokio::time::pause`, so paused-time tests run instantly.
#[derive(Clone, Debug)]
pub struct TokioClock {
    origin: tokio::time::Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Clock that advances instantly by exactly the requested amount on every sleep.
///
/// Clones share the same timeline, so a door and a scheduler built from clones of
/// one `VirtualClock` agree on the time.
///
/// # Example
///
/// ```rust
/// use liftstate::clock::{Clock, VirtualClock};
/// use std::time::Duration;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let clock = VirtualClock::new();
/// clock.sleep(Duration::from_millis(1500)).await;
/// assert_eq!(clock.now(), Duration::from_millis(1500));
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct VirtualClock {
    elapsed: Arc<Mutex<Duration>>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward without sleeping.
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        *self.elapsed.lock()
    }

    async fn sleep(&self, duration: Duration) {
        self.advance(duration);
        tokio::task::yield_now().await;
    }
}
