//! Monotonic wall clock.

use chrono::{DateTime, TimeDelta, Utc};
use tokio::time::Instant;

/// A wall clock that never goes backwards.
///
/// Anchored at a single `Utc::now()` reading and advanced by monotonic elapsed
/// time. Uses tokio's `Instant`, so a paused test runtime drives it too.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    wall_origin: DateTime<Utc>,
    origin: Instant,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            wall_origin: Utc::now(),
            origin: Instant::now(),
        }
    }

    /// Current time.
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = TimeDelta::from_std(self.origin.elapsed()).unwrap_or(TimeDelta::MAX);
        self.wall_origin
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
