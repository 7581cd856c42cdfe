//! Append-only interval store.
//!
//! # Responsibilities
//! - Open intervals and hand out index handles
//! - Close intervals by handle (idempotent)
//! - Answer `[from, to)` range queries
//!
//! # Design Decisions
//! - One `RwLock` guards the whole log, so a query never sees a half-written interval
//! - Insertion order is arrival order, never re-sorted by timestamp

use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::timeline::{Clock, Condition, Interval, IntervalId, ZERO};

/// A thread-safe, append-only log of intervals.
///
/// Cloning is cheap; clones share the same log and clock.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    inner: Arc<RwLock<Vec<Interval>>>,
    clock: Clock,
}

impl Timeline {
    /// Create an empty timeline with its own clock.
    pub fn new() -> Self {
        Self::with_clock(Clock::new())
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    /// Current time on this timeline's clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Open a new interval starting now.
    pub fn open(&self, condition: Condition) -> IntervalId {
        self.open_at(condition, self.now())
    }

    /// Open a new interval starting at `at`.
    pub fn open_at(&self, condition: Condition, at: DateTime<Utc>) -> IntervalId {
        let mut intervals = self.inner.write().expect("timeline lock poisoned");
        let id = IntervalId(intervals.len());
        tracing::debug!(interval = %id, condition = %condition, "Interval opened");
        intervals.push(Interval {
            from: at,
            to: None,
            condition,
        });
        id
    }

    /// Record an instantaneous observation as a closed, zero-length interval.
    pub fn record(&self, condition: Condition) -> IntervalId {
        let now = self.now();
        let mut intervals = self.inner.write().expect("timeline lock poisoned");
        let id = IntervalId(intervals.len());
        tracing::debug!(interval = %id, condition = %condition, "Point event recorded");
        intervals.push(Interval {
            from: now,
            to: Some(now),
            condition,
        });
        id
    }

    /// Close the referenced interval at `at`.
    ///
    /// Closing an unknown or already-closed interval is a no-op. A close time
    /// earlier than the start is clamped to the start.
    pub fn close(&self, id: IntervalId, at: DateTime<Utc>) {
        let mut intervals = self.inner.write().expect("timeline lock poisoned");
        let Some(interval) = intervals.get_mut(id.0) else {
            tracing::warn!(interval = %id, "Close requested for unknown interval");
            return;
        };
        if interval.to.is_some() {
            tracing::trace!(interval = %id, "Interval already closed");
            return;
        }
        interval.to = Some(at.max(interval.from));
        tracing::debug!(interval = %id, condition = %interval.condition, "Interval closed");
    }

    /// Snapshot of a single interval.
    pub fn get(&self, id: IntervalId) -> Option<Interval> {
        self.inner
            .read()
            .expect("timeline lock poisoned")
            .get(id.0)
            .cloned()
    }

    /// All intervals overlapping `[from, to)`, sorted by start time with ties
    /// in insertion order.
    ///
    /// A bound equal to [`ZERO`] is unbounded on that side, so `query(ZERO, ZERO)`
    /// returns the whole history. Open intervals extend to now.
    pub fn query(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<Interval> {
        let lower = (from != ZERO).then_some(from);
        let upper = (to != ZERO).then_some(to);
        if let (Some(lower), Some(upper)) = (lower, upper) {
            if lower >= upper {
                return Vec::new();
            }
        }

        let now = self.now();
        let mut matched: Vec<Interval> = self
            .inner
            .read()
            .expect("timeline lock poisoned")
            .iter()
            .filter(|interval| interval.overlaps(lower, upper, now))
            .cloned()
            .collect();
        // Stable sort keeps insertion order for equal start times.
        matched.sort_by_key(|interval| interval.from);
        matched
    }

    /// Every interval ever recorded.
    pub fn intervals(&self) -> Vec<Interval> {
        self.query(ZERO, ZERO)
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("timeline lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
