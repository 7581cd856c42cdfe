//! Timeline records.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::timeline::Condition;

/// Opaque handle to an interval owned by a [`Timeline`](crate::timeline::Timeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalId(pub(crate) usize);

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A condition plus the span during which it was in effect.
///
/// `to` is unset while the condition is still in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub from: DateTime<Utc>,
    pub to: Option<DateTime<Utc>>,
    pub condition: Condition,
}

impl Interval {
    pub fn is_open(&self) -> bool {
        self.to.is_none()
    }

    /// `to - from`, once closed.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.to.map(|to| to - self.from)
    }

    /// Whether `[from, to or now]` overlaps the window `[lower, upper)`.
    /// A `None` bound is unbounded on that side.
    pub(crate) fn overlaps(
        &self,
        lower: Option<DateTime<Utc>>,
        upper: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        let end = self.to.unwrap_or_else(|| now.max(self.from));
        let starts_before_upper = upper.map_or(true, |upper| self.from < upper);
        let ends_after_lower = lower.map_or(true, |lower| end >= lower);
        starts_before_upper && ends_after_lower
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to {
            Some(to) => write!(
                f,
                "{} [{} - {}]",
                self.condition,
                self.from.to_rfc3339(),
                to.to_rfc3339()
            ),
            None => write!(f, "{} [{} - open]", self.condition, self.from.to_rfc3339()),
        }
    }
}
