//! Event timeline subsystem.
//!
//! # Data Flow
//! ```text
//! Sampler decision (open/close)
//!     → store.rs (append-only interval log)
//!     → query over [from, to)
//!     → ordered intervals for consumers
//!
//! Timestamps:
//!     clock.rs (one monotonic wall clock per timeline)
//! ```
//!
//! # Design Decisions
//! - Intervals are never removed; the log only grows
//! - Handles are indices, so the timeline stays the single writer of interval contents
//! - Query results are sorted by start time, ties kept in insertion order

pub mod clock;
pub mod condition;
pub mod interval;
pub mod store;

pub use clock::Clock;
pub use condition::{Condition, Severity};
pub use interval::{Interval, IntervalId};
pub use store::Timeline;

use chrono::{DateTime, Utc};

/// The "zero" timestamp. A query bound equal to it is unbounded on that side.
pub const ZERO: DateTime<Utc> = DateTime::<Utc>::UNIX_EPOCH;
