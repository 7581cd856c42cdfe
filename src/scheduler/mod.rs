//! Multi-rate sampling scheduler.
//!
//! # Data Flow
//! ```text
//! One base ticker (runner.rs)
//!     → for each registered sampler: now - last_run >= period ?
//!     → Sampler::tick (health/state.rs)
//!     → Timeline open/close
//! ```
//!
//! # Design Decisions
//! - One timer regardless of sampler count; jitter is at most one base tick
//! - Samplers run sequentially on the driving loop, never concurrently
//! - Cancellation leaves open intervals open

pub mod runner;

pub use runner::{SamplerId, Scheduler};
