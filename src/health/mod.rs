//! Health sampling subsystem.
//!
//! # Data Flow
//! ```text
//! Raw checks (active.rs):
//!     TCP connect with timeout
//!     → threshold.rs (consecutive-count hysteresis)
//!     → Sample { condition, healthy }
//!
//! Probe contract (probe.rs):
//!     previous health → Sample
//!
//! State machine (state.rs):
//!     Healthy ←→ Unhealthy
//!     Explicit conditions → transition intervals
//!     Unhealthy episodes → one ambient interval each
//! ```
//!
//! # Design Decisions
//! - Samplers own their state exclusively; only the timeline is shared
//! - Probes are synchronous and must return in bounded time

pub mod active;
pub mod probe;
pub mod state;
pub mod threshold;

pub use active::TcpCheck;
pub use probe::{Probe, Sample};
pub use state::{HealthState, Sampler};
pub use threshold::ThresholdProbe;
