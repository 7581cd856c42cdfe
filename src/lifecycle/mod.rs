//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     MonitorConfig → Scheduler with one TCP sampler per subject
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every ShutdownSignal wakes
//!     → scheduler stops at the next base-tick boundary
//! ```
//!
//! # Design Decisions
//! - Cancellation is cooperative; in-flight probes are never interrupted
//! - Open intervals stay open on shutdown

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::{Shutdown, ShutdownSignal};
