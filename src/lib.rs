//! Periodic health sampling into a queryable interval timeline.

pub mod config;
pub mod error;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod scheduler;
pub mod timeline;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result};
pub use health::{Probe, Sample};
pub use lifecycle::Shutdown;
pub use scheduler::{SamplerId, Scheduler};
pub use timeline::{Condition, Interval, Severity, Timeline};
