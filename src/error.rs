//! Error types for the probe monitor.

use thiserror::Error;

use crate::config::ConfigError;
use crate::scheduler::SamplerId;

/// Result type alias using [`MonitorError`].
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors surfaced by sampling, scheduling and the surrounding binary.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// A probe panicked instead of returning a sample.
    #[error("probe for {subject} failed: {message}")]
    ProbeDefect { subject: String, message: String },

    /// A sampler was registered with an unusable period.
    #[error("invalid sampling period for {subject}: {reason}")]
    InvalidPeriod { subject: String, reason: String },

    /// `run` was called while the scheduler was already running.
    #[error("scheduler is already running")]
    AlreadyRunning,

    /// The task driving the probes panicked or was cancelled.
    #[error("scheduler task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("unknown sampler: {0}")]
    UnknownSampler(SamplerId),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize timeline: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("metrics exporter error: {0}")]
    Metrics(String),
}
