//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::timeline::{Condition, Severity};

/// Root configuration for the probe monitor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MonitorConfig {
    /// Base ticker settings.
    pub scheduler: SchedulerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Subjects to sample.
    pub samplers: Vec<SamplerConfig>,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Base tick period in milliseconds. Must not exceed any sampler period.
    pub base_period_ms: u64,
}

impl SchedulerConfig {
    pub fn base_period(&self) -> Duration {
        Duration::from_millis(self.base_period_ms)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            base_period_ms: 1000,
        }
    }
}

/// One sampled subject, probed with a TCP connect check.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SamplerConfig {
    /// Subject identifier used in every condition.
    pub subject: String,

    /// Address to connect to (e.g., "127.0.0.1:5432").
    pub address: String,

    /// Sampling period in milliseconds.
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,

    /// Connect timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Number of consecutive failures before marking unhealthy.
    #[serde(default = "default_threshold")]
    pub unhealthy_threshold: u32,

    /// Number of consecutive successes before marking healthy.
    #[serde(default = "default_threshold")]
    pub healthy_threshold: u32,

    /// Severity of the ambient condition recorded while failing.
    #[serde(default = "default_severity")]
    pub severity: Severity,

    /// Message of the ambient condition recorded while failing.
    #[serde(default = "default_message")]
    pub message: String,
}

impl SamplerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Condition recorded for the length of each failure episode.
    pub fn ambient_condition(&self) -> Condition {
        Condition::new(self.severity, &self.subject, &self.message)
    }
}

fn default_period_ms() -> u64 {
    5000
}

fn default_timeout_ms() -> u64 {
    1000
}

fn default_threshold() -> u32 {
    1
}

fn default_severity() -> Severity {
    Severity::Error
}

fn default_message() -> String {
    "down".to_string()
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON.
    pub log_json: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_json: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
