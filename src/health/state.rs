//! Per-subject hysteresis state machine.
//!
//! # States
//! - Healthy: no ambient interval open
//! - Unhealthy: one ambient interval open for the whole failure episode
//!
//! # Tick Order
//! ```text
//! 1. explicit condition? → close open transition interval, open a new one
//! 2. unhealthy           → open ambient interval unless one is already open
//! 3. healthy             → close ambient interval if open
//! 4. remember health for the next probe call
//! ```
//!
//! # Design Decisions
//! - Only explicit conditions open or close transition intervals
//! - The ambient interval's duration is the outage length
//! - A panicking probe is surfaced as an error, never absorbed

use chrono::{DateTime, Utc};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{MonitorError, Result};
use crate::health::probe::{Probe, Sample};
use crate::observability::metrics;
use crate::timeline::{Condition, IntervalId, Timeline};

/// Health state of a sampled subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

impl From<bool> for HealthState {
    fn from(healthy: bool) -> Self {
        if healthy {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        }
    }
}

/// One probe plus its interval bookkeeping.
pub struct Sampler {
    probe: Box<dyn Probe>,
    /// Condition recorded for the duration of each failure episode.
    ambient_condition: Condition,
    previous_healthy: bool,
    open_transition: Option<IntervalId>,
    open_ambient: Option<IntervalId>,
}

impl Sampler {
    pub fn new(probe: impl Probe + 'static, ambient_condition: Condition) -> Self {
        Self::from_boxed(Box::new(probe), ambient_condition)
    }

    pub fn from_boxed(probe: Box<dyn Probe>, ambient_condition: Condition) -> Self {
        Self {
            probe,
            ambient_condition,
            previous_healthy: true,
            open_transition: None,
            open_ambient: None,
        }
    }

    pub fn subject(&self) -> &str {
        &self.ambient_condition.subject
    }

    pub fn ambient_condition(&self) -> &Condition {
        &self.ambient_condition
    }

    pub fn state(&self) -> HealthState {
        self.previous_healthy.into()
    }

    /// Handle of the currently open transition interval.
    pub fn open_transition(&self) -> Option<IntervalId> {
        self.open_transition
    }

    /// Handle of the currently open ambient interval.
    pub fn open_ambient(&self) -> Option<IntervalId> {
        self.open_ambient
    }

    /// Run the probe once and apply the result to the timeline at `now`.
    pub fn tick(&mut self, now: DateTime<Utc>, timeline: &Timeline) -> Result<()> {
        let previous = self.previous_healthy;
        let sample = panic::catch_unwind(AssertUnwindSafe(|| self.probe.sample(previous)))
            .map_err(|payload| {
                metrics::record_probe_defect(self.subject());
                MonitorError::ProbeDefect {
                    subject: self.subject().to_string(),
                    message: panic_message(payload.as_ref()),
                }
            })?;

        self.apply(sample, now, timeline);
        Ok(())
    }

    fn apply(&mut self, sample: Sample, now: DateTime<Utc>, timeline: &Timeline) {
        let Sample { condition, healthy } = sample;
        metrics::record_sample(self.subject(), healthy);

        if let Some(condition) = condition {
            if let Some(id) = self.open_transition.take() {
                timeline.close(id, now);
            }
            tracing::info!(
                subject = %self.subject(),
                severity = %condition.severity,
                message = %condition.message,
                "Condition reported"
            );
            self.open_transition = Some(timeline.open_at(condition, now));
            metrics::record_interval_opened(self.subject(), "transition");
        }

        if healthy {
            if let Some(id) = self.open_ambient.take() {
                timeline.close(id, now);
                tracing::info!(subject = %self.subject(), "Subject recovered");
            }
        } else if self.open_ambient.is_none() {
            tracing::warn!(
                subject = %self.subject(),
                message = %self.ambient_condition.message,
                "Subject unhealthy"
            );
            self.open_ambient = Some(timeline.open_at(self.ambient_condition.clone(), now));
            metrics::record_interval_opened(self.subject(), "ambient");
        }

        self.previous_healthy = healthy;
    }

    /// Close both open intervals at `at`.
    pub fn close_all(&mut self, at: DateTime<Utc>, timeline: &Timeline) {
        if let Some(id) = self.open_transition.take() {
            timeline.close(id, at);
        }
        if let Some(id) = self.open_ambient.take() {
            timeline.close(id, at);
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("ambient_condition", &self.ambient_condition)
            .field("previous_healthy", &self.previous_healthy)
            .field("open_transition", &self.open_transition)
            .field("open_ambient", &self.open_ambient)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "probe panicked".to_string()
    }
}
