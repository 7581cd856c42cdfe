//! Probe capability consumed by samplers.

use crate::timeline::Condition;

/// Result of one probe invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Explicit condition to record as a new transition interval, if any.
    pub condition: Option<Condition>,
    /// Whether the subject is healthy after this sample.
    pub healthy: bool,
}

impl Sample {
    pub fn healthy() -> Self {
        Self {
            condition: None,
            healthy: true,
        }
    }

    pub fn unhealthy() -> Self {
        Self {
            condition: None,
            healthy: false,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }
}

/// A health check invoked with the previous health value.
///
/// Must return in bounded time: a probe that blocks stalls its scheduler.
pub trait Probe: Send {
    fn sample(&mut self, previous_healthy: bool) -> Sample;
}

impl<F> Probe for F
where
    F: FnMut(bool) -> Sample + Send,
{
    fn sample(&mut self, previous_healthy: bool) -> Sample {
        self(previous_healthy)
    }
}
