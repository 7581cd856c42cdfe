//! Consecutive-count hysteresis over a raw pass/fail check.
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: consecutive failures >= unhealthy_threshold
//! Unhealthy → Healthy: consecutive successes >= healthy_threshold
//! ```
//!
//! Each transition emits one explicit condition; counters reset on transition.

use crate::health::probe::{Probe, Sample};
use crate::timeline::Condition;

/// A [`Probe`] that debounces a raw check with failure/success thresholds.
pub struct ThresholdProbe<C> {
    subject: String,
    check: C,
    unhealthy_threshold: u32,
    healthy_threshold: u32,
    consecutive_failures: u32,
    consecutive_successes: u32,
}

impl<C> ThresholdProbe<C>
where
    C: FnMut() -> Result<(), String> + Send,
{
    /// Thresholds below 1 are treated as 1.
    pub fn new(
        subject: impl Into<String>,
        check: C,
        unhealthy_threshold: u32,
        healthy_threshold: u32,
    ) -> Self {
        Self {
            subject: subject.into(),
            check,
            unhealthy_threshold: unhealthy_threshold.max(1),
            healthy_threshold: healthy_threshold.max(1),
            consecutive_failures: 0,
            consecutive_successes: 0,
        }
    }
}

impl<C> Probe for ThresholdProbe<C>
where
    C: FnMut() -> Result<(), String> + Send,
{
    fn sample(&mut self, previous_healthy: bool) -> Sample {
        match (self.check)() {
            Ok(()) => {
                self.consecutive_failures = 0;
                if previous_healthy {
                    return Sample::healthy();
                }

                self.consecutive_successes += 1;
                if self.consecutive_successes < self.healthy_threshold {
                    return Sample::unhealthy();
                }
                self.consecutive_successes = 0;
                Sample::healthy().with_condition(Condition::info(&self.subject, "recovered"))
            }
            Err(reason) => {
                self.consecutive_successes = 0;
                if !previous_healthy {
                    tracing::debug!(subject = %self.subject, %reason, "Check still failing");
                    return Sample::unhealthy();
                }

                self.consecutive_failures += 1;
                if self.consecutive_failures < self.unhealthy_threshold {
                    tracing::debug!(
                        subject = %self.subject,
                        failures = self.consecutive_failures,
                        %reason,
                        "Check failed below threshold"
                    );
                    return Sample::healthy();
                }
                self.consecutive_failures = 0;
                Sample::unhealthy()
                    .with_condition(Condition::error(&self.subject, format!("failing: {reason}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::Severity;
    use std::collections::VecDeque;

    fn scripted(results: &[bool]) -> impl FnMut() -> Result<(), String> + Send {
        let mut results: VecDeque<bool> = results.iter().copied().collect();
        move || match results.pop_front() {
            Some(false) => Err("connection refused".to_string()),
            _ => Ok(()),
        }
    }

    /// Feed each sample's health back in, the way a sampler does.
    fn drive(probe: &mut impl Probe, ticks: usize) -> Vec<Sample> {
        let mut previous = true;
        (0..ticks)
            .map(|_| {
                let sample = probe.sample(previous);
                previous = sample.healthy;
                sample
            })
            .collect()
    }

    #[test]
    fn test_unhealthy_after_threshold() {
        let mut probe = ThresholdProbe::new("db", scripted(&[false, false, false]), 3, 1);
        let samples = drive(&mut probe, 3);

        assert!(samples[0].healthy && samples[0].condition.is_none());
        assert!(samples[1].healthy && samples[1].condition.is_none());
        assert!(!samples[2].healthy);
        let condition = samples[2].condition.as_ref().unwrap();
        assert_eq!(condition.severity, Severity::Error);
        assert_eq!(condition.message, "failing: connection refused");
    }

    #[test]
    fn test_success_resets_failures() {
        let mut probe = ThresholdProbe::new("db", scripted(&[false, true, false, true]), 2, 1);
        assert!(drive(&mut probe, 4).iter().all(|s| s.healthy && s.condition.is_none()));
    }

    #[test]
    fn test_recovery_after_threshold() {
        let mut probe =
            ThresholdProbe::new("db", scripted(&[false, true, true, false, false]), 1, 2);
        let samples = drive(&mut probe, 5);

        assert!(!samples[0].healthy);
        assert!(!samples[1].healthy && samples[1].condition.is_none());
        assert!(samples[2].healthy);
        assert_eq!(samples[2].condition, Some(Condition::info("db", "recovered")));
        assert!(!samples[3].healthy);
        assert!(samples[3].condition.is_some());
        assert!(!samples[4].healthy && samples[4].condition.is_none());
    }

    #[test]
    fn test_zero_thresholds_act_as_one() {
        let mut probe = ThresholdProbe::new("db", scripted(&[false]), 0, 0);
        assert!(!probe.sample(true).healthy);
    }
}
