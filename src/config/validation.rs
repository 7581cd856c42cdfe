//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (periods > 0, thresholds >= 1)
//! - Check sampler periods against the base period
//! - Detect duplicate subjects and unparseable addresses
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: MonitorConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::MonitorConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("scheduler.base_period_ms must be greater than zero")]
    ZeroBasePeriod,

    #[error("sampler '{subject}': period_ms {period_ms} is shorter than base_period_ms {base_period_ms}")]
    PeriodBelowBase {
        subject: String,
        period_ms: u64,
        base_period_ms: u64,
    },

    #[error("sampler '{subject}': timeout_ms must be in 1..={period_ms}, got {timeout_ms}")]
    InvalidTimeout {
        subject: String,
        timeout_ms: u64,
        period_ms: u64,
    },

    #[error("sampler '{subject}': {field} must be at least 1")]
    ZeroThreshold { subject: String, field: &'static str },

    #[error("sampler '{subject}': invalid address '{address}'")]
    InvalidAddress { subject: String, address: String },

    #[error("sampler subject must not be empty")]
    EmptySubject,

    #[error("duplicate sampler subject '{0}'")]
    DuplicateSubject(String),

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &MonitorConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let base_period_ms = config.scheduler.base_period_ms;

    if base_period_ms == 0 {
        errors.push(ValidationError::ZeroBasePeriod);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let mut seen = HashSet::new();
    for sampler in &config.samplers {
        let subject = sampler.subject.clone();
        if subject.is_empty() {
            errors.push(ValidationError::EmptySubject);
        } else if !seen.insert(subject.clone()) {
            errors.push(ValidationError::DuplicateSubject(subject.clone()));
        }

        if sampler.period_ms < base_period_ms {
            errors.push(ValidationError::PeriodBelowBase {
                subject: subject.clone(),
                period_ms: sampler.period_ms,
                base_period_ms,
            });
        }

        if sampler.timeout_ms == 0 || sampler.timeout_ms > sampler.period_ms {
            errors.push(ValidationError::InvalidTimeout {
                subject: subject.clone(),
                timeout_ms: sampler.timeout_ms,
                period_ms: sampler.period_ms,
            });
        }

        for (field, value) in [
            ("unhealthy_threshold", sampler.unhealthy_threshold),
            ("healthy_threshold", sampler.healthy_threshold),
        ] {
            if value == 0 {
                errors.push(ValidationError::ZeroThreshold {
                    subject: subject.clone(),
                    field,
                });
            }
        }

        if sampler.address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                subject,
                address: sampler.address.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
