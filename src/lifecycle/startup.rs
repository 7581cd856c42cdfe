//! Startup orchestration.
//!
//! # Responsibilities
//! - Turn a validated configuration into a scheduler
//! - Register one threshold-debounced TCP sampler per configured subject
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Samplers register in configuration order

use std::net::SocketAddr;

use crate::config::{ConfigError, MonitorConfig, SamplerConfig};
use crate::config::validation::ValidationError;
use crate::error::Result;
use crate::health::{TcpCheck, ThresholdProbe};
use crate::scheduler::{SamplerId, Scheduler};

/// Build a scheduler with every configured sampler registered.
pub fn build_scheduler(config: &MonitorConfig) -> Result<Scheduler> {
    let scheduler = Scheduler::new(config.scheduler.base_period());
    for sampler in &config.samplers {
        register_tcp_sampler(&scheduler, sampler)?;
    }
    tracing::info!(
        base_period_ms = config.scheduler.base_period_ms,
        samplers = scheduler.sampler_count(),
        "Scheduler built"
    );
    Ok(scheduler)
}

/// Register a TCP connect sampler described by `config`.
pub fn register_tcp_sampler(scheduler: &Scheduler, config: &SamplerConfig) -> Result<SamplerId> {
    let address: SocketAddr = config.address.parse().map_err(|_| {
        ConfigError::Validation(vec![ValidationError::InvalidAddress {
            subject: config.subject.clone(),
            address: config.address.clone(),
        }])
    })?;

    let check = TcpCheck::new(address, config.timeout());
    let probe = ThresholdProbe::new(
        &config.subject,
        check.into_check(),
        config.unhealthy_threshold,
        config.healthy_threshold,
    );
    scheduler.register_sampler(config.period(), probe, config.ambient_condition())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use crate::error::MonitorError;

    #[test]
    fn test_builds_one_sampler_per_entry() {
        let config = parse_config(
            r#"
            [scheduler]
            base_period_ms = 100

            [[samplers]]
            subject = "db"
            address = "127.0.0.1:5432"
            period_ms = 1000

            [[samplers]]
            subject = "cache"
            address = "127.0.0.1:6379"
            period_ms = 500
            timeout_ms = 200
            "#,
        )
        .unwrap();

        let scheduler = build_scheduler(&config).unwrap();
        assert_eq!(scheduler.sampler_count(), 2);
        assert_eq!(scheduler.base_period().as_millis(), 100);
    }

    #[test]
    fn test_unvalidated_bad_address_is_rejected() {
        let mut config = MonitorConfig::default();
        config.samplers.push(SamplerConfig {
            subject: "db".into(),
            address: "db.internal".into(),
            period_ms: 1000,
            timeout_ms: 100,
            unhealthy_threshold: 1,
            healthy_threshold: 1,
            severity: crate::timeline::Severity::Error,
            message: "down".into(),
        });
        let err = build_scheduler(&config).unwrap_err();
        assert!(matches!(err, MonitorError::Config(ConfigError::Validation(_))));
    }
}
