//! Metrics collection and exposition.
//!
//! # Metrics
//! - `probe_samples_total` (counter): probe results by subject, healthy
//! - `probe_intervals_opened_total` (counter): intervals opened by subject, kind
//! - `probe_defects_total` (counter): panicking probes by subject
//! - `probe_subject_healthy` (gauge): 1=healthy, 0=unhealthy
//! - `probe_registered_samplers` (gauge): samplers in the scheduler
//!
//! # Design Decisions
//! - Recording is a no-op until an exporter is installed
//! - Labels are bounded by the number of configured subjects

use metrics::{counter, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

use crate::error::{MonitorError, Result};

/// Install the Prometheus exporter with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| MonitorError::Metrics(e.to_string()))?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_sample(subject: &str, healthy: bool) {
    counter!(
        "probe_samples_total",
        "subject" => subject.to_string(),
        "healthy" => healthy.to_string()
    )
    .increment(1);
    gauge!("probe_subject_healthy", "subject" => subject.to_string())
        .set(if healthy { 1.0 } else { 0.0 });
}

pub fn record_interval_opened(subject: &str, kind: &'static str) {
    counter!(
        "probe_intervals_opened_total",
        "subject" => subject.to_string(),
        "kind" => kind
    )
    .increment(1);
}

pub fn record_probe_defect(subject: &str) {
    counter!("probe_defects_total", "subject" => subject.to_string()).increment(1);
}

pub fn record_registered_samplers(count: usize) {
    gauge!("probe_registered_samplers").set(count as f64);
}
