//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Samplers and scheduler produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters and gauges)
//!
//! Consumers:
//!     → stderr / JSON log collectors
//!     → Prometheus scrape endpoint (optional)
//! ```

pub mod logging;
pub mod metrics;
