//! Probe Monitor
//!
//! Samples TCP reachability of configured subjects and dumps the resulting
//! condition timeline as JSON on exit.
//!
//! # Architecture Overview
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────┐
//!   │                      PROBE MONITOR                         │
//!   │                                                            │
//!   │  ┌───────────┐   due?   ┌───────────┐  open/close  ┌─────┐ │
//!   │  │ scheduler │─────────▶│  sampler  │─────────────▶│time-│ │
//!   │  │ base tick │          │ (per subj)│              │line │ │
//!   │  └───────────┘          └─────┬─────┘              └──┬──┘ │
//!   │                               │ probe                 │    │
//!   │                               ▼                       ▼    │
//!   │                         TCP connect             JSON dump  │
//!   └───────────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;

use probe_timeline::config::{load_config, MonitorConfig};
use probe_timeline::lifecycle::{signals, startup, Shutdown};
use probe_timeline::observability::{logging, metrics};
use probe_timeline::Result;

/// Probe Monitor - periodic health sampling with an interval timeline
#[derive(Parser, Debug)]
#[command(name = "probe-monitor", version, about, long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the timeline here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stop after this many seconds instead of waiting for a signal
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => MonitorConfig::default(),
    };

    let log_level = args
        .log_level
        .as_deref()
        .unwrap_or(&config.observability.log_level);
    logging::init_logging(log_level, args.log_json || config.observability.log_json);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "probe-monitor starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let scheduler = Arc::new(startup::build_scheduler(&config)?);
    if scheduler.sampler_count() == 0 {
        tracing::warn!("No samplers configured; the timeline will stay empty");
    }

    let shutdown = Shutdown::new();
    let mut run = {
        let scheduler = scheduler.clone();
        let signal = shutdown.subscribe();
        tokio::spawn(async move { scheduler.run(signal).await })
    };

    let deadline = async {
        match args.duration_secs {
            Some(secs) => {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                tracing::info!(secs, "Sampling duration elapsed");
            }
            None => std::future::pending::<()>().await,
        }
    };

    // The scheduler only finishes on its own after a probe defect.
    let finished = tokio::select! {
        joined = &mut run => Some(joined),
        _ = signals::wait_for_signal() => None,
        _ = deadline => None,
    };
    let joined = match finished {
        Some(joined) => joined,
        None => {
            shutdown.trigger();
            run.await
        }
    };

    let outcome = scheduler_outcome(joined);
    write_timeline(&scheduler.timeline(), args.output.as_ref())?;
    tracing::info!("Shutdown complete");
    outcome
}

/// Flatten the scheduler task's join result; a panicked task is an error.
fn scheduler_outcome(joined: std::result::Result<Result<()>, JoinError>) -> Result<()> {
    match joined {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "Scheduler task failed");
            Err(e.into())
        }
    }
}

fn write_timeline(
    timeline: &probe_timeline::Timeline,
    output: Option<&PathBuf>,
) -> Result<()> {
    let intervals = timeline.intervals();
    let open = intervals.iter().filter(|i| i.is_open()).count();
    tracing::info!(intervals = intervals.len(), open, "Writing timeline");

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &intervals)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
