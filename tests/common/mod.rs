//! Shared utilities for sampling integration tests.

use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use probe_timeline::{Interval, Probe, Result, Sample, Scheduler, Shutdown};

/// A probe that replays `script` one sample per run, then reports healthy
/// and signals `done` on every further run.
pub fn scripted_probe(script: Vec<Sample>, done: mpsc::UnboundedSender<()>) -> impl Probe {
    let mut remaining: VecDeque<Sample> = script.into();
    move |_previous: bool| match remaining.pop_front() {
        Some(sample) => sample,
        None => {
            let _ = done.send(());
            Sample::healthy()
        }
    }
}

/// Run `scheduler` on a background task until `shutdown` fires.
pub fn spawn_scheduler(scheduler: &Arc<Scheduler>, shutdown: &Shutdown) -> JoinHandle<Result<()>> {
    let scheduler = scheduler.clone();
    let signal = shutdown.subscribe();
    tokio::spawn(async move { scheduler.run(signal).await })
}

/// Render intervals the way they are compared in assertions.
#[allow(dead_code)]
pub fn describe(intervals: &[Interval]) -> Vec<String> {
    intervals.iter().map(|i| i.condition.to_string()).collect()
}
