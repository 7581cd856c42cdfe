//! The driving loop.

use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task;
use tokio::time::{self, MissedTickBehavior};

use crate::error::{MonitorError, Result};
use crate::health::{HealthState, Probe, Sampler};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::timeline::{Condition, Timeline};

/// Smallest base period the ticker accepts.
const MIN_BASE_PERIOD: Duration = Duration::from_millis(1);

/// Handle returned by [`Scheduler::register_sampler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SamplerId(u64);

impl fmt::Display for SamplerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sampler-{}", self.0)
    }
}

/// A sampler shared between the registry and an in-flight tick.
/// `None` once deregistered.
type SamplerSlot = Arc<Mutex<Option<Sampler>>>;

/// Samplers picked for one base tick.
type DueBatch = Vec<(SamplerId, SamplerSlot)>;

struct Registration {
    id: SamplerId,
    period: TimeDelta,
    last_run: Option<DateTime<Utc>>,
    sampler: SamplerSlot,
}

impl Registration {
    fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.last_run.map_or(true, |last| now - last >= self.period)
    }
}

/// Runs every registered sampler at its own period off a single base ticker.
pub struct Scheduler {
    base_period: Duration,
    timeline: Timeline,
    samplers: Mutex<Vec<Registration>>,
    next_id: AtomicU64,
    running: AtomicBool,
}

impl Scheduler {
    /// Create a scheduler with a fresh timeline.
    pub fn new(base_period: Duration) -> Self {
        Self::with_timeline(base_period, Timeline::new())
    }

    /// Create a scheduler writing into an existing timeline.
    pub fn with_timeline(base_period: Duration, timeline: Timeline) -> Self {
        if base_period < MIN_BASE_PERIOD {
            tracing::warn!(?base_period, "Base period too short, using 1ms");
        }
        Self {
            base_period: base_period.max(MIN_BASE_PERIOD),
            timeline,
            samplers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            running: AtomicBool::new(false),
        }
    }

    pub fn base_period(&self) -> Duration {
        self.base_period
    }

    /// The timeline samplers write into.
    pub fn timeline(&self) -> Timeline {
        self.timeline.clone()
    }

    /// Register a probe sampled every `period`, recording `ambient_condition`
    /// for the length of each failure episode.
    ///
    /// Safe to call while running; the sampler first runs on the next base tick.
    pub fn register_sampler(
        &self,
        period: Duration,
        probe: impl Probe + 'static,
        ambient_condition: Condition,
    ) -> Result<SamplerId> {
        self.register(period, Sampler::new(probe, ambient_condition))
    }

    /// Register an already-built sampler.
    pub fn register(&self, period: Duration, sampler: Sampler) -> Result<SamplerId> {
        let subject = sampler.subject().to_string();
        if period.is_zero() {
            return Err(MonitorError::InvalidPeriod {
                subject,
                reason: "period must be greater than zero".to_string(),
            });
        }
        let period_delta = TimeDelta::from_std(period).map_err(|_| MonitorError::InvalidPeriod {
            subject: subject.clone(),
            reason: format!("period {period:?} is out of range"),
        })?;
        if period < self.base_period {
            tracing::warn!(
                subject = %subject,
                ?period,
                base_period = ?self.base_period,
                "Sampler period shorter than base period; it will run once per base tick"
            );
        }

        let id = SamplerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut samplers = self.samplers.lock().expect("scheduler mutex poisoned");
        samplers.push(Registration {
            id,
            period: period_delta,
            last_run: None,
            sampler: Arc::new(Mutex::new(Some(sampler))),
        });
        metrics::record_registered_samplers(samplers.len());
        tracing::info!(sampler = %id, subject = %subject, ?period, "Sampler registered");
        Ok(id)
    }

    /// Remove a sampler and close its open intervals now.
    ///
    /// Waits for the sampler's probe if a tick is running it.
    pub fn deregister(&self, id: SamplerId) -> Result<()> {
        let slot = {
            let mut samplers = self.samplers.lock().expect("scheduler mutex poisoned");
            let idx = samplers
                .iter()
                .position(|r| r.id == id)
                .ok_or(MonitorError::UnknownSampler(id))?;
            let registration = samplers.remove(idx);
            metrics::record_registered_samplers(samplers.len());
            registration.sampler
        };

        let sampler = slot.lock().expect("sampler mutex poisoned").take();
        if let Some(mut sampler) = sampler {
            sampler.close_all(self.timeline.now(), &self.timeline);
            tracing::info!(sampler = %id, subject = %sampler.subject(), "Sampler deregistered");
        }
        Ok(())
    }

    pub fn sampler_count(&self) -> usize {
        self.samplers.lock().expect("scheduler mutex poisoned").len()
    }

    /// Current health of a registered sampler.
    ///
    /// Waits for the sampler's probe if a tick is running it.
    pub fn state(&self, id: SamplerId) -> Option<HealthState> {
        let slot = self
            .samplers
            .lock()
            .expect("scheduler mutex poisoned")
            .iter()
            .find(|r| r.id == id)
            .map(|r| r.sampler.clone())?;
        let sampler = slot.lock().expect("sampler mutex poisoned");
        sampler.as_ref().map(Sampler::state)
    }

    /// Run every sampler that is due at `now`. Returns how many ran.
    ///
    /// A sampler whose probe panics is removed and its error returned;
    /// samplers after it in registration order do not run on this tick.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<usize> {
        let due = self.take_due(now);
        run_batch(&due, now, &self.timeline).map_err(|(id, e)| self.remove_defective(id, e))
    }

    /// Mark due samplers as run at `now` and hand them out.
    ///
    /// The registry lock is released before any probe runs.
    fn take_due(&self, now: DateTime<Utc>) -> DueBatch {
        let mut samplers = self.samplers.lock().expect("scheduler mutex poisoned");
        samplers
            .iter_mut()
            .filter(|r| r.is_due(now))
            .map(|r| {
                r.last_run = Some(now);
                (r.id, r.sampler.clone())
            })
            .collect()
    }

    fn remove_defective(&self, id: SamplerId, error: MonitorError) -> MonitorError {
        let mut samplers = self.samplers.lock().expect("scheduler mutex poisoned");
        samplers.retain(|r| r.id != id);
        metrics::record_registered_samplers(samplers.len());
        tracing::error!(sampler = %id, error = %error, "Probe defect, sampler removed");
        error
    }

    /// Drive the base ticker until `shutdown` fires.
    ///
    /// Intervals still open when shutdown is observed are left open.
    pub async fn run(&self, mut shutdown: ShutdownSignal) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(MonitorError::AlreadyRunning);
        }
        let _running = RunningGuard(&self.running);

        tracing::info!(
            base_period = ?self.base_period,
            samplers = self.sampler_count(),
            "Scheduler starting"
        );

        let mut ticker = time::interval(self.base_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Scheduler received shutdown signal, exiting loop");
                    break;
                }
                _ = ticker.tick() => {
                    let now = self.timeline.now();
                    let due = self.take_due(now);
                    if !due.is_empty() {
                        // Probes are synchronous and may block for their full timeout.
                        let timeline = self.timeline.clone();
                        task::spawn_blocking(move || run_batch(&due, now, &timeline))
                            .await?
                            .map_err(|(id, e)| self.remove_defective(id, e))?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("base_period", &self.base_period)
            .field("samplers", &self.sampler_count())
            .field("running", &self.running.load(Ordering::Relaxed))
            .finish()
    }
}

/// Tick each sampler in `due` at `now`, stopping at the first defect.
fn run_batch(
    due: &[(SamplerId, SamplerSlot)],
    now: DateTime<Utc>,
    timeline: &Timeline,
) -> std::result::Result<usize, (SamplerId, MonitorError)> {
    let mut ran = 0;
    for (id, slot) in due {
        let mut slot = slot.lock().expect("sampler mutex poisoned");
        // Deregistered since the batch was taken.
        let Some(sampler) = slot.as_mut() else {
            continue;
        };
        sampler.tick(now, timeline).map_err(|e| (*id, e))?;
        ran += 1;
    }
    Ok(ran)
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::Sample;
    use crate::lifecycle::Shutdown;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counting_probe(count: Arc<AtomicUsize>) -> impl Probe {
        move |_: bool| {
            count.fetch_add(1, Ordering::SeqCst);
            Sample::healthy()
        }
    }

    #[test]
    fn test_multi_rate_due_check() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        let fast = Arc::new(AtomicUsize::new(0));
        let slow = Arc::new(AtomicUsize::new(0));
        scheduler
            .register_sampler(
                Duration::from_millis(10),
                counting_probe(fast.clone()),
                Condition::error("fast", "down"),
            )
            .unwrap();
        scheduler
            .register_sampler(
                Duration::from_millis(30),
                counting_probe(slow.clone()),
                Condition::error("slow", "down"),
            )
            .unwrap();

        let start = scheduler.timeline().now();
        for n in 0..9 {
            scheduler.tick(start + TimeDelta::milliseconds(10 * n)).unwrap();
        }
        assert_eq!(fast.load(Ordering::SeqCst), 9);
        // Runs at 0, 30, 60.
        assert_eq!(slow.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_zero_period_rejected() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        let err = scheduler
            .register_sampler(
                Duration::ZERO,
                |_: bool| Sample::healthy(),
                Condition::error("x", "down"),
            )
            .unwrap_err();
        assert!(matches!(err, MonitorError::InvalidPeriod { .. }));
        assert_eq!(scheduler.sampler_count(), 0);
    }

    #[test]
    fn test_probe_defect_removes_sampler() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        scheduler
            .register_sampler(
                Duration::from_millis(10),
                |_: bool| -> Sample { panic!("boom") },
                Condition::error("broken", "down"),
            )
            .unwrap();
        let err = scheduler.tick(scheduler.timeline().now()).unwrap_err();
        assert!(
            matches!(err, MonitorError::ProbeDefect { ref subject, .. } if subject == "broken")
        );
        assert_eq!(scheduler.sampler_count(), 0);
    }

    #[test]
    fn test_deregister_closes_open_intervals() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        let id = scheduler
            .register_sampler(
                Duration::from_millis(10),
                |_: bool| Sample::unhealthy().with_condition(Condition::error("db", "dying")),
                Condition::error("db", "down"),
            )
            .unwrap();
        scheduler.tick(scheduler.timeline().now()).unwrap();
        assert_eq!(scheduler.state(id), Some(HealthState::Unhealthy));

        scheduler.deregister(id).unwrap();
        let intervals = scheduler.timeline().intervals();
        assert_eq!(intervals.len(), 2);
        assert!(intervals.iter().all(|i| !i.is_open()));
        assert!(matches!(scheduler.deregister(id), Err(MonitorError::UnknownSampler(_))));
    }

    #[test]
    fn test_deregistered_mid_tick_is_skipped() {
        let scheduler = Scheduler::new(Duration::from_millis(10));
        let count = Arc::new(AtomicUsize::new(0));
        let id = scheduler
            .register_sampler(
                Duration::from_millis(10),
                counting_probe(count.clone()),
                Condition::error("gone", "down"),
            )
            .unwrap();

        let now = scheduler.timeline().now();
        let due = scheduler.take_due(now);
        assert_eq!(due.len(), 1);
        scheduler.deregister(id).unwrap();

        assert_eq!(run_batch(&due, now, &scheduler.timeline).unwrap(), 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(scheduler.timeline().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_run_rejected() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_millis(5)));
        let shutdown = Shutdown::new();

        let first = {
            let scheduler = scheduler.clone();
            let signal = shutdown.subscribe();
            tokio::spawn(async move { scheduler.run(signal).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = scheduler.run(shutdown.subscribe()).await;
        assert!(matches!(second, Err(MonitorError::AlreadyRunning)));

        shutdown.trigger();
        first.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_register_while_running() {
        let scheduler = Arc::new(Scheduler::new(Duration::from_millis(5)));
        let shutdown = Shutdown::new();
        let handle = {
            let scheduler = scheduler.clone();
            let signal = shutdown.subscribe();
            tokio::spawn(async move { scheduler.run(signal).await })
        };
        tokio::time::sleep(Duration::from_millis(12)).await;

        let count = Arc::new(AtomicUsize::new(0));
        scheduler
            .register_sampler(
                Duration::from_millis(5),
                counting_probe(count.clone()),
                Condition::error("late", "down"),
            )
            .unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        shutdown.trigger();
        handle.await.unwrap().unwrap();
        assert!(count.load(Ordering::SeqCst) >= 3);
    }
}
