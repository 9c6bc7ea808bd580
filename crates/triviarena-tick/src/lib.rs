//! Fixed-period tick scheduler for Triviarena.
//!
//! The arena advances every battle, matchmakes and broadcasts once per
//! tick, one second apart by default. A late wake-up never fires a burst
//! of make-up ticks: the missed periods are counted and the cadence
//! restarts from the moment the tick actually ran.
//!
//! # Integration
//!
//! The scheduler lives inside the arena actor's `tokio::select!` loop:
//!
//! ```ignore
//! loop {
//!     tokio::select! {
//!         Some(cmd) = cmd_rx.recv() => { /* connection events */ }
//!         _ = scheduler.wait_for_tick() => {
//!             arena.step()?;
//!             scheduler.record_tick_end();
//!         }
//!     }
//! }
//! ```
//!
//! After [`TickScheduler::stop`], `wait_for_tick` pends forever and the
//! `select!` keeps serving its other branches.

use std::time::{Duration, Instant};

use tokio::time::{self, Instant as TokioInstant};
use tracing::{debug, trace, warn};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tick scheduler settings.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Time between two ticks.
    pub period: Duration,
    /// Share of the period (0.0 to 1.0) a step may take before a warning
    /// is logged.
    pub budget_warn_threshold: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            period: Self::DEFAULT_PERIOD,
            budget_warn_threshold: 0.80,
        }
    }
}

impl TickConfig {
    pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

    /// Shortest period accepted. Anything below is clamped.
    pub const MIN_PERIOD: Duration = Duration::from_millis(1);

    pub fn with_period(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Clamps out-of-range values. [`TickScheduler::new`] calls this.
    pub fn validated(mut self) -> Self {
        if self.period < Self::MIN_PERIOD {
            warn!(period = ?self.period, min = ?Self::MIN_PERIOD, "tick period too short, clamping");
            self.period = Self::MIN_PERIOD;
        }
        self.budget_warn_threshold = self.budget_warn_threshold.clamp(0.0, 1.0);
        self
    }
}

// ---------------------------------------------------------------------------
// Rescheduling
// ---------------------------------------------------------------------------

/// What a single wake-up looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickInfo {
    /// 1 for the first tick, then +1 per tick.
    pub number: u64,
    /// How far past its deadline the tick woke up.
    pub late_by: Duration,
    /// Late by more than a tenth of a period.
    pub overrun: bool,
    /// Whole periods that went by without a tick.
    pub skipped: u64,
}

/// Picks the deadline after a tick that was due at `due` and ran at `now`.
///
/// The next deadline is always one period after `now`, so however long a
/// stall lasts, the periods it swallowed are counted and dropped rather
/// than fired back to back. Returns the next deadline plus the lateness
/// figures for the tick that just ran.
fn reschedule(
    period: Duration,
    due: TokioInstant,
    now: TokioInstant,
) -> (TokioInstant, Duration, bool, u64) {
    let late_by = now.saturating_duration_since(due);
    let overrun = late_by > period / 10;
    let skipped = if overrun {
        (late_by.as_nanos() / period.as_nanos()) as u64
    } else {
        0
    };
    (now + period, late_by, overrun, skipped)
}

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Counters and step timings since the scheduler was created.
///
/// Step timings cover the span between a wake-up and the matching
/// [`TickScheduler::record_tick_end`], measured on the wall clock.
#[derive(Debug, Clone, Default)]
pub struct TickMetrics {
    pub ticks: u64,
    /// Wake-ups flagged as overruns.
    pub overruns: u64,
    /// Periods lost to late wake-ups.
    pub skipped: u64,
    /// Moving average of step time, weighting the newest step by 0.1.
    pub avg_step_time: Duration,
    pub max_step_time: Duration,
    /// Last step's share of the period. Above 1.0 the step outlasted it.
    pub utilization: f64,
}

impl TickMetrics {
    fn wake_up(&mut self, info: &TickInfo) {
        self.ticks += 1;
        self.overruns += u64::from(info.overrun);
        self.skipped += info.skipped;
    }

    fn step_finished(&mut self, elapsed: Duration, period: Duration) {
        const WEIGHT: f64 = 0.1;
        self.utilization = elapsed.as_secs_f64() / period.as_secs_f64();
        self.max_step_time = self.max_step_time.max(elapsed);
        let avg = self.avg_step_time.as_secs_f64() * (1.0 - WEIGHT) + elapsed.as_secs_f64() * WEIGHT;
        self.avg_step_time = Duration::from_secs_f64(avg);
    }
}

// ---------------------------------------------------------------------------
// Scheduler
// ---------------------------------------------------------------------------

/// Fixed-period tick source. One per arena actor.
pub struct TickScheduler {
    config: TickConfig,
    ticks: u64,
    /// `None` once stopped.
    due: Option<TokioInstant>,
    /// Wall-clock start of the step in progress.
    step_started: Option<Instant>,
    metrics: TickMetrics,
}

impl TickScheduler {
    /// The first tick is due one period from now.
    pub fn new(config: TickConfig) -> Self {
        let config = config.validated();
        debug!(period = ?config.period, "tick scheduler created");

        Self {
            due: Some(TokioInstant::now() + config.period),
            config,
            ticks: 0,
            step_started: None,
            metrics: TickMetrics::default(),
        }
    }

    pub fn with_period(period: Duration) -> Self {
        Self::new(TickConfig::with_period(period))
    }

    /// Sleeps until the next tick is due. Never resolves once stopped.
    pub async fn wait_for_tick(&mut self) -> TickInfo {
        let Some(due) = self.due else {
            return std::future::pending().await;
        };

        time::sleep_until(due).await;

        let (next, late_by, overrun, skipped) =
            reschedule(self.config.period, due, TokioInstant::now());
        self.due = Some(next);
        self.ticks += 1;
        self.step_started = Some(Instant::now());

        let info = TickInfo {
            number: self.ticks,
            late_by,
            overrun,
            skipped,
        };
        self.metrics.wake_up(&info);

        if overrun {
            warn!(
                tick = info.number,
                late = ?late_by,
                skipped,
                "tick woke up late"
            );
        } else {
            trace!(tick = info.number, "tick");
        }
        info
    }

    /// Marks the end of the current step. Warns when the step used more
    /// than the configured share of the period. No-op outside a step.
    pub fn record_tick_end(&mut self) {
        let Some(started) = self.step_started.take() else {
            return;
        };
        let elapsed = started.elapsed();
        self.metrics.step_finished(elapsed, self.config.period);

        if self.metrics.utilization >= self.config.budget_warn_threshold {
            warn!(
                tick = self.ticks,
                elapsed = ?elapsed,
                period = ?self.config.period,
                utilization = self.metrics.utilization,
                "tick step close to its period"
            );
        }
    }

    /// Stops ticking for good. Idempotent.
    pub fn stop(&mut self) {
        if self.due.take().is_some() {
            debug!(ticks = self.ticks, "tick scheduler stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.due.is_none()
    }

    /// Ticks fired so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    pub fn metrics(&self) -> &TickMetrics {
        &self.metrics
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }
}
