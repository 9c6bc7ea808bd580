//! Integration tests for the fixed-period tick scheduler.
//!
//! Uses `start_paused = true` so tokio time is virtual: `sleep_until`
//! resolves as soon as the runtime is idle, and `time::advance` simulates
//! a slow tick.

use std::time::Duration;

use tokio::time::Instant;
use triviarena_tick::{TickConfig, TickScheduler};

// =========================================================================
// Helpers
// =========================================================================

fn one_second() -> TickConfig {
    TickConfig::default()
}

// =========================================================================
// TickConfig
// =========================================================================

#[test]
fn test_default_config_is_one_second() {
    let cfg = TickConfig::default();
    assert_eq!(cfg.period, Duration::from_secs(1));
    assert_eq!(cfg.budget_warn_threshold, 0.80);
}

#[test]
fn test_with_period_sets_period() {
    let cfg = TickConfig::with_period(Duration::from_millis(50));
    assert_eq!(cfg.period, Duration::from_millis(50));
}

#[test]
fn test_validated_clamps_zero_period() {
    let cfg = TickConfig::with_period(Duration::ZERO).validated();
    assert_eq!(cfg.period, TickConfig::MIN_PERIOD);
}

#[test]
fn test_validated_clamps_threshold() {
    let cfg = TickConfig {
        budget_warn_threshold: 3.0,
        ..one_second()
    }
    .validated();
    assert_eq!(cfg.budget_warn_threshold, 1.0);
}

// =========================================================================
// Scheduler creation and accessors
// =========================================================================

#[tokio::test]
async fn test_scheduler_initial_state() {
    let s = TickScheduler::new(one_second());
    assert_eq!(s.tick_count(), 0);
    assert_eq!(s.period(), Duration::from_secs(1));
    assert!(!s.is_stopped());
}

#[tokio::test]
async fn test_with_period_constructor() {
    let s = TickScheduler::with_period(Duration::from_millis(100));
    assert_eq!(s.period(), Duration::from_millis(100));
}

// =========================================================================
// Tick firing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_tick_fires_after_one_period() {
    let start = Instant::now();
    let mut s = TickScheduler::new(one_second());

    let info = s.wait_for_tick().await;
    assert_eq!(info.number, 1);
    assert!(!info.overrun);
    assert_eq!(info.skipped, 0);
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_ticks_increment_monotonically() {
    let start = Instant::now();
    let mut s = TickScheduler::new(one_second());

    for expected in 1..=5 {
        let info = s.wait_for_tick().await;
        assert_eq!(info.number, expected);
    }
    assert_eq!(s.tick_count(), 5);
    assert_eq!(start.elapsed(), Duration::from_secs(5));
}

// =========================================================================
// Late wake-ups
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_skip_policy_does_not_compound_missed_ticks() {
    let mut s = TickScheduler::new(one_second());
    s.wait_for_tick().await;

    // The work for tick 1 takes 3.5 periods: tick 2 is 2.5 s late.
    tokio::time::advance(Duration::from_millis(3500)).await;
    let late = s.wait_for_tick().await;
    assert_eq!(late.number, 2);
    assert!(late.overrun);
    assert_eq!(late.skipped, 2);

    // Tick 3 is a full period after the late tick, not a burst.
    let resumed_at = Instant::now();
    let next = s.wait_for_tick().await;
    assert_eq!(next.number, 3);
    assert!(!next.overrun);
    assert_eq!(resumed_at.elapsed(), Duration::from_secs(1));

    assert_eq!(s.metrics().overruns, 1);
    assert_eq!(s.metrics().skipped, 2);
}

#[tokio::test(start_paused = true)]
async fn test_stall_never_fires_ticks_back_to_back() {
    let mut s = TickScheduler::new(one_second());
    s.wait_for_tick().await;

    tokio::time::advance(Duration::from_millis(3500)).await;
    s.wait_for_tick().await;

    // Every tick after the stall needs a full period of its own.
    for _ in 0..3 {
        let before = Instant::now();
        let info = s.wait_for_tick().await;
        assert_eq!(before.elapsed(), Duration::from_secs(1));
        assert_eq!(info.skipped, 0);
    }
    assert_eq!(s.tick_count(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_long_stall_is_counted_not_replayed() {
    let mut s = TickScheduler::new(one_second());
    s.wait_for_tick().await;

    tokio::time::advance(Duration::from_secs(60)).await;
    let late = s.wait_for_tick().await;
    assert_eq!(late.number, 2);
    assert_eq!(late.skipped, 59);
    assert_eq!(late.late_by, Duration::from_secs(59));
    assert_eq!(s.metrics().skipped, 59);
}

#[tokio::test(start_paused = true)]
async fn test_small_delay_is_not_an_overrun() {
    let mut s = TickScheduler::new(one_second());
    s.wait_for_tick().await;

    tokio::time::advance(Duration::from_millis(1050)).await;
    let info = s.wait_for_tick().await;
    assert!(!info.overrun, "5% late is within tolerance");
}

// =========================================================================
// Stop
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_stopped_scheduler_never_fires() {
    let mut s = TickScheduler::new(one_second());
    s.wait_for_tick().await;

    s.stop();
    assert!(s.is_stopped());

    let result = tokio::time::timeout(Duration::from_secs(10), s.wait_for_tick()).await;
    assert!(result.is_err(), "stopped scheduler should pend forever");
    assert_eq!(s.tick_count(), 1);
}

#[tokio::test]
async fn test_stop_is_idempotent() {
    let mut s = TickScheduler::new(one_second());
    s.stop();
    s.stop();
    assert!(s.is_stopped());
}

// =========================================================================
// Metrics
// =========================================================================

#[tokio::test]
async fn test_initial_metrics_are_zero() {
    let s = TickScheduler::new(one_second());
    let m = s.metrics();
    assert_eq!(m.ticks, 0);
    assert_eq!(m.overruns, 0);
    assert_eq!(m.skipped, 0);
    assert_eq!(m.avg_step_time, Duration::ZERO);
    assert_eq!(m.max_step_time, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_metrics_ticks_increments() {
    let mut s = TickScheduler::new(one_second());

    for _ in 0..3 {
        s.wait_for_tick().await;
        s.record_tick_end();
    }

    assert_eq!(s.metrics().ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn test_record_tick_end_without_wait_is_noop() {
    let mut s = TickScheduler::new(one_second());
    s.record_tick_end();
    assert_eq!(s.metrics().ticks, 0);
    assert_eq!(s.metrics().max_step_time, Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_utilization_tracks_real_work() {
    let mut s = TickScheduler::new(one_second());

    // record_tick_end measures wall-clock time, not tokio time.
    s.wait_for_tick().await;
    std::thread::sleep(Duration::from_micros(50));
    s.record_tick_end();

    let m = s.metrics();
    assert!(m.max_step_time > Duration::ZERO);
    assert!(m.utilization > 0.0);
    assert!(m.utilization < 1.0);
}

// =========================================================================
// select! loop pattern, as the arena actor uses it
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_select_loop_pattern() {
    let mut s = TickScheduler::new(one_second());
    let (tx, mut rx) = tokio::sync::mpsc::channel::<&str>(10);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(3500)).await;
        tx.send("shutdown").await.ok();
    });

    let mut ticks_fired = 0u64;
    loop {
        tokio::select! {
            Some(cmd) = rx.recv() => {
                assert_eq!(cmd, "shutdown");
                s.stop();
                break;
            }
            info = s.wait_for_tick() => {
                ticks_fired += 1;
                s.record_tick_end();
                assert_eq!(info.number, ticks_fired);
            }
        }
    }

    assert_eq!(ticks_fired, 3);
}
