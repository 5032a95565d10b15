//! Daily trigger scheduler.
//!
//! Armed state is a single spawned tokio task driven by a fixed-period
//! interval: the first tick lands on the next local midnight, then every
//! 24 hours after that. Nothing is persisted; a restart simply recomputes
//! the delay to the next midnight, so ticks missed during downtime are not
//! replayed.

use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use tokio::task::JoinHandle;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Floor for the computed initial delay. Guards against a degenerate
/// midnight computation (DST gap, clock skew) arming a tight loop.
const MIN_DELAY: Duration = Duration::from_secs(1);

/// Time remaining from `now` until the next local midnight, clamped to
/// `MIN_DELAY`.
pub fn delay_until_next_midnight(now: DateTime<Local>) -> Duration {
    let next_day = match now.date_naive().succ_opt() {
        Some(day) => day,
        None => return MIN_DELAY,
    };
    let naive_midnight = match next_day.and_hms_opt(0, 0, 0) {
        Some(naive) => naive,
        None => return MIN_DELAY,
    };
    // A DST gap can make local midnight ambiguous or nonexistent.
    let midnight = match now.timezone().from_local_datetime(&naive_midnight).earliest() {
        Some(midnight) => midnight,
        None => return MIN_DELAY,
    };
    match (midnight - now).to_std() {
        Ok(delay) if delay >= MIN_DELAY => delay,
        _ => MIN_DELAY,
    }
}

/// Recurring timer that drives the daily birthday pass.
///
/// Idle until `start*` is called, Armed afterwards. Re-arming cancels the
/// previously armed timer first, so at most one timer is ever counting
/// down.
pub struct DailyScheduler {
    handle: Option<JoinHandle<()>>,
}

impl DailyScheduler {
    pub fn new() -> Self {
        Self { handle: None }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Arm the timer: first fire after `initial_delay`, then every `period`.
    ///
    /// `tick` runs synchronously inside the timer task; the next fire is
    /// relative to the timer start, not to tick completion.
    pub fn start<F>(&mut self, initial_delay: Duration, period: Duration, mut tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();
        let handle = tokio::spawn(async move {
            let first = tokio::time::Instant::now() + initial_delay;
            let mut timer = tokio::time::interval_at(first, period);
            // A stalled process or host suspend must not replay missed
            // days as a back-to-back burst; one fire covers the resume.
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                timer.tick().await;
                tick();
            }
        });
        self.handle = Some(handle);
    }

    /// Arm for the next local midnight with a 24h period.
    pub fn start_daily<F>(&mut self, tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        let delay = delay_until_next_midnight(Local::now());
        log::info!(
            "Scheduler armed, first birthday check in {}s",
            delay.as_secs()
        );
        self.start(delay, DAY, tick);
    }

    /// Disarm. Safe to call when already idle.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Default for DailyScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DailyScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_delay_to_upcoming_midnight() {
        let now = Local.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap();
        let delay = delay_until_next_midnight(now);
        assert_eq!(delay, Duration::from_secs(30 * 60));
    }

    #[test]
    fn test_delay_at_start_of_day_is_full_day() {
        let now = Local.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let delay = delay_until_next_midnight(now);
        assert_eq!(delay, Duration::from_secs(24 * 60 * 60));
    }

    #[test]
    fn test_delay_never_degenerate() {
        let now = Local.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap();
        assert!(delay_until_next_midnight(now) >= MIN_DELAY);
    }

    #[test]
    fn test_sub_floor_gap_clamps_to_min_delay() {
        // 1ms short of midnight; the raw delta is below the floor and must
        // be clamped rather than arming a near-immediate fire.
        let now = Local.with_ymd_and_hms(2025, 6, 1, 23, 59, 59).unwrap()
            + chrono::Duration::milliseconds(999);
        assert_eq!(delay_until_next_midnight(now), MIN_DELAY);
    }

    #[tokio::test]
    async fn test_fires_on_initial_delay_then_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = DailyScheduler::new();

        let counter = count.clone();
        scheduler.start(
            Duration::from_millis(10),
            Duration::from_millis(25),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        assert!(scheduler.is_armed());

        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop();
        assert!(!scheduler.is_armed());

        let fired = count.load(Ordering::SeqCst);
        assert!(fired >= 2, "expected repeated fires, got {fired}");

        // Disarmed timers stay quiet.
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(count.load(Ordering::SeqCst), fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missed_ticks_collapse_to_one_fire() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = DailyScheduler::new();

        let counter = count.clone();
        scheduler.start(
            Duration::from_secs(60),
            Duration::from_secs(3600),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        // Let the spawned timer task register its interval against the
        // paused clock before time is advanced.
        tokio::task::yield_now().await;

        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        // The clock jumps three periods ahead, as after a host suspend.
        // The stale ticks must collapse into a single fire, not a burst.
        tokio::time::advance(Duration::from_secs(3 * 3600)).await;
        tokio::time::sleep(Duration::from_millis(1)).await;

        let fired = count.load(Ordering::SeqCst);
        assert_eq!(fired, 2, "missed ticks fired as a burst: {fired}");

        scheduler.stop();
    }

    #[tokio::test]
    async fn test_rearm_cancels_previous_timer() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let mut scheduler = DailyScheduler::new();

        let counter = first.clone();
        scheduler.start(Duration::from_millis(30), Duration::from_millis(30), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Re-arm before the first timer ever fires.
        let counter = second.clone();
        scheduler.start(Duration::from_millis(10), Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(80)).await;
        scheduler.stop();

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert!(second.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut scheduler = DailyScheduler::new();
        scheduler.stop();
        scheduler.start(Duration::from_millis(5), Duration::from_millis(5), || {});
        scheduler.stop();
        scheduler.stop();
        assert!(!scheduler.is_armed());
    }
}
