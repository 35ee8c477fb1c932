//! Refresh scheduling: throttled manual refreshes and the background timer
//! that re-acquires rates once the cached table expires.

use chrono::{DateTime, TimeDelta, Utc};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_REFRESH_THROTTLE: Duration = Duration::from_secs(5);

/// Lets at most one call through per interval. Calls inside the window are
/// dropped, not queued.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn try_acquire(&mut self, now: Instant) -> bool {
        let allowed = self
            .last
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if allowed {
            self.last = Some(now);
        }
        allowed
    }
}

/// Time until a table fetched at `ts` expires, clamped at zero.
pub fn refresh_delay(ttl: Duration, ts: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    let remaining = ttl - now.signed_duration_since(ts);
    remaining.to_std().unwrap_or(Duration::ZERO)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Armed(Instant),
    Fired,
}

/// Background refresh timer.
///
/// Each newly observed acquisition timestamp re-arms the timer, replacing
/// any pending deadline.
#[derive(Debug)]
pub struct RefreshTimer {
    ttl: Duration,
    state: TimerState,
    armed_for: Option<DateTime<Utc>>,
}

impl RefreshTimer {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: TimerState::Idle,
            armed_for: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TimerState::Armed(deadline) => Some(deadline),
            _ => None,
        }
    }

    /// Records an acquisition timestamp. Returns `true` if the timer was
    /// (re)armed; repeated timestamps leave it untouched.
    pub fn observe(&mut self, ts: DateTime<Utc>, wall_now: DateTime<Utc>, now: Instant) -> bool {
        if self.armed_for == Some(ts) {
            return false;
        }
        let delay = refresh_delay(self.ttl, ts, wall_now);
        self.armed_for = Some(ts);
        self.state = TimerState::Armed(now + delay);
        debug!(?delay, "Background refresh armed");
        true
    }

    /// Transitions to `Fired` once the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Armed(deadline) if now >= deadline => {
                debug!("Background refresh fired");
                self.state = TimerState::Fired;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.state = TimerState::Idle;
        self.armed_for = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const HOUR: Duration = Duration::from_secs(3600);

    fn wall() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_throttle_drops_calls_within_window() {
        let start = Instant::now();
        let mut throttle = Throttle::new(Duration::from_secs(5));

        assert!(throttle.try_acquire(start));
        assert!(!throttle.try_acquire(start + Duration::from_secs(1)));
        assert!(!throttle.try_acquire(start + Duration::from_millis(4999)));
        assert!(throttle.try_acquire(start + Duration::from_secs(5)));
        assert!(!throttle.try_acquire(start + Duration::from_secs(6)));
    }

    #[test]
    fn test_refresh_delay() {
        let ts = wall();
        assert_eq!(refresh_delay(HOUR, ts, ts), HOUR);
        assert_eq!(
            refresh_delay(HOUR, ts, ts + TimeDelta::minutes(45)),
            Duration::from_secs(15 * 60)
        );
        assert_eq!(
            refresh_delay(HOUR, ts, ts + TimeDelta::minutes(90)),
            Duration::ZERO
        );
    }

    #[test]
    fn test_timer_arms_and_fires() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(HOUR);
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(!timer.poll(start));

        let ts = wall() - TimeDelta::minutes(50);
        assert!(timer.observe(ts, wall(), start));
        let deadline = start + Duration::from_secs(10 * 60);
        assert_eq!(timer.state(), TimerState::Armed(deadline));

        assert!(!timer.poll(start + Duration::from_secs(60)));
        assert!(timer.poll(deadline));
        assert_eq!(timer.state(), TimerState::Fired);
        assert!(!timer.poll(deadline + Duration::from_secs(1)));
    }

    #[test]
    fn test_timer_rearms_on_new_timestamp_only() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(HOUR);

        let old_ts = wall() - TimeDelta::minutes(59);
        assert!(timer.observe(old_ts, wall(), start));
        assert_eq!(timer.deadline(), Some(start + Duration::from_secs(60)));

        // Same timestamp again (e.g. a cache fallback) keeps the deadline
        assert!(!timer.observe(old_ts, wall(), start + Duration::from_secs(5)));
        assert_eq!(timer.deadline(), Some(start + Duration::from_secs(60)));

        // A fresher table replaces the pending deadline
        assert!(timer.observe(wall(), wall(), start));
        assert_eq!(timer.deadline(), Some(start + HOUR));
    }

    #[test]
    fn test_timer_expired_table_fires_immediately() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(HOUR);
        timer.observe(wall() - TimeDelta::hours(3), wall(), start);
        assert!(timer.poll(start));
    }

    #[test]
    fn test_timer_cancel() {
        let start = Instant::now();
        let mut timer = RefreshTimer::new(HOUR);
        timer.observe(wall(), wall(), start);
        timer.cancel();
        assert_eq!(timer.deadline(), None);
        assert!(!timer.poll(start + HOUR));
        // After cancelling, the same timestamp arms again
        assert!(timer.observe(wall(), wall(), start));
    }
}
