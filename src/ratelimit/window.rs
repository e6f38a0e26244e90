//! Fixed-window accounting.
//!
//! `WindowState` is plain data: it holds no lock and never reads the clock.
//! The caller passes `now` in and keeps the state behind a single mutex so
//! that `window_start` and `count` always change together.

use std::time::Duration;
use tokio::time::Instant;

use super::quota::Quota;

/// Outcome of a single admission attempt against the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// A slot was reserved in the window that started at `window_start`.
    Admitted {
        /// Start of the window the slot belongs to
        window_start: Instant,
        /// 1-based position of the slot inside that window
        position: u32,
    },
    /// The window is full; it resets after `retry_after`.
    Exhausted {
        /// Time left until the current window expires
        retry_after: Duration,
    },
}

/// Counter and start timestamp of the current window.
#[derive(Debug, Clone)]
pub struct WindowState {
    /// When the current window started
    window_start: Instant,
    /// Admissions granted since `window_start`
    count: u32,
}

impl WindowState {
    /// Create an empty window starting at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            count: 0,
        }
    }

    /// Reset the window if it has expired at `now`.
    ///
    /// Returns `true` if a reset happened.
    pub fn maybe_reset(&mut self, now: Instant, quota: &Quota) -> bool {
        if now.saturating_duration_since(self.window_start) >= quota.window() {
            self.count = 0;
            self.window_start = now;
            true
        } else {
            false
        }
    }

    /// Reset if expired, then reserve a slot if one is left.
    pub fn try_admit(&mut self, now: Instant, quota: &Quota) -> Decision {
        self.maybe_reset(now, quota);

        assert!(
            self.count <= quota.limit(),
            "window count {} exceeds limit {}",
            self.count,
            quota.limit()
        );

        if self.count < quota.limit() {
            self.count += 1;
            Decision::Admitted {
                window_start: self.window_start,
                position: self.count,
            }
        } else {
            Decision::Exhausted {
                retry_after: self.time_until_reset(now, quota),
            }
        }
    }

    /// Time left until the current window expires, zero if it already has.
    pub fn time_until_reset(&self, now: Instant, quota: &Quota) -> Duration {
        let elapsed = now.saturating_duration_since(self.window_start);
        quota.window().saturating_sub(elapsed)
    }

    /// Admissions granted in the current window.
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Start of the current window.
    pub fn window_start(&self) -> Instant {
        self.window_start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quota(limit: u32, window_ms: u64) -> Quota {
        Quota::new(limit, Duration::from_millis(window_ms)).unwrap()
    }

    #[test]
    fn test_admits_up_to_limit() {
        let quota = quota(3, 100);
        let start = Instant::now();
        let mut state = WindowState::new(start);

        for expected in 1..=3 {
            match state.try_admit(start, &quota) {
                Decision::Admitted { position, window_start } => {
                    assert_eq!(position, expected);
                    assert_eq!(window_start, start);
                }
                other => panic!("expected admission, got {:?}", other),
            }
        }

        assert_eq!(
            state.try_admit(start, &quota),
            Decision::Exhausted {
                retry_after: Duration::from_millis(100)
            }
        );
        assert_eq!(state.count(), 3);
    }

    #[test]
    fn test_retry_after_shrinks_with_elapsed_time() {
        let quota = quota(1, 1000);
        let start = Instant::now();
        let mut state = WindowState::new(start);

        state.try_admit(start, &quota);
        let decision = state.try_admit(start + Duration::from_millis(400), &quota);
        assert_eq!(
            decision,
            Decision::Exhausted {
                retry_after: Duration::from_millis(600)
            }
        );
    }

    #[test]
    fn test_reset_at_exact_boundary() {
        let quota = quota(1, 100);
        let start = Instant::now();
        let mut state = WindowState::new(start);

        state.try_admit(start, &quota);
        let boundary = start + Duration::from_millis(100);
        match state.try_admit(boundary, &quota) {
            Decision::Admitted { window_start, position } => {
                assert_eq!(window_start, boundary);
                assert_eq!(position, 1);
            }
            other => panic!("expected admission after reset, got {:?}", other),
        }
    }

    #[test]
    fn test_reset_moves_start_to_now_not_boundary() {
        let quota = quota(2, 100);
        let start = Instant::now();
        let mut state = WindowState::new(start);

        state.try_admit(start, &quota);
        let late = start + Duration::from_millis(350);
        assert!(state.maybe_reset(late, &quota));
        assert_eq!(state.window_start(), late);
        assert_eq!(state.count(), 0);
        assert!(!state.maybe_reset(late + Duration::from_millis(99), &quota));
    }

    #[test]
    fn test_time_until_reset_saturates() {
        let quota = quota(1, 100);
        let start = Instant::now();
        let state = WindowState::new(start);
        assert_eq!(
            state.time_until_reset(start + Duration::from_secs(5), &quota),
            Duration::ZERO
        );
    }
}
