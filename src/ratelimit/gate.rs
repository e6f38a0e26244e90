//! The admission gate shared by all callers in the process.

use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::quota::Quota;
use super::window::{Decision, WindowState};
use crate::error::{DocgateError, Result};

/// Proof that a caller was admitted.
///
/// The slot is consumed the moment this value is produced; dropping it
/// does not give the slot back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// Start of the window the slot was taken from
    pub window_start: Instant,
    /// 1-based position of the slot inside its window
    pub position: u32,
}

/// Point-in-time view of the gate's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateSnapshot {
    /// Admissions granted in the current window
    pub count: u32,
    /// Slots still free in the current window
    pub remaining: u32,
    /// Time until the current window expires
    pub until_reset: Duration,
}

/// Fixed-window admission gate.
///
/// At most `quota.limit()` callers are admitted between two window resets.
/// The window resets lazily: the first caller that observes
/// `now - window_start >= window` zeroes the counter and starts a new
/// window at its own `now`. Because the window is fixed rather than
/// sliding, up to twice the limit may pass in a short span straddling a
/// reset.
///
/// Callers that find the window full sleep until it expires and then try
/// again. There is no queue: suspended callers are not admitted in FIFO
/// order, and any of them (or a newcomer) may win the next window.
///
/// The gate is meant to be shared behind an `Arc`.
#[derive(Debug)]
pub struct RateGate {
    quota: Quota,
    state: Mutex<WindowState>,
}

impl RateGate {
    /// Create a gate whose first window starts now.
    pub fn new(quota: Quota) -> Self {
        Self {
            quota,
            state: Mutex::new(WindowState::new(Instant::now())),
        }
    }

    /// Create a gate from a raw limit and window, validating both.
    pub fn with_limit(limit: u32, window: Duration) -> Result<Self> {
        Ok(Self::new(Quota::new(limit, window)?))
    }

    /// The quota this gate enforces.
    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Wait until a slot is free in the current window and reserve it.
    ///
    /// Dropping the returned future before it completes leaves the window
    /// untouched.
    pub async fn acquire(&self) -> Admission {
        loop {
            let retry_after = match self.try_acquire() {
                Ok(admission) => return admission,
                Err(retry_after) => retry_after,
            };

            debug!(
                wait_ms = retry_after.as_millis() as u64,
                limit = self.quota.limit(),
                "Rate limit window full, waiting for reset"
            );

            // The lock is released by now; re-check everything after waking.
            tokio::time::sleep(retry_after).await;
        }
    }

    /// Like [`acquire`](Self::acquire), but give up after `timeout`.
    pub async fn acquire_timeout(&self, timeout: Duration) -> Result<Admission> {
        match tokio::time::timeout(timeout, self.acquire()).await {
            Ok(admission) => Ok(admission),
            Err(_) => {
                debug!(timeout_ms = timeout.as_millis() as u64, "Admission wait timed out");
                Err(DocgateError::Cancelled)
            }
        }
    }

    /// Like [`acquire`](Self::acquire), but give up as soon as `cancel`
    /// completes.
    pub async fn acquire_until<F>(&self, cancel: F) -> Result<Admission>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            admission = self.acquire() => Ok(admission),
            _ = cancel => {
                debug!("Admission wait cancelled");
                Err(DocgateError::Cancelled)
            }
        }
    }

    /// Reserve a slot without waiting.
    ///
    /// Returns the time until the window resets when no slot is free.
    pub fn try_acquire(&self) -> std::result::Result<Admission, Duration> {
        let now = Instant::now();
        let mut state = self.state.lock();
        let decision = state.try_admit(now, &self.quota);

        trace!(
            count = state.count(),
            limit = self.quota.limit(),
            "Checked rate limit window"
        );

        match decision {
            Decision::Admitted {
                window_start,
                position,
            } => {
                debug!(position, limit = self.quota.limit(), "Admitted");
                Ok(Admission {
                    window_start,
                    position,
                })
            }
            Decision::Exhausted { retry_after } => Err(retry_after),
        }
    }

    /// Read the current window without modifying it.
    ///
    /// An expired window is reported as empty even though the reset itself
    /// only happens on the next admission attempt.
    pub fn snapshot(&self) -> GateSnapshot {
        let now = Instant::now();
        let state = self.state.lock();
        let (count, until_reset) = match state.time_until_reset(now, &self.quota) {
            left if left.is_zero() => (0, self.quota.window()),
            left => (state.count(), left),
        };

        GateSnapshot {
            count,
            remaining: self.quota.limit() - count,
            until_reset,
        }
    }
}
