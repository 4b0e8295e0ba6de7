//! Sliding-window call limiter: at most N dispatches in any trailing 60 seconds.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use time::OffsetDateTime;
use tracing::debug;

const WINDOW_SECS: i64 = 60;

/// Per-client limiter. Each call is recorded at the instant it is allowed to
/// dispatch, so waiters sharing one limiter never overshoot the quota.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    window: time::Duration,
    calls: Mutex<VecDeque<OffsetDateTime>>,
}

impl RateLimiter {
    /// Limiter allowing `max_calls` per rolling minute (minimum 1).
    pub fn per_minute(max_calls: usize) -> Self {
        Self {
            max_calls: max_calls.max(1),
            window: time::Duration::seconds(WINDOW_SECS),
            calls: Mutex::new(VecDeque::new()),
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    /// Evict calls older than the window, compute the wait for a call arriving
    /// at `now`, and record the call at `now + wait`.
    pub fn reserve_at(&self, now: OffsetDateTime) -> Duration {
        let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        while let Some(&oldest) = calls.front() {
            if now - oldest >= self.window {
                calls.pop_front();
            } else {
                break;
            }
        }

        let mut wait = time::Duration::ZERO;
        if calls.len() >= self.max_calls {
            // With a single caller this is the oldest entry; with waiters
            // queued behind it, the N-th most recent one gates the slot.
            let gate = calls[calls.len() - self.max_calls];
            // A wall clock stepped backwards leaves entries in the future;
            // no single wait exceeds one window.
            let remaining = (self.window - (now - gate)).min(self.window);
            if remaining.is_positive() {
                wait = remaining;
            }
        }
        calls.push_back(now + wait);
        wait.unsigned_abs()
    }

    /// Wait until a call may be dispatched, then return.
    pub async fn acquire(&self) {
        let wait = self.reserve_at(OffsetDateTime::now_utc());
        if !wait.is_zero() {
            debug!(
                wait_ms = wait.as_millis() as u64,
                max_calls = self.max_calls,
                "rate limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Calls recorded within the window ending at `now`.
    pub fn calls_in_window(&self, now: OffsetDateTime) -> usize {
        let calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
        calls
            .iter()
            .filter(|&&t| now - t < self.window && t <= now)
            .count()
    }
}
