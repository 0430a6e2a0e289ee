//! Quota-based admission control
//!
//! Canvas meters requests against a refilling bucket and reports what is left
//! in the `X-Rate-Limit-Remaining` header of every response. The tracker keeps
//! the last observation, extrapolates forward at the refill rate, and charges
//! each in-flight request a preflight reserve so that a burst of concurrent
//! callers cannot all pass admission on the same stale number.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{Error, Result};

/// Longest single sleep of a blocked admitter before it re-checks the estimate
pub const MAX_ADMISSION_WAIT: Duration = Duration::from_secs(60);

/// Configuration for quota tracking
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Maximum quota the server grants
    pub capacity: f64,
    /// Quota units regained per second
    pub refill_rate: f64,
    /// Quota a request must be guaranteed before it may start
    pub preflight_reserve: f64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            capacity: 700.0,
            refill_rate: 10.0,
            preflight_reserve: 50.0,
        }
    }
}

impl QuotaConfig {
    /// Create a new quota config
    pub fn new(capacity: f64, refill_rate: f64, preflight_reserve: f64) -> Self {
        Self {
            capacity,
            refill_rate,
            preflight_reserve,
        }
    }

    /// Reject values that would make admission impossible or meaningless
    pub fn validate(&self) -> Result<()> {
        if !(self.capacity.is_finite() && self.capacity > 0.0) {
            return Err(Error::invalid_value("quota.capacity", "must be positive"));
        }
        if !(self.refill_rate.is_finite() && self.refill_rate > 0.0) {
            return Err(Error::invalid_value("quota.refill_rate", "must be positive"));
        }
        if !(self.preflight_reserve.is_finite() && self.preflight_reserve >= 0.0) {
            return Err(Error::invalid_value(
                "quota.preflight_reserve",
                "must not be negative",
            ));
        }
        if self.preflight_reserve > self.capacity {
            return Err(Error::invalid_value(
                "quota.preflight_reserve",
                format!("must not exceed capacity ({})", self.capacity),
            ));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct QuotaState {
    last_observed: f64,
    observed_at: Instant,
    pending: u32,
}

#[derive(Debug)]
struct Shared {
    config: QuotaConfig,
    state: Mutex<QuotaState>,
    updated: Notify,
}

/// Shared estimate of the server-side quota.
///
/// Cloning is cheap; clones share state.
#[derive(Debug, Clone)]
pub struct QuotaTracker {
    shared: Arc<Shared>,
}

impl QuotaTracker {
    /// Create a tracker that assumes a full bucket
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(QuotaState {
                    last_observed: config.capacity,
                    observed_at: Instant::now(),
                    pending: 0,
                }),
                updated: Notify::new(),
            }),
        }
    }

    /// The tracker's configuration
    pub fn config(&self) -> &QuotaConfig {
        &self.shared.config
    }

    /// Number of admitted requests that have not been released
    pub fn pending(&self) -> u32 {
        self.lock().pending
    }

    /// Current estimate of available quota
    pub fn estimate_available(&self) -> f64 {
        let state = self.lock();
        self.estimate(&state, Instant::now())
    }

    /// Wait until the estimate leaves room for one more request.
    ///
    /// The returned guard must be released (or dropped) once the exchange
    /// completes so the pending count stays accurate.
    pub async fn admit(&self) -> Admission {
        let reserve = self.shared.config.preflight_reserve;
        loop {
            // Register for wakeups before checking so an update that lands
            // between the check and the wait is not lost.
            let notified = self.shared.updated.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            let wait = {
                let mut state = self.lock();
                let available = self.estimate(&state, Instant::now());
                if available >= reserve {
                    state.pending += 1;
                    trace!(available, pending = state.pending, "Request admitted");
                    return Admission {
                        tracker: self.clone(),
                        released: false,
                    };
                }
                let wait = refill_wait(reserve - available, self.shared.config.refill_rate);
                debug!(
                    available,
                    pending = state.pending,
                    "Quota below reserve, waiting {:.3}s",
                    wait.as_secs_f64()
                );
                wait
            };

            tokio::select! {
                () = &mut notified => {}
                () = tokio::time::sleep(wait) => {}
            }
        }
    }

    /// Record a fresh quota observation and wake blocked admitters.
    ///
    /// The value is clamped to `[0, capacity]`.
    pub fn observe(&self, remaining: f64) {
        let remaining = remaining.clamp(0.0, self.shared.config.capacity);
        {
            let mut state = self.lock();
            state.last_observed = remaining;
            state.observed_at = Instant::now();
        }
        trace!(remaining, "Observed rate limit quota");
        self.shared.updated.notify_waiters();
    }

    fn finish(&self, observed: Option<f64>) {
        {
            let mut state = self.lock();
            state.pending = state.pending.saturating_sub(1);
        }
        match observed {
            Some(remaining) => self.observe(remaining),
            // A finished request frees its reserve even without feedback.
            None => self.shared.updated.notify_waiters(),
        }
    }

    fn estimate(&self, state: &QuotaState, now: Instant) -> f64 {
        let config = &self.shared.config;
        let elapsed = now.saturating_duration_since(state.observed_at).as_secs_f64();
        let refilled = (state.last_observed + config.refill_rate * elapsed).min(config.capacity);
        refilled - config.preflight_reserve * f64::from(state.pending)
    }

    fn lock(&self) -> MutexGuard<'_, QuotaState> {
        // Critical sections never panic, so a poisoned lock still holds valid state.
        self.shared
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Default for QuotaTracker {
    fn default() -> Self {
        Self::new(QuotaConfig::default())
    }
}

/// An admitted request's claim on the quota estimate.
///
/// Dropping the guard without calling [`Admission::release`] still decrements
/// the pending count, so an abandoned request future never leaks a reservation.
#[derive(Debug)]
pub struct Admission {
    tracker: QuotaTracker,
    released: bool,
}

impl Admission {
    /// Release the reservation, recording the server's remaining quota if known
    pub fn release(mut self, observed_remaining: Option<f64>) {
        self.released = true;
        self.tracker.finish(observed_remaining);
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if !self.released {
            self.tracker.finish(None);
        }
    }
}

/// Time for `deficit` to refill, capped at [`MAX_ADMISSION_WAIT`]
fn refill_wait(deficit: f64, refill_rate: f64) -> Duration {
    Duration::try_from_secs_f64(deficit / refill_rate)
        .map_or(MAX_ADMISSION_WAIT, |wait| wait.min(MAX_ADMISSION_WAIT))
}

/// Parse an `X-Rate-Limit-Remaining` header value
pub fn parse_remaining(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
