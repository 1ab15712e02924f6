//! Sliding window admission
//!
//! Keeps the exact timestamps of admitted calls. A call is admitted while fewer
//! than `calls` timestamps are younger than `period`; otherwise the caller
//! waits until the oldest timestamp ages out, or is rejected.

use super::AdmissionDecision;
use crate::history::CallHistory;
use crate::throttle_config::ThrottleConfig;
use std::time::Instant;
use tracing::trace;

/// Sliding window decision logic over a [`CallHistory`]
#[derive(Debug, Clone, Copy)]
pub struct SlidingWindow {
    config: ThrottleConfig,
}

impl SlidingWindow {
    pub fn new(config: ThrottleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Decide whether a call made at `now` may proceed.
    ///
    /// Expired entries are evicted first. `Allow` records `now` in the history;
    /// `WaitFor` and `Reject` leave the remaining entries untouched.
    pub fn decide(&self, history: &mut CallHistory, now: Instant) -> AdmissionDecision {
        let period = self.config.period();

        let evicted = history.evict_expired(now, period);
        if evicted > 0 {
            trace!(evicted, remaining = history.len(), "Evicted expired calls");
        }

        let oldest = match history.oldest() {
            Some(oldest) if history.len() >= self.config.calls() as usize => oldest,
            _ => {
                history.record(now);
                return AdmissionDecision::Allow;
            }
        };

        if self.config.raise_on_throttle() {
            return AdmissionDecision::Reject;
        }

        // Relative arithmetic: `oldest + period` overflows for very long periods
        let age = now.saturating_duration_since(oldest);
        AdmissionDecision::WaitFor(period.saturating_sub(age))
    }
}
