use crate::algorithms::AdmissionDecision;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time counters for one throttle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThrottleMetrics {
    pub admitted_calls: u64,
    pub rejected_calls: u64,
    pub wait_rounds: u64,
}

impl ThrottleMetrics {
    /// Get the number of attempts that reached a final decision
    pub fn total_attempts(&self) -> u64 {
        self.admitted_calls + self.rejected_calls
    }
}

/// Counters owned by a throttle, updated as decisions are made
#[derive(Debug, Default)]
pub struct MetricsCollector {
    admitted_calls: AtomicU64,
    rejected_calls: AtomicU64,
    wait_rounds: AtomicU64,
}

impl MetricsCollector {
    /// Create a collector with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one decision; each wait round is counted separately
    pub fn record_decision(&self, decision: &AdmissionDecision) {
        let counter = match decision {
            AdmissionDecision::Allow => &self.admitted_calls,
            AdmissionDecision::Reject => &self.rejected_calls,
            AdmissionDecision::WaitFor(_) => &self.wait_rounds,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current counter values
    pub fn snapshot(&self) -> ThrottleMetrics {
        ThrottleMetrics {
            admitted_calls: self.admitted_calls.load(Ordering::Relaxed),
            rejected_calls: self.rejected_calls.load(Ordering::Relaxed),
            wait_rounds: self.wait_rounds.load(Ordering::Relaxed),
        }
    }
}
