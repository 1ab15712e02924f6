//! Throttle for async callers.
//!
//! Same admission loop as [`BlockingThrottle`](crate::blocking::BlockingThrottle),
//! but waiting suspends the task instead of blocking a thread. The async lock
//! stays held while the task is suspended, so other tasks using the same
//! throttle queue behind it while unrelated tasks keep running.
//!
//! Dropping the future returned by [`SuspendingThrottle::admit`] cancels the
//! attempt. Waiting never touches the history, so a cancelled attempt leaves it
//! exactly as it found it and the lock is released on drop.

use crate::algorithms::{AdmissionDecision, SlidingWindow};
use crate::error::ThrottlerResult;
use crate::history::CallHistory;
use crate::metrics::{MetricsCollector, ThrottleMetrics};
use crate::throttle_config::ThrottleConfig;
use std::future::Future;
use std::time::Instant as StdInstant;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct SuspendingThrottle {
    window: SlidingWindow,
    history: Mutex<CallHistory>,
    metrics: MetricsCollector,
}

// Tokio's clock, so paused test time drives both the sleeps and the history
fn now() -> StdInstant {
    Instant::now().into_std()
}

impl SuspendingThrottle {
    /// Create a new suspending throttle with an empty history
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            window: SlidingWindow::new(config),
            history: Mutex::new(CallHistory::new(config.calls() as usize)),
            metrics: MetricsCollector::new(),
        }
    }

    /// Get the configuration this throttle enforces
    pub fn config(&self) -> &ThrottleConfig {
        self.window.config()
    }

    /// Suspend the current task until the call is admitted.
    ///
    /// Returns `ThrottleExceeded` without waiting when the window is full and
    /// the throttle is configured to raise.
    pub async fn admit(&self) -> ThrottlerResult<()> {
        let mut history = self.history.lock().await;

        loop {
            let decision = self.window.decide(&mut history, now());
            self.metrics.record_decision(&decision);

            match decision {
                AdmissionDecision::Allow => {
                    debug!(calls = self.config().calls(), "Call admitted");
                    return Ok(());
                }
                AdmissionDecision::Reject => {
                    warn!(
                        calls = self.config().calls(),
                        period_ms = self.config().period().as_millis() as u64,
                        "Call rejected, throttle window is full"
                    );
                    return Err(self.config().exceeded());
                }
                AdmissionDecision::WaitFor(delay) => {
                    debug!(wait_ms = delay.as_millis() as u64, "Throttle window full, suspending");
                    sleep(delay).await;
                }
            }
        }
    }

    /// Admit, then await the future built by `f`. The lock is released first.
    pub async fn call<F, Fut>(&self, f: F) -> ThrottlerResult<Fut::Output>
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        self.admit().await?;
        Ok(f().await)
    }

    /// Number of admitted calls still inside the window
    pub async fn history_len(&self) -> usize {
        let mut history = self.history.lock().await;
        history.evict_expired(now(), self.config().period());
        history.len()
    }

    /// Get a snapshot of the admission counters
    pub fn metrics(&self) -> ThrottleMetrics {
        self.metrics.snapshot()
    }
}
