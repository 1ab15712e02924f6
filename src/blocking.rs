//! Throttle for thread-based callers.
//!
//! Admission attempts are serialized by a re-entrant lock that stays held for
//! the whole attempt, including while the thread sleeps for the window to
//! free up. Concurrent callers of the same throttle therefore finish admission
//! strictly one after another, in lock order.

use crate::algorithms::{AdmissionDecision, SlidingWindow};
use crate::error::ThrottlerResult;
use crate::history::CallHistory;
use crate::metrics::{MetricsCollector, ThrottleMetrics};
use crate::throttle_config::ThrottleConfig;
use parking_lot::ReentrantMutex;
use std::cell::RefCell;
use std::thread;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug)]
pub struct BlockingThrottle {
    window: SlidingWindow,
    history: ReentrantMutex<RefCell<CallHistory>>,
    metrics: MetricsCollector,
}

impl BlockingThrottle {
    /// Create a new blocking throttle with an empty history
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            window: SlidingWindow::new(config),
            history: ReentrantMutex::new(RefCell::new(CallHistory::new(config.calls() as usize))),
            metrics: MetricsCollector::new(),
        }
    }

    /// Get the configuration this throttle enforces
    pub fn config(&self) -> &ThrottleConfig {
        self.window.config()
    }

    /// Block the current thread until the call is admitted.
    ///
    /// Returns `ThrottleExceeded` without waiting when the window is full and
    /// the throttle is configured to raise.
    pub fn admit(&self) -> ThrottlerResult<()> {
        let guard = self.history.lock();

        loop {
            let decision = {
                let mut history = guard.borrow_mut();
                self.window.decide(&mut history, Instant::now())
            };
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
                    debug!(wait_ms = delay.as_millis() as u64, "Throttle window full, blocking");
                    thread::sleep(delay);
                }
            }
        }
    }

    /// Admit, then run `f`. The lock is released before `f` starts.
    pub fn call<F, R>(&self, f: F) -> ThrottlerResult<R>
    where
        F: FnOnce() -> R,
    {
        self.admit()?;
        Ok(f())
    }

    /// Number of admitted calls still inside the window
    pub fn history_len(&self) -> usize {
        let guard = self.history.lock();
        let mut history = guard.borrow_mut();
        history.evict_expired(Instant::now(), self.config().period());
        history.len()
    }

    /// Get a snapshot of the admission counters
    pub fn metrics(&self) -> ThrottleMetrics {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThrottlerError;
    use std::sync::Arc;
    use std::time::Duration;

    fn throttle(calls: u32, millis: u64, raise: bool) -> BlockingThrottle {
        ThrottleConfig::new(calls, Duration::from_millis(millis))
            .unwrap()
            .with_raise_on_throttle(raise)
            .blocking()
    }

    #[test]
    fn test_admits_up_to_calls_immediately() {
        let throttle = throttle(3, 1000, false);
        let start = Instant::now();
        for _ in 0..3 {
            throttle.admit().unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(throttle.history_len(), 3);
    }

    #[test]
    fn test_second_call_waits() {
        let throttle = throttle(1, 200, false);
        throttle.admit().unwrap();

        let start = Instant::now();
        throttle.admit().unwrap();
        assert!(start.elapsed() >= Duration::from_millis(190));

        let metrics = throttle.metrics();
        assert_eq!(metrics.admitted_calls, 2);
        assert!(metrics.wait_rounds >= 1);
    }

    #[test]
    fn test_raise_on_throttle() {
        let throttle = throttle(1, 1000, true);
        throttle.admit().unwrap();

        let mut executed = false;
        let result = throttle.call(|| executed = true);
        assert!(matches!(result, Err(ThrottlerError::ThrottleExceeded { calls: 1, .. })));
        assert!(!executed);
        assert_eq!(throttle.history_len(), 1);
        assert_eq!(throttle.metrics().rejected_calls, 1);
    }

    #[test]
    fn test_call_returns_guarded_result() {
        let throttle = throttle(2, 1000, false);
        let ok: ThrottlerResult<Result<u32, String>> = throttle.call(|| Ok(7));
        assert_eq!(ok, Ok(Ok(7)));

        let err: ThrottlerResult<Result<u32, String>> = throttle.call(|| Err("boom".to_string()));
        assert_eq!(err, Ok(Err("boom".to_string())));
    }

    #[test]
    fn test_reentrant_lock_on_same_thread() {
        let throttle = throttle(2, 1000, false);
        let _outer = throttle.history.lock();
        // Same thread may take the guard again
        assert_eq!(throttle.history_len(), 0);
        throttle.admit().unwrap();
        assert_eq!(throttle.history_len(), 1);
    }

    #[test]
    fn test_threads_are_serialized() {
        let throttle = Arc::new(throttle(2, 150, false));
        let start = Instant::now();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let throttle = Arc::clone(&throttle);
                thread::spawn(move || {
                    throttle.admit().unwrap();
                    start.elapsed()
                })
            })
            .collect();

        let mut offsets: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        offsets.sort();

        assert!(offsets[1] < Duration::from_millis(100));
        assert!(offsets[2] >= Duration::from_millis(140));
        assert!(offsets[3] >= Duration::from_millis(140));
        assert_eq!(throttle.metrics().admitted_calls, 4);
    }
}
