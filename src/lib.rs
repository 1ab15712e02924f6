//! Sliding-window call throttling.
//!
//! A throttle admits at most `calls` invocations of a guarded operation within
//! any sliding `period`. Pick [`BlockingThrottle`] for thread-based callers or
//! [`SuspendingThrottle`] for tokio tasks; both serialize admission behind a
//! lock held for the whole attempt, waits included.
//!
//! ```no_run
//! use call_throttle::{throttle, Throttled};
//! use std::time::Duration;
//!
//! let config = throttle(10, Duration::from_millis(100), false).unwrap();
//! let square = Throttled::new(config, |x: u64| x * x);
//! assert_eq!(square.call(4), Ok(16));
//! ```

pub mod algorithms;
pub mod blocking;
pub mod config;
pub mod config_validator;
pub mod error;
pub mod history;
pub mod metrics;
pub mod middleware;
pub mod suspending;
pub mod throttle_config;
pub mod throttler;

pub use algorithms::{AdmissionDecision, SlidingWindow};
pub use blocking::BlockingThrottle;
pub use error::{ThrottlerError, ThrottlerResult};
pub use history::CallHistory;
pub use metrics::ThrottleMetrics;
pub use middleware::{ThrottleLayer, ThrottleService};
pub use suspending::SuspendingThrottle;
pub use throttle_config::{ThrottleConfig, ThrottleSettings};
pub use throttler::{throttle, Throttled, ThrottledAsync};
