//! Factory and "admit, then invoke" combinators.
//!
//! The caller picks the throttle variant up front: [`Throttled`] wraps a
//! synchronous function with a [`BlockingThrottle`], [`ThrottledAsync`] wraps a
//! function returning a future with a [`SuspendingThrottle`]. Both keep the
//! wrapped function's input and wrap its output in [`ThrottlerResult`], so the
//! function's own errors come back untouched inside `Ok`.
//!
//! Every wrapper owns its throttle; two wrapped functions never share a
//! history or a lock.

use crate::blocking::BlockingThrottle;
use crate::error::ThrottlerResult;
use crate::suspending::SuspendingThrottle;
use crate::throttle_config::ThrottleConfig;
use std::future::Future;
use std::time::Duration;

/// Validate parameters and return a configuration ready to build either variant
pub fn throttle(
    calls: u32,
    period: Duration,
    raise_on_throttle: bool,
) -> ThrottlerResult<ThrottleConfig> {
    Ok(ThrottleConfig::new(calls, period)?.with_raise_on_throttle(raise_on_throttle))
}

/// A synchronous function guarded by a blocking throttle
#[derive(Debug)]
pub struct Throttled<F> {
    throttle: BlockingThrottle,
    func: F,
}

impl<F> Throttled<F> {
    pub fn new(config: ThrottleConfig, func: F) -> Self {
        Self {
            throttle: config.blocking(),
            func,
        }
    }

    /// Admit, then invoke the wrapped function with `args`
    pub fn call<A, R>(&self, args: A) -> ThrottlerResult<R>
    where
        F: Fn(A) -> R,
    {
        self.throttle.admit()?;
        Ok((self.func)(args))
    }

    pub fn throttle(&self) -> &BlockingThrottle {
        &self.throttle
    }
}

/// An async function guarded by a suspending throttle
#[derive(Debug)]
pub struct ThrottledAsync<F> {
    throttle: SuspendingThrottle,
    func: F,
}

impl<F> ThrottledAsync<F> {
    pub fn new(config: ThrottleConfig, func: F) -> Self {
        Self {
            throttle: config.suspending(),
            func,
        }
    }

    /// Admit, then invoke the wrapped function with `args` and await it
    pub async fn call<A, Fut>(&self, args: A) -> ThrottlerResult<Fut::Output>
    where
        F: Fn(A) -> Fut,
        Fut: Future,
    {
        self.throttle.admit().await?;
        Ok((self.func)(args).await)
    }

    pub fn throttle(&self) -> &SuspendingThrottle {
        &self.throttle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThrottlerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    #[test]
    fn test_factory_validates_eagerly() {
        assert!(matches!(
            throttle(0, Duration::from_secs(1), false),
            Err(ThrottlerError::ConfigurationError(_))
        ));
        assert!(matches!(
            throttle(1, Duration::ZERO, true),
            Err(ThrottlerError::ConfigurationError(_))
        ));

        let config = throttle(2, Duration::from_secs(1), true).unwrap();
        assert_eq!(config.calls(), 2);
        assert!(config.raise_on_throttle());
    }

    #[test]
    fn test_throttled_keeps_signature() {
        let config = throttle(2, Duration::from_secs(1), true).unwrap();
        let add = Throttled::new(config, |(a, b): (i32, i32)| a + b);

        assert_eq!(add.call((1, 2)), Ok(3));
        assert_eq!(add.call((3, 4)), Ok(7));
        assert!(matches!(
            add.call((5, 6)),
            Err(ThrottlerError::ThrottleExceeded { .. })
        ));
    }

    #[test]
    fn test_guarded_errors_pass_through() {
        let config = throttle(1, Duration::from_secs(1), false).unwrap();
        let parse = Throttled::new(config, |s: &str| s.parse::<u32>());

        let result = parse.call("nope").unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_rejected_call_does_not_run() {
        let invocations = AtomicUsize::new(0);
        let config = throttle(1, Duration::from_secs(1), true).unwrap();
        let counted = Throttled::new(config, |_: ()| invocations.fetch_add(1, Ordering::SeqCst));

        assert!(counted.call(()).is_ok());
        assert!(counted.call(()).is_err());
        assert_eq!(invocations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wrapped_functions_are_independent() {
        let config = throttle(1, Duration::from_secs(5), false).unwrap();
        let first = Throttled::new(config, |x: u8| x);
        let second = Throttled::new(config, |x: u8| x);

        let start = Instant::now();
        assert_eq!(first.call(1), Ok(1));
        assert_eq!(second.call(2), Ok(2));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_throttled_async() {
        let config = throttle(1, Duration::from_millis(500), false).unwrap();
        let double = ThrottledAsync::new(config, |x: u64| async move { x * 2 });

        let start = tokio::time::Instant::now();
        assert_eq!(double.call(2).await, Ok(4));
        assert_eq!(double.call(5).await, Ok(10));
        assert_eq!(start.elapsed(), Duration::from_millis(500));
        assert_eq!(double.throttle().metrics().admitted_calls, 2);
    }
}
