use crate::suspending::SuspendingThrottle;
use crate::throttle_config::ThrottleConfig;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{BoxError, Layer, Service};

/// Tower layer that admits every request through a shared [`SuspendingThrottle`]
#[derive(Debug, Clone)]
pub struct ThrottleLayer {
    throttle: Arc<SuspendingThrottle>,
}

impl ThrottleLayer {
    pub fn new(throttle: Arc<SuspendingThrottle>) -> Self {
        Self { throttle }
    }

    pub fn from_config(config: ThrottleConfig) -> Self {
        Self::new(Arc::new(config.suspending()))
    }

    pub fn throttle(&self) -> &Arc<SuspendingThrottle> {
        &self.throttle
    }
}

impl<S> Layer<S> for ThrottleLayer {
    type Service = ThrottleService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ThrottleService {
            inner,
            throttle: Arc::clone(&self.throttle),
        }
    }
}

/// Service produced by [`ThrottleLayer`].
///
/// Rejections surface as a boxed [`ThrottlerError`](crate::error::ThrottlerError);
/// errors from the inner service are boxed as-is and can be downcast.
#[derive(Debug, Clone)]
pub struct ThrottleService<S> {
    inner: S,
    throttle: Arc<SuspendingThrottle>,
}

impl<S, Request> Service<Request> for ThrottleService<S>
where
    S: Service<Request> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError>,
    Request: Send + 'static,
{
    type Response = S::Response;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // Keep the instance that was driven to readiness for this request
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let throttle = Arc::clone(&self.throttle);

        Box::pin(async move {
            throttle.admit().await?;
            inner.call(request).await.map_err(Into::into)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ThrottlerError;
    use crate::throttler::throttle;
    use std::convert::Infallible;
    use std::io;
    use std::time::Duration;
    use tokio::time::Instant;
    use tower::{service_fn, ServiceExt};

    #[tokio::test(start_paused = true)]
    async fn test_layer_waits_for_window() {
        let layer = ThrottleLayer::from_config(
            throttle(1, Duration::from_millis(1000), false).unwrap(),
        );
        let svc = layer.layer(service_fn(|x: u32| async move { Ok::<_, Infallible>(x + 1) }));

        let start = Instant::now();
        assert_eq!(svc.clone().oneshot(1).await.unwrap(), 2);
        assert_eq!(svc.clone().oneshot(2).await.unwrap(), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(1));
        assert_eq!(layer.throttle().metrics().admitted_calls, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_layer_rejects() {
        let layer = ThrottleLayer::from_config(
            throttle(1, Duration::from_millis(1000), true).unwrap(),
        );
        let svc = layer.layer(service_fn(|x: u32| async move { Ok::<_, Infallible>(x) }));

        svc.clone().oneshot(1).await.unwrap();
        let err = svc.clone().oneshot(2).await.unwrap_err();
        let err = err.downcast_ref::<ThrottlerError>().unwrap();
        assert!(err.is_throttle_exceeded());
    }

    #[tokio::test(start_paused = true)]
    async fn test_inner_error_is_preserved() {
        let layer = ThrottleLayer::from_config(
            throttle(5, Duration::from_millis(1000), false).unwrap(),
        );
        let svc = layer.layer(service_fn(|_: ()| async move {
            Err::<(), _>(io::Error::new(io::ErrorKind::Other, "backend down"))
        }));

        let err = svc.oneshot(()).await.unwrap_err();
        let err = err.downcast_ref::<io::Error>().unwrap();
        assert_eq!(err.to_string(), "backend down");
    }

    #[tokio::test(start_paused = true)]
    async fn test_services_share_the_layer_throttle() {
        let layer = ThrottleLayer::from_config(
            throttle(1, Duration::from_millis(1000), true).unwrap(),
        );
        let first = layer.layer(service_fn(|_: ()| async { Ok::<_, Infallible>("first") }));
        let second = layer.layer(service_fn(|_: ()| async { Ok::<_, Infallible>("second") }));

        assert_eq!(first.oneshot(()).await.unwrap(), "first");
        assert!(second.oneshot(()).await.is_err());
    }
}
