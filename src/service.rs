//! [tower] integration, flushing a collector after every request
//!
//! *this module requires the `service` feature flag*
//!
//! This is the asynchronous counterpart of [FlushMode::InvokeThenFlush](super::FlushMode): the
//! inner service always runs, and the collector is flushed once its future resolves successfully.
//!
//! # Example
//! ```ignore
//! let metrics = lambda_powertools_metrics::Builder::from_env().init()?;
//!
//! let service = tower::ServiceBuilder::new()
//!     .layer(LogMetricsLayer::new(metrics))
//!     .service_fn(function_handler);
//! ```

use super::collector::Collector;
use super::error::MetricsError;
use pin_project::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

/// [tower::Layer] wrapping services in a [LogMetricsService]
#[derive(Clone, Copy, Debug)]
pub struct LogMetricsLayer {
    metrics: &'static Collector,
}

impl LogMetricsLayer {
    pub fn new(metrics: &'static Collector) -> Self {
        Self { metrics }
    }
}

impl<S> tower::Layer<S> for LogMetricsLayer {
    type Service = LogMetricsService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        LogMetricsService::new(self.metrics, inner)
    }
}

/// [tower::Service] for automatically [flushing](super::Collector::flush()) after each request
#[derive(Clone, Debug)]
pub struct LogMetricsService<S> {
    metrics: &'static Collector,
    inner: S,
}

impl<S> LogMetricsService<S> {
    /// Constructs a new [LogMetricsService] with the given [Collector] and inner service to wrap
    pub fn new(metrics: &'static Collector, inner: S) -> Self {
        Self { metrics, inner }
    }
}

impl<S, Request> tower::Service<Request> for LogMetricsService<S>
where
    S: tower::Service<Request>,
    S::Error: From<MetricsError>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = LogMetricsFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        // Wrap the inner Future so we can flush after it's done
        LogMetricsFuture {
            metrics: self.metrics,
            inner: self.inner.call(req),
        }
    }
}

#[pin_project]
#[doc(hidden)]
pub struct LogMetricsFuture<F> {
    metrics: &'static Collector,
    #[pin]
    inner: F,
}

impl<F, Response, Error> Future for LogMetricsFuture<F>
where
    F: Future<Output = Result<Response, Error>>,
    Error: From<MetricsError>,
{
    type Output = Result<Response, Error>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        let response = match futures::ready!(this.inner.poll(cx)) {
            Ok(response) => response,
            Err(err) => return Poll::Ready(Err(err)),
        };

        // Flush our metrics after the inner service is finished
        Poll::Ready(this.metrics.flush().map(|()| response).map_err(Into::into))
    }
}
