//! # Log Metrics
//!
//! Wraps a handler so the collector is flushed around each call
//!
//! # Example
//! ```
//! use lambda_powertools_metrics::{Builder, FlushMode, MetricsError};
//!
//! let metrics = Builder::new()
//!     .cloudwatch_namespace("ServerlessAirline")
//!     .with_writer(std::io::sink())
//!     .build();
//!
//! let mut handler = metrics.log_metrics(FlushMode::InvokeThenFlush, |booking_id: u32| {
//!     metrics.add_dimension("service", "booking")?;
//!     metrics.add_metric("BookingConfirmation", "Count", 1)?;
//!     Ok::<_, MetricsError>(booking_id)
//! });
//!
//! assert_eq!(handler.call(7)?, Some(7));
//! # Ok::<(), MetricsError>(())
//! ```

use super::collector::Collector;
use super::error::MetricsError;

/// When the wrapped handler runs relative to the flush
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FlushMode {
    /// Flush whatever the collector holds and return without running the handler
    #[default]
    FlushOnly,
    /// Run the handler, then flush if it succeeded
    InvokeThenFlush,
}

/// A handler wrapped by [Collector::log_metrics]
pub struct LogMetrics<'a, F> {
    metrics: &'a Collector,
    mode: FlushMode,
    handler: F,
}

impl<F> LogMetrics<'_, F> {
    /// Invoke the wrapped handler according to the [FlushMode]
    /// * `Ok(None)` when the handler was not run
    /// * Errors from the handler are returned untouched and nothing is flushed
    /// * Errors from serialization or writing are converted into `E`
    pub fn call<A, T, E>(&mut self, event: A) -> Result<Option<T>, E>
    where
        F: FnMut(A) -> Result<T, E>,
        E: From<MetricsError>,
    {
        match self.mode {
            FlushMode::FlushOnly => {
                self.metrics.flush()?;
                Ok(None)
            }
            FlushMode::InvokeThenFlush => {
                let response = (self.handler)(event)?;
                self.metrics.flush()?;
                Ok(Some(response))
            }
        }
    }

    pub fn mode(&self) -> FlushMode {
        self.mode
    }
}

impl Collector {
    /// Wrap a handler so this collector is flushed whenever it is called
    pub fn log_metrics<F>(&self, mode: FlushMode, handler: F) -> LogMetrics<'_, F> {
        LogMetrics {
            metrics: self,
            mode,
            handler,
        }
    }
}
