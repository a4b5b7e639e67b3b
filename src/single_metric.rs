//! # Single Metric
//!
//! A private collector holding exactly one metric, flushed exactly once when the scope ends
//!
//! Use it for metrics that need dimensions different from the rest of the invocation, the EMF
//! document only carries a single dimension set.
//!
//! # Example
//! ```
//! use lambda_powertools_metrics::{single_metric_with, Builder, MetricsError};
//!
//! single_metric_with(
//!     Builder::new().with_writer(std::io::sink()),
//!     "ColdStart",
//!     "Count",
//!     1,
//!     |metric| {
//!         metric.add_namespace("ServerlessAirline")?;
//!         metric.add_dimension("function_version", "47")?;
//!         Ok::<_, MetricsError>(())
//!     },
//! )?;
//! # Ok::<(), MetricsError>(())
//! ```

use super::builder::Builder;
use super::collector::Collector;
use super::error::{MetricsError, Result};
use super::unit::IntoMetricUnit;
use serde_json::value::Value;
use std::ops::Deref;
use tracing::{debug, error};

/// An open single metric session, see [SingleMetric::close]
///
/// Dropping an open session flushes it, so the metric is still published when the owning
/// scope unwinds.  Flush errors at that point can only be logged.
#[derive(Debug)]
pub struct SingleMetric {
    collector: Collector,
    closed: bool,
}

impl SingleMetric {
    /// Open an empty session, the first metric added is the only one kept
    pub fn new(builder: Builder) -> Self {
        Self {
            collector: builder.single_metric_mode().build(),
            closed: false,
        }
    }

    /// Open a session seeded with its metric
    /// * Fails without emitting anything if the unit or value is rejected
    pub fn open(
        builder: Builder,
        name: impl Into<String>,
        unit: impl IntoMetricUnit,
        value: impl Into<Value>,
    ) -> Result<Self> {
        let session = Self::new(builder);
        session.collector.add_metric(name, unit, value)?;
        Ok(session)
    }

    /// Serialize and write the metric, ending the session
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        debug!("Serializing single metric");
        self.collector.flush()
    }
}

impl Deref for SingleMetric {
    type Target = Collector;

    fn deref(&self) -> &Collector {
        &self.collector
    }
}

impl Drop for SingleMetric {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(err) = self.collector.flush() {
            error!("Failed to publish single metric: {err}");
        }
    }
}

/// Run `body` with a single metric session built from the environment
///
/// See [single_metric_with]
pub fn single_metric<T, E, F>(
    name: impl Into<String>,
    unit: impl IntoMetricUnit,
    value: impl Into<Value>,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(&SingleMetric) -> Result<T, E>,
    E: From<MetricsError>,
{
    single_metric_with(Builder::from_env(), name, unit, value, body)
}

/// Run `body` with a single metric session, publishing it once `body` returns
/// * The flush is attempted whether or not `body` failed
/// * An error from `body` is returned after the flush attempt
/// * A flush error is returned when `body` succeeded, and logged when `body` failed too
pub fn single_metric_with<T, E, F>(
    builder: Builder,
    name: impl Into<String>,
    unit: impl IntoMetricUnit,
    value: impl Into<Value>,
    body: F,
) -> Result<T, E>
where
    F: FnOnce(&SingleMetric) -> Result<T, E>,
    E: From<MetricsError>,
{
    let session = SingleMetric::open(builder, name, unit, value)?;
    let outcome = body(&session);

    match (outcome, session.close()) {
        (Ok(response), Ok(())) => Ok(response),
        (Ok(_), Err(err)) => Err(err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(flush_err)) => {
            error!("Failed to publish single metric: {flush_err}");
            Err(err)
        }
    }
}
