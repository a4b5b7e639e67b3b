//! CloudWatch Embedded Metric Format (EMF) helpers for serverless functions
//!
//! Metrics and dimensions are accumulated in a [Collector] and flushed as a single JSON line
//! that the CloudWatch agent turns into metrics.
//!
//! * [global()] is the process-wide collector flushed by [Collector::log_metrics]
//! * [single_metric()] publishes one metric with its own dimensions from a private collector
//!
//! # Example
//! ```
//! use lambda_powertools_metrics::{Builder, MetricUnit};
//!
//! let metrics = Builder::new().with_writer(std::io::sink()).build();
//!
//! metrics
//!     .add_metric("ColdStart", MetricUnit::Count, 1)?
//!     .add_dimension("function_version", "47")?
//!     .add_namespace("ServerlessAirline")?;
//!
//! // {"ColdStart":1,"_aws":{"CloudWatchMetrics":[{"Dimensions":[["function_version"]],"Metrics":[{"Name":"ColdStart","Unit":"Count"}],"Namespace":"ServerlessAirline"}],"Timestamp":1687657545423},"function_version":"47"}
//! metrics.flush()?;
//! # Ok::<(), lambda_powertools_metrics::MetricsError>(())
//! ```

/// Boxed error for handlers wrapped by [Collector::log_metrics] and [single_metric()]
pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

pub use {
    builder::Builder,
    collector::Collector,
    config::EnvConfig,
    error::{MetricsError, Result},
    global::global,
    log_metrics::{FlushMode, LogMetrics},
    single_metric::{single_metric, single_metric_with, SingleMetric},
    unit::{resolve_unit, IntoMetricUnit, MetricUnit},
};

mod builder;
mod collector;
pub mod config;
pub mod emf;
mod error;
mod global;
mod log_metrics;
#[cfg(feature = "service")]
pub mod service;
mod single_metric;
mod unit;
