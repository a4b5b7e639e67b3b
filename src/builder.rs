use super::collector::{self, Collector, DEFAULT_MAX_METRICS};
use super::config::EnvConfig;
use super::error::Result;
use super::global;
use std::io::Write;

/// Builder for the metrics Collector
///
/// # Example
/// ```
///  let metrics = lambda_powertools_metrics::Builder::new()
///      .cloudwatch_namespace("MyApplication")
///      .build();
/// ```
pub struct Builder {
    cloudwatch_namespace: Option<String>,
    max_metrics: usize,
    timestamp: Option<u64>,
    single_metric: bool,
    writer: Option<Box<dyn Write + Send>>,
}

impl Builder {
    pub fn new() -> Self {
        Builder {
            cloudwatch_namespace: None,
            max_metrics: DEFAULT_MAX_METRICS,
            timestamp: None,
            single_metric: false,
            writer: None,
        }
    }

    /// Start from the environment, see [EnvConfig]
    /// * `POWERTOOLS_METRICS_NAMESPACE` becomes the default namespace
    pub fn from_env() -> Self {
        Self::from_config(&EnvConfig::from_env())
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            cloudwatch_namespace: config.namespace.clone(),
            ..Self::new()
        }
    }

    /// Sets the default CloudWatch namespace
    /// * [Collector::add_namespace] overrides it
    /// * Without either, serialization fails with a schema error
    pub fn cloudwatch_namespace(self, namespace: impl Into<String>) -> Self {
        Self {
            cloudwatch_namespace: Some(namespace.into()),
            ..self
        }
    }

    /// Number of distinct metrics held before the current set is flushed, defaults to 100
    pub fn max_metrics(self, max_metrics: usize) -> Self {
        Self {
            max_metrics: max_metrics.max(1),
            ..self
        }
    }

    /// Sets the timestamp of every document, intended for testing
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Keep only the first metric added, later add_metric calls are ignored
    pub fn single_metric_mode(mut self) -> Self {
        self.single_metric = true;
        self
    }

    /// Where documents are written, defaults to stdout
    pub fn with_writer(mut self, writer: impl Write + Send + 'static) -> Self {
        self.writer = Some(Box::new(writer));
        self
    }

    /// Private helper for consuming the builder into collector configuration
    fn config(&self) -> collector::Config {
        collector::Config {
            default_namespace: self.cloudwatch_namespace.clone(),
            max_metrics: self.max_metrics,
            timestamp: self.timestamp,
            single_metric: self.single_metric,
        }
    }

    /// Build a private collector
    pub fn build(self) -> Collector {
        let config = self.config();
        let writer = self.writer.unwrap_or_else(|| Box::new(std::io::stdout()));
        Collector::new(config, writer)
    }

    /// Build the collector and install it as the process-wide one returned by [global()](super::global())
    /// * Fails if the global collector already exists, including one created on first use
    pub fn init(self) -> Result<&'static Collector> {
        global::install(self.build())
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
