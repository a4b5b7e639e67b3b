//! # Collector
//!
//! Metric/dimension accumulator + emitter returned from lambda_powertools_metrics::Builder

use super::emf;
use super::error::{MetricsError, Result};
use super::unit::{IntoMetricUnit, MetricUnit};
use serde_json::value::{Number, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, warn};

/// Number of distinct metrics held before the current set is flushed to make room
pub const DEFAULT_MAX_METRICS: usize = 100;

/// Configuration via Builder
#[derive(Debug)]
pub struct Config {
    /// Used when no namespace was set with [Collector::add_namespace]
    pub default_namespace: Option<String>,
    pub max_metrics: usize,
    pub timestamp: Option<u64>,
    /// Ignore every add_metric after the first
    pub single_metric: bool,
}

struct MetricEntry {
    name: String,
    unit: MetricUnit,
    value: Number,
}

/// Collector state used to accumulate metrics and flush
/// This lives within a mutex
struct CollectorState {
    /// Metrics in insertion order, names are unique
    metrics: Vec<MetricEntry>,
    /// Dimensions in insertion order, names are unique
    dimensions: Vec<(String, String)>,
    /// Namespace set explicitly on this collector
    namespace: Option<String>,
    writer: Box<dyn Write + Send>,
}

/// Embedded CloudWatch Metrics accumulator + emitter
///
/// Use [Builder](super::Builder) to construct
///
/// # Example
/// ```
/// let metrics = lambda_powertools_metrics::Builder::new()
///     .with_writer(std::io::sink())
///     .build();
///
/// metrics
///     .add_namespace("ServerlessAirline")?
///     .add_dimension("service", "booking")?
///     .add_metric("BookingConfirmation", "Count", 1)?;
///
/// metrics.flush()?;
/// # Ok::<(), lambda_powertools_metrics::MetricsError>(())
/// ```
pub struct Collector {
    state: Mutex<CollectorState>,
    pub config: Config,
}

impl Collector {
    pub fn new(config: Config, writer: Box<dyn Write + Send>) -> Self {
        Self {
            state: Mutex::new(CollectorState {
                metrics: Vec::new(),
                dimensions: Vec::new(),
                namespace: None,
                writer,
            }),
            config,
        }
    }

    /// The state is plain data, so a panic while it was held cannot leave it half-updated
    fn state(&self) -> MutexGuard<'_, CollectorState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Add or overwrite a metric
    /// * The unit is resolved against the catalog, see [MetricUnit]
    /// * The value must be a JSON number, zero or below drops the metric instead of storing it
    /// * The name must fit CloudWatch limits and not collide with a dimension or `_aws`
    /// * A new name arriving when `max_metrics` are already held flushes the current set first
    /// * In single metric mode only the first metric is kept, later calls are ignored
    pub fn add_metric(&self, name: impl Into<String>, unit: impl IntoMetricUnit, value: impl Into<Value>) -> Result<&Self> {
        let name = name.into();
        let unit = unit.into_metric_unit()?;
        let value = match value.into() {
            Value::Number(number) => number,
            other => return Err(MetricsError::metric_value(name, format!("expected a number, got {other}"))),
        };
        if let Some(reason) = emf::invalid_member_name(&name) {
            return Err(MetricsError::metric_value(name, reason));
        }

        let mut state = self.state();

        if state.dimensions.iter().any(|(key, _)| *key == name) {
            return Err(MetricsError::metric_value(name, "name is already used by a dimension"));
        }

        if self.config.single_metric && !state.metrics.is_empty() {
            debug!("Metric {name} already set, skipping...");
            return Ok(self);
        }

        // Only positive values are ever published, so nothing else is held
        if !value.as_f64().is_some_and(|value| value > 0.0) {
            warn!("Dropping metric {name} with non-positive value {value}");
            state.metrics.retain(|entry| entry.name != name);
            return Ok(self);
        }

        if let Some(entry) = state.metrics.iter_mut().find(|entry| entry.name == name) {
            entry.unit = unit;
            entry.value = value;
            return Ok(self);
        }

        if state.metrics.len() >= self.config.max_metrics {
            debug!(
                "Exceeded maximum of {} metrics - Publishing existing metric set",
                self.config.max_metrics
            );
            self.emit(&mut state)?;
            state.metrics.clear();
        }

        state.metrics.push(MetricEntry { name, unit, value });
        Ok(self)
    }

    /// Add or overwrite a dimension
    /// * At most [emf::MAX_DIMENSIONS] distinct names
    /// * Values must be a non-empty string or a non-zero number, numbers are written as strings
    /// * The name must not collide with a held metric or `_aws`
    pub fn add_dimension(&self, name: impl Into<String>, value: impl Into<Value>) -> Result<&Self> {
        let name = name.into();
        let mut state = self.state();

        let existing = state.dimensions.iter().position(|(key, _)| *key == name);
        if existing.is_none() && state.dimensions.len() >= emf::MAX_DIMENSIONS {
            return Err(MetricsError::TooManyDimensions {
                max: emf::MAX_DIMENSIONS,
            });
        }

        if let Some(reason) = emf::invalid_member_name(&name) {
            return Err(MetricsError::invalid_dimension(name, reason));
        }
        if state.metrics.iter().any(|entry| entry.name == name) {
            return Err(MetricsError::invalid_dimension(name, "name is already used by a metric"));
        }

        let value = match value.into() {
            Value::String(text) if !text.is_empty() => text,
            Value::Number(number) if number.as_f64().is_some_and(|n| n != 0.0) => number.to_string(),
            _ => return Err(MetricsError::invalid_dimension(name, "value must be a non-empty string or a non-zero number")),
        };

        match existing {
            Some(index) => state.dimensions[index].1 = value,
            None => state.dimensions.push((name, value)),
        }
        Ok(self)
    }

    /// Set the namespace for this collector
    /// * Takes precedence over the default namespace from the builder or environment
    /// * May only be set once, a second call fails with [MetricsError::DuplicateNamespace]
    pub fn add_namespace(&self, name: impl Into<String>) -> Result<&Self> {
        let name = name.into();
        if let Some(reason) = emf::invalid_name(&name) {
            return Err(MetricsError::schema("_aws.CloudWatchMetrics[0].Namespace", reason));
        }
        let mut state = self.state();

        if let Some(current) = &state.namespace {
            return Err(MetricsError::DuplicateNamespace {
                current: current.clone(),
                attempted: name,
            });
        }

        state.namespace = Some(name);
        Ok(self)
    }

    /// The namespace the next document will be written with
    pub fn namespace(&self) -> Option<String> {
        let state = self.state();
        state.namespace.clone().or_else(|| self.config.default_namespace.clone())
    }

    /// Number of metrics currently held
    pub fn metric_count(&self) -> usize {
        self.state().metrics.len()
    }

    /// Number of dimensions currently held
    pub fn dimension_count(&self) -> usize {
        self.state().dimensions.len()
    }

    /// Drop every metric and dimension, the namespace is kept
    pub fn clear(&self) {
        let mut state = self.state();
        state.metrics.clear();
        state.dimensions.clear();
    }

    /// Compute the timestamp unless it was set via [Builder::with_timestamp](super::Builder::with_timestamp)
    fn timestamp(&self) -> u64 {
        match self.config.timestamp {
            Some(t) => t,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_millis() as u64)
                .unwrap_or_default(),
        }
    }

    /// Build and validate the EMF document for the current metrics without emitting it
    pub fn serialize(&self) -> Result<Value> {
        let state = self.state();
        self.serialize_state(&state)
    }

    /// Serialize, write one line to the writer, then drop the metrics and dimensions
    ///
    /// Nothing is written or cleared when the document fails validation.
    pub fn flush(&self) -> Result<()> {
        let mut state = self.state();
        self.emit(&mut state)?;
        state.metrics.clear();
        state.dimensions.clear();
        Ok(())
    }

    fn emit(&self, state: &mut CollectorState) -> Result<()> {
        let document = self.serialize_state(state)?;
        debug!(metrics = state.metrics.len(), "Publishing metric set");

        serde_json::to_writer(&mut state.writer, &document)?;
        writeln!(state.writer)?;
        state.writer.flush()?;
        Ok(())
    }

    fn serialize_state(&self, state: &CollectorState) -> Result<Value> {
        let namespace = state
            .namespace
            .as_deref()
            .or(self.config.default_namespace.as_deref())
            .unwrap_or_default();

        let mut emf = emf::EmbeddedMetrics {
            aws: emf::EmbeddedMetricsAws {
                timestamp: self.timestamp(),
                cloudwatch_metrics: [emf::EmbeddedNamespace {
                    namespace,
                    dimensions: [Vec::with_capacity(state.dimensions.len())],
                    metrics: Vec::with_capacity(state.metrics.len()),
                }],
            },
            dimensions: BTreeMap::new(),
            values: BTreeMap::new(),
        };

        for (name, value) in &state.dimensions {
            emf.aws.cloudwatch_metrics[0].dimensions[0].push(name);
            emf.dimensions.insert(name, value);
        }

        for entry in &state.metrics {
            emf.aws.cloudwatch_metrics[0].metrics.push(emf::EmbeddedMetric {
                name: &entry.name,
                unit: entry.unit.as_str(),
            });
            emf.values.insert(&entry.name, Value::Number(entry.value.clone()));
        }

        emf::render(&emf)
    }
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Collector")
            .field("config", &self.config)
            .field("namespace", &state.namespace)
            .field("metrics", &state.metrics.len())
            .field("dimensions", &state.dimensions.len())
            .finish()
    }
}
