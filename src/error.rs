//! # Error
//!
//! Every failure the accumulator, serializer and sessions can raise

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T, E = MetricsError> = std::result::Result<T, E>;

/// Errors raised synchronously to the immediate caller, none are retried internally
#[derive(Debug, Error)]
pub enum MetricsError {
    /// The unit is not part of the catalog
    #[error("invalid metric unit '{unit}', expected one of: {accepted}")]
    InvalidUnit { unit: String, accepted: String },

    /// A new dimension name would exceed the per document limit
    #[error("exceeded maximum of {max} dimensions that can be associated with metrics")]
    TooManyDimensions { max: usize },

    /// The dimension name or value cannot be placed in the document
    #[error("invalid dimension '{name}': {reason}")]
    InvalidDimensionValue { name: String, reason: String },

    /// The namespace was already set explicitly on this collector
    #[error("namespace already set to '{current}', refusing to replace it with '{attempted}'")]
    DuplicateNamespace { current: String, attempted: String },

    /// The assembled document does not match the Embedded Metric Format schema
    #[error("EMF schema validation failed at {path}: {rule}")]
    SchemaValidation { path: String, rule: String },

    /// The supplied metric value is not a usable number
    #[error("invalid value for metric '{name}': {reason}")]
    MetricValue { name: String, reason: String },

    /// [Builder::init](crate::Builder::init) was called after the global collector was set up
    #[error("global metrics collector already initialized")]
    AlreadyInitialized,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl MetricsError {
    pub(crate) fn schema(path: impl Into<String>, rule: impl Into<String>) -> Self {
        Self::SchemaValidation {
            path: path.into(),
            rule: rule.into(),
        }
    }

    pub(crate) fn metric_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MetricValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_dimension(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDimensionValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Lists the whole catalog so the caller can see what was expected
    pub(crate) fn invalid_unit(unit: impl Into<String>) -> Self {
        Self::InvalidUnit {
            unit: unit.into(),
            accepted: crate::unit::MetricUnit::names().collect::<Vec<_>>().join(", "),
        }
    }
}
