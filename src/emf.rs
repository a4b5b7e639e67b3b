//! # EMF
//!
//! Helpers for serializing CloudWatch Embedded Metrics via serde_json, plus a structural
//! validator for the documents we produce
//!
//! <https://docs.aws.amazon.com/AmazonCloudWatch/latest/monitoring/CloudWatch_Embedded_Metric_Format_Specification.html>

use crate::error::{MetricsError, Result};
use serde::Serialize;
use serde_json::value::Value;
use std::collections::BTreeMap;

/// The Embedded Metric Format supports a maximum of 9 dimensions per dimension set
pub const MAX_DIMENSIONS: usize = 9;

/// CloudWatch limit for namespace and metric name lengths
const MAX_NAME_LENGTH: usize = 255;

/// Unit strings accepted in a `Metrics` entry
///
/// `Second` is not a CloudWatch unit, it is what the catalog writes for every throughput unit.
const ALLOWED_UNITS: &[&str] = &[
    "Seconds",
    "Microseconds",
    "Milliseconds",
    "Bytes",
    "Kilobytes",
    "Megabytes",
    "Gigabytes",
    "Terabytes",
    "Bits",
    "Kilobits",
    "Megabits",
    "Gigabits",
    "Terabits",
    "Percent",
    "Count",
    "Bytes/Second",
    "Kilobytes/Second",
    "Megabytes/Second",
    "Gigabytes/Second",
    "Terabytes/Second",
    "Bits/Second",
    "Kilobits/Second",
    "Megabits/Second",
    "Gigabits/Second",
    "Terabits/Second",
    "Count/Second",
    "Second",
    "None",
];

#[derive(Serialize)]
pub struct EmbeddedMetrics<'a> {
    #[serde(rename = "_aws")]
    pub aws: EmbeddedMetricsAws<'a>,
    #[serde(flatten)]
    pub dimensions: BTreeMap<&'a str, &'a str>,
    #[serde(flatten)]
    pub values: BTreeMap<&'a str, Value>,
}

#[derive(Serialize)]
pub struct EmbeddedMetricsAws<'a> {
    #[serde(rename = "Timestamp")]
    pub timestamp: u64,
    // A collector only ever writes one namespace per document
    #[serde(rename = "CloudWatchMetrics")]
    pub cloudwatch_metrics: [EmbeddedNamespace<'a>; 1],
}

#[derive(Serialize)]
pub struct EmbeddedNamespace<'a> {
    #[serde(rename = "Namespace")]
    pub namespace: &'a str,
    // A single dimension set holding every dimension, never a cross product
    #[serde(rename = "Dimensions")]
    pub dimensions: [Vec<&'a str>; 1],
    #[serde(rename = "Metrics")]
    pub metrics: Vec<EmbeddedMetric<'a>>,
}

#[derive(Serialize)]
pub struct EmbeddedMetric<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Unit")]
    pub unit: &'a str,
}

/// Convert the typed document into JSON and reject it unless it passes [validate]
pub fn render(document: &EmbeddedMetrics<'_>) -> Result<Value> {
    let value = serde_json::to_value(document)?;
    validate(&value)?;
    Ok(value)
}

/// Structurally validate an EMF document
///
/// Checks the `_aws` metadata object, every directive in `CloudWatchMetrics`, and that each
/// referenced dimension and metric has a matching top level member of the right type.
pub fn validate(document: &Value) -> Result<()> {
    let root = document
        .as_object()
        .ok_or_else(|| MetricsError::schema("$", "document must be an object"))?;

    let aws = root
        .get(AWS_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| MetricsError::schema("_aws", "required object"))?;

    if !aws.get("Timestamp").is_some_and(Value::is_u64) {
        return Err(MetricsError::schema(
            "_aws.Timestamp",
            "required integer milliseconds since epoch",
        ));
    }

    let directives = aws
        .get("CloudWatchMetrics")
        .and_then(Value::as_array)
        .filter(|directives| !directives.is_empty())
        .ok_or_else(|| MetricsError::schema("_aws.CloudWatchMetrics", "required non-empty array"))?;

    for (index, directive) in directives.iter().enumerate() {
        let path = format!("_aws.CloudWatchMetrics[{index}]");
        let directive = directive
            .as_object()
            .ok_or_else(|| MetricsError::schema(&path, "directive must be an object"))?;

        check_name(directive.get("Namespace"), &format!("{path}.Namespace"))?;

        let dimension_sets = directive
            .get("Dimensions")
            .and_then(Value::as_array)
            .filter(|sets| !sets.is_empty())
            .ok_or_else(|| MetricsError::schema(format!("{path}.Dimensions"), "required non-empty array"))?;

        for (set_index, set) in dimension_sets.iter().enumerate() {
            let set_path = format!("{path}.Dimensions[{set_index}]");
            let names = set
                .as_array()
                .filter(|names| (1..=MAX_DIMENSIONS).contains(&names.len()))
                .ok_or_else(|| {
                    MetricsError::schema(&set_path, format!("dimension set must hold 1 to {MAX_DIMENSIONS} names"))
                })?;

            for (name_index, name) in names.iter().enumerate() {
                let name_path = format!("{set_path}[{name_index}]");
                let name = name
                    .as_str()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| MetricsError::schema(&name_path, "dimension name must be a non-empty string"))?;
                if !root.get(name).is_some_and(Value::is_string) {
                    return Err(MetricsError::schema(
                        name_path,
                        format!("dimension '{name}' has no top level string value"),
                    ));
                }
            }
        }

        let metrics = directive
            .get("Metrics")
            .and_then(Value::as_array)
            .filter(|metrics| !metrics.is_empty())
            .ok_or_else(|| MetricsError::schema(format!("{path}.Metrics"), "required non-empty array"))?;

        for (metric_index, metric) in metrics.iter().enumerate() {
            let metric_path = format!("{path}.Metrics[{metric_index}]");
            let metric = metric
                .as_object()
                .ok_or_else(|| MetricsError::schema(&metric_path, "metric definition must be an object"))?;

            let name = check_name(metric.get("Name"), &format!("{metric_path}.Name"))?;
            if !root.get(name).is_some_and(Value::is_number) {
                return Err(MetricsError::schema(
                    format!("{metric_path}.Name"),
                    format!("metric '{name}' has no top level numeric value"),
                ));
            }

            if !metric
                .get("Unit")
                .and_then(Value::as_str)
                .is_some_and(|unit| ALLOWED_UNITS.contains(&unit))
            {
                return Err(MetricsError::schema(
                    format!("{metric_path}.Unit"),
                    "unit must be a CloudWatch unit",
                ));
            }
        }
    }

    Ok(())
}

/// Reserved top level key holding the metadata object
pub const AWS_KEY: &str = "_aws";

/// Why `name` cannot be used as a namespace or metric name, `None` when it can
pub fn invalid_name(name: &str) -> Option<String> {
    if name.is_empty() || name.chars().count() > MAX_NAME_LENGTH {
        return Some(format!("required string of 1 to {MAX_NAME_LENGTH} characters"));
    }
    None
}

/// Like [invalid_name], and rejects the reserved `_aws` key since members share the top level
pub fn invalid_member_name(name: &str) -> Option<String> {
    if name == AWS_KEY {
        return Some(format!("'{AWS_KEY}' is reserved for the metadata object"));
    }
    invalid_name(name)
}

/// Namespaces and metric names are non-empty strings of at most 255 characters
fn check_name<'v>(value: Option<&'v Value>, path: &str) -> Result<&'v str> {
    value
        .and_then(Value::as_str)
        .filter(|name| invalid_name(name).is_none())
        .ok_or_else(|| MetricsError::schema(path, format!("required string of 1 to {MAX_NAME_LENGTH} characters")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn assert_rejected(document: Value, expected_path: &str) {
        match validate(&document) {
            Err(MetricsError::SchemaValidation { path, .. }) => assert_eq!(path, expected_path),
            other => panic!("expected schema error at {expected_path}, got {other:?}"),
        }
    }

    #[test]
    fn embedded_metrics() {
        let mut metrics_test = EmbeddedMetrics {
            aws: EmbeddedMetricsAws {
                timestamp: 0,
                cloudwatch_metrics: [EmbeddedNamespace {
                    namespace: "ServerlessAirline",
                    dimensions: [vec!["service", "function_version"]],
                    metrics: Vec::new(),
                }],
            },
            dimensions: BTreeMap::new(),
            values: BTreeMap::new(),
        };

        metrics_test.aws.timestamp = 1687394207903;

        metrics_test.dimensions.insert("service", "booking");
        metrics_test.dimensions.insert("function_version", "47");

        metrics_test.aws.cloudwatch_metrics[0].metrics.push(EmbeddedMetric {
            name: "BookingConfirmation",
            unit: "Count",
        });
        metrics_test.values.insert("BookingConfirmation", json!(1));

        metrics_test.aws.cloudwatch_metrics[0].metrics.push(EmbeddedMetric {
            name: "ProcessingTime",
            unit: "Milliseconds",
        });
        metrics_test.values.insert("ProcessingTime", json!(10.5));

        let value = render(&metrics_test).unwrap();
        assert_eq!(
            value,
            json!({
                "_aws": {
                    "Timestamp": 1687394207903u64,
                    "CloudWatchMetrics": [{
                        "Namespace": "ServerlessAirline",
                        "Dimensions": [["service", "function_version"]],
                        "Metrics": [
                            {"Name": "BookingConfirmation", "Unit": "Count"},
                            {"Name": "ProcessingTime", "Unit": "Milliseconds"}
                        ]
                    }]
                },
                "service": "booking",
                "function_version": "47",
                "BookingConfirmation": 1,
                "ProcessingTime": 10.5
            })
        );
    }

    fn valid_document() -> Value {
        json!({
            "_aws": {
                "Timestamp": 1687394207903u64,
                "CloudWatchMetrics": [{
                    "Namespace": "ServerlessAirline",
                    "Dimensions": [["service"]],
                    "Metrics": [{"Name": "ColdStart", "Unit": "Count"}]
                }]
            },
            "service": "booking",
            "ColdStart": 1
        })
    }

    #[test]
    fn accepts_valid_document() {
        validate(&valid_document()).unwrap();
    }

    #[test]
    fn rejects_bad_timestamp() {
        let mut document = valid_document();
        document["_aws"]["Timestamp"] = json!("now");
        assert_rejected(document, "_aws.Timestamp");

        let mut document = valid_document();
        document["_aws"]["Timestamp"] = json!(1.5);
        assert_rejected(document, "_aws.Timestamp");
    }

    #[test]
    fn rejects_empty_namespace() {
        let mut document = valid_document();
        document["_aws"]["CloudWatchMetrics"][0]["Namespace"] = json!("");
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Namespace");
    }

    #[test]
    fn rejects_empty_metrics() {
        let mut document = valid_document();
        document["_aws"]["CloudWatchMetrics"][0]["Metrics"] = json!([]);
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Metrics");
    }

    #[test]
    fn rejects_dimension_set_sizes() {
        let mut document = valid_document();
        document["_aws"]["CloudWatchMetrics"][0]["Dimensions"] = json!([[]]);
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Dimensions[0]");

        let mut document = valid_document();
        let names: Vec<String> = (0..10).map(|i| format!("d{i}")).collect();
        for name in &names {
            document[name.as_str()] = json!("x");
        }
        document["_aws"]["CloudWatchMetrics"][0]["Dimensions"] = json!([names]);
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Dimensions[0]");
    }

    #[test]
    fn rejects_unknown_unit() {
        let mut document = valid_document();
        document["_aws"]["CloudWatchMetrics"][0]["Metrics"][0]["Unit"] = json!("Parsecs");
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Metrics[0].Unit");
    }

    #[test]
    fn rejects_missing_top_level_members() {
        let mut document = valid_document();
        document["ColdStart"] = json!("1");
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Metrics[0].Name");

        let mut document = valid_document();
        document.as_object_mut().unwrap().remove("service");
        assert_rejected(document, "_aws.CloudWatchMetrics[0].Dimensions[0][0]");
    }

    #[test]
    fn member_name_rules() {
        assert!(invalid_name("ServerlessAirline").is_none());
        assert!(invalid_name("").is_some());
        assert!(invalid_name(&"é".repeat(255)).is_none());
        assert!(invalid_name(&"é".repeat(256)).is_some());
        assert!(invalid_name("_aws").is_none());
        assert!(invalid_member_name("_aws").is_some());
    }
}
