//! # Unit
//!
//! Catalog of the metric units accepted by [Collector::add_metric](crate::Collector::add_metric)
//!
//! Unit names are matched case-insensitively, so `"Seconds"`, `"seconds"` and `"SECONDS"` all
//! resolve to [MetricUnit::Seconds].
//!
//! Every throughput unit is written to the wire as `"Second"`.  This mirrors the unit table
//! older emitters shipped with and is kept so dashboards built on that output keep matching.
//! `"Second"` itself resolves to [MetricUnit::BytesPerSecond], which writes the same string.

use crate::error::{MetricsError, Result};
use std::fmt;
use std::str::FromStr;

/// A unit from the catalog, see [MetricUnit::as_str] for the wire string
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricUnit {
    Seconds,
    Microseconds,
    Milliseconds,
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
    Bits,
    Kilobits,
    Megabits,
    Gigabits,
    Terabits,
    Percent,
    Count,
    BytesPerSecond,
    KilobytesPerSecond,
    MegabytesPerSecond,
    GigabytesPerSecond,
    TerabytesPerSecond,
    BitsPerSecond,
    KilobitsPerSecond,
    MegabitsPerSecond,
    GigabitsPerSecond,
    TerabitsPerSecond,
    CountPerSecond,
}

/// Lookup table of unit names, compared ignoring ASCII case
static CATALOG: [(&str, MetricUnit); 26] = [
    ("Seconds", MetricUnit::Seconds),
    ("Microseconds", MetricUnit::Microseconds),
    ("Milliseconds", MetricUnit::Milliseconds),
    ("Bytes", MetricUnit::Bytes),
    ("Kilobytes", MetricUnit::Kilobytes),
    ("Megabytes", MetricUnit::Megabytes),
    ("Gigabytes", MetricUnit::Gigabytes),
    ("Terabytes", MetricUnit::Terabytes),
    ("Bits", MetricUnit::Bits),
    ("Kilobits", MetricUnit::Kilobits),
    ("Megabits", MetricUnit::Megabits),
    ("Gigabits", MetricUnit::Gigabits),
    ("Terabits", MetricUnit::Terabits),
    ("Percent", MetricUnit::Percent),
    ("Count", MetricUnit::Count),
    ("BytesPerSecond", MetricUnit::BytesPerSecond),
    ("KilobytesPerSecond", MetricUnit::KilobytesPerSecond),
    ("MegabytesPerSecond", MetricUnit::MegabytesPerSecond),
    ("GigabytesPerSecond", MetricUnit::GigabytesPerSecond),
    ("TerabytesPerSecond", MetricUnit::TerabytesPerSecond),
    ("BitsPerSecond", MetricUnit::BitsPerSecond),
    ("KilobitsPerSecond", MetricUnit::KilobitsPerSecond),
    ("MegabitsPerSecond", MetricUnit::MegabitsPerSecond),
    ("GigabitsPerSecond", MetricUnit::GigabitsPerSecond),
    ("TerabitsPerSecond", MetricUnit::TerabitsPerSecond),
    ("CountPerSecond", MetricUnit::CountPerSecond),
];

impl MetricUnit {
    /// The CloudWatch unit string written into the `Metrics` directive
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Seconds => "Seconds",
            MetricUnit::Microseconds => "Microseconds",
            MetricUnit::Milliseconds => "Milliseconds",
            MetricUnit::Bytes => "Bytes",
            MetricUnit::Kilobytes => "Kilobytes",
            MetricUnit::Megabytes => "Megabytes",
            MetricUnit::Gigabytes => "Gigabytes",
            MetricUnit::Terabytes => "Terabytes",
            MetricUnit::Bits => "Bits",
            MetricUnit::Kilobits => "Kilobits",
            MetricUnit::Megabits => "Megabits",
            MetricUnit::Gigabits => "Gigabits",
            MetricUnit::Terabits => "Terabits",
            MetricUnit::Percent => "Percent",
            MetricUnit::Count => "Count",
            MetricUnit::BytesPerSecond
            | MetricUnit::KilobytesPerSecond
            | MetricUnit::MegabytesPerSecond
            | MetricUnit::GigabytesPerSecond
            | MetricUnit::TerabytesPerSecond
            | MetricUnit::BitsPerSecond
            | MetricUnit::KilobitsPerSecond
            | MetricUnit::MegabitsPerSecond
            | MetricUnit::GigabitsPerSecond
            | MetricUnit::TerabitsPerSecond
            | MetricUnit::CountPerSecond => "Second",
        }
    }

    /// Every unit name the catalog accepts (in any letter case)
    pub fn names() -> impl Iterator<Item = &'static str> {
        CATALOG.iter().map(|(name, _)| *name)
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricUnit {
    type Err = MetricsError;

    /// Catalog names first, then wire strings, so a unit read back from a document resolves too
    fn from_str(name: &str) -> Result<Self> {
        CATALOG
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .or_else(|| CATALOG.iter().find(|(_, unit)| unit.as_str().eq_ignore_ascii_case(name)))
            .map(|(_, unit)| *unit)
            .ok_or_else(|| MetricsError::invalid_unit(name))
    }
}

/// Anything that can be resolved against the unit catalog
pub trait IntoMetricUnit {
    fn into_metric_unit(self) -> Result<MetricUnit>;
}

impl IntoMetricUnit for MetricUnit {
    fn into_metric_unit(self) -> Result<MetricUnit> {
        Ok(self)
    }
}

impl IntoMetricUnit for &str {
    fn into_metric_unit(self) -> Result<MetricUnit> {
        self.parse()
    }
}

impl IntoMetricUnit for String {
    fn into_metric_unit(self) -> Result<MetricUnit> {
        self.parse()
    }
}

impl IntoMetricUnit for &String {
    fn into_metric_unit(self) -> Result<MetricUnit> {
        self.parse()
    }
}

/// Units described through the [metrics] facade
///
/// The binary prefixed byte units map onto their decimal CloudWatch names, nanoseconds have no
/// CloudWatch counterpart and are rejected.
impl IntoMetricUnit for metrics::Unit {
    fn into_metric_unit(self) -> Result<MetricUnit> {
        let unit = match self {
            metrics::Unit::Count => MetricUnit::Count,
            metrics::Unit::Percent => MetricUnit::Percent,
            metrics::Unit::Seconds => MetricUnit::Seconds,
            metrics::Unit::Milliseconds => MetricUnit::Milliseconds,
            metrics::Unit::Microseconds => MetricUnit::Microseconds,
            metrics::Unit::Tebibytes => MetricUnit::Terabytes,
            metrics::Unit::Gibibytes => MetricUnit::Gigabytes,
            metrics::Unit::Mebibytes => MetricUnit::Megabytes,
            metrics::Unit::Kibibytes => MetricUnit::Kilobytes,
            metrics::Unit::Bytes => MetricUnit::Bytes,
            metrics::Unit::TerabitsPerSecond => MetricUnit::TerabitsPerSecond,
            metrics::Unit::GigabitsPerSecond => MetricUnit::GigabitsPerSecond,
            metrics::Unit::MegabitsPerSecond => MetricUnit::MegabitsPerSecond,
            metrics::Unit::KilobitsPerSecond => MetricUnit::KilobitsPerSecond,
            metrics::Unit::BitsPerSecond => MetricUnit::BitsPerSecond,
            metrics::Unit::CountPerSecond => MetricUnit::CountPerSecond,
            metrics::Unit::Nanoseconds => return Err(MetricsError::invalid_unit(self.as_str())),
        };
        Ok(unit)
    }
}

/// Resolve a unit name (any letter case) or an existing [MetricUnit] against the catalog
pub fn resolve_unit(unit: impl IntoMetricUnit) -> Result<MetricUnit> {
    unit.into_metric_unit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_lookup() {
        assert_eq!(resolve_unit("seconds").unwrap(), resolve_unit("Seconds").unwrap());
        assert_eq!(resolve_unit("COUNT").unwrap(), MetricUnit::Count);
        assert_eq!(resolve_unit("Kilobytespersecond").unwrap(), MetricUnit::KilobytesPerSecond);
        assert_eq!(resolve_unit(String::from("milliseconds")).unwrap(), MetricUnit::Milliseconds);
        assert_eq!(resolve_unit(MetricUnit::Percent).unwrap(), MetricUnit::Percent);
    }

    #[test]
    fn unknown_unit_lists_catalog() {
        match resolve_unit("bogus") {
            Err(MetricsError::InvalidUnit { unit, accepted }) => {
                assert_eq!(unit, "bogus");
                assert!(accepted.contains("Seconds"));
                assert!(accepted.contains("CountPerSecond"));
            }
            other => panic!("expected InvalidUnit, got {other:?}"),
        }
    }

    #[test]
    fn throughput_units_collapse_to_second() {
        for name in ["BytesPerSecond", "megabitspersecond", "CountPerSecond"] {
            assert_eq!(resolve_unit(name).unwrap().as_str(), "Second");
        }
        assert_eq!(MetricUnit::Kilobytes.to_string(), "Kilobytes");
    }

    #[test]
    fn every_catalog_name_resolves_in_both_spellings() {
        for name in MetricUnit::names() {
            let pascal = resolve_unit(name).unwrap();
            let lower = resolve_unit(name.to_lowercase()).unwrap();
            assert_eq!(pascal, lower);
        }
    }

    #[test]
    fn wire_strings_resolve_back() {
        for (_, unit) in CATALOG.iter() {
            let resolved = resolve_unit(unit.as_str()).unwrap();
            assert_eq!(resolved.as_str(), unit.as_str());
        }
        // First throughput unit in the catalog owns the shared wire string
        assert_eq!(resolve_unit("Second").unwrap(), MetricUnit::BytesPerSecond);
        assert_eq!(resolve_unit("second").unwrap().as_str(), "Second");
    }

    #[test]
    fn metrics_facade_units() {
        assert_eq!(resolve_unit(metrics::Unit::Kibibytes).unwrap(), MetricUnit::Kilobytes);
        assert_eq!(resolve_unit(metrics::Unit::Count).unwrap(), MetricUnit::Count);
        assert_eq!(resolve_unit(metrics::Unit::Gibibytes).unwrap(), MetricUnit::Gigabytes);
        match resolve_unit(metrics::Unit::Nanoseconds) {
            Err(MetricsError::InvalidUnit { unit, accepted }) => {
                assert_eq!(unit, "nanoseconds");
                assert!(accepted.starts_with("Seconds, "));
            }
            other => panic!("expected InvalidUnit, got {other:?}"),
        }
    }
}
