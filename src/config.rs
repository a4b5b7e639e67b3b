//! # Config
//!
//! Environment driven defaults shared by [Builder::from_env](crate::Builder::from_env) and the
//! process-wide collector

/// Default namespace for every collector built from the environment
pub const NAMESPACE_ENV: &str = "POWERTOOLS_METRICS_NAMESPACE";
/// Verbosity for diagnostic tracing, consumed by the binary's subscriber
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
/// Service name attached to structured logs
pub const SERVICE_NAME_ENV: &str = "POWERTOOLS_SERVICE_NAME";

const DEFAULT_LOG_LEVEL: &str = "INFO";
const DEFAULT_SERVICE_NAME: &str = "service_undefined";

/// Recognized environment options, empty values count as unset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    pub namespace: Option<String>,
    pub log_level: String,
    pub service_name: String,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Self {
            namespace: get(NAMESPACE_ENV),
            log_level: get(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            service_name: get(SERVICE_NAME_ENV).unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string()),
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let config = EnvConfig::default();
        assert_eq!(config.namespace, None);
        assert_eq!(config.log_level, "INFO");
        assert_eq!(config.service_name, "service_undefined");
    }

    #[test]
    fn reads_every_option() {
        let env = HashMap::from([
            (NAMESPACE_ENV, "ServerlessAirline"),
            (LOG_LEVEL_ENV, "DEBUG"),
            (SERVICE_NAME_ENV, "booking"),
        ]);
        let config = EnvConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.namespace.as_deref(), Some("ServerlessAirline"));
        assert_eq!(config.log_level, "DEBUG");
        assert_eq!(config.service_name, "booking");
    }

    #[test]
    fn blank_values_are_unset() {
        let config = EnvConfig::from_lookup(|key| (key == NAMESPACE_ENV).then(|| "  ".to_string()));
        assert_eq!(config.namespace, None);
    }
}
