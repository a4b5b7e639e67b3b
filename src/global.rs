//! # Global
//!
//! The process-wide collector shared by every invocation in one execution environment
//!
//! Metrics and dimensions added here persist between invocations until flushed.  There is no
//! isolation between concurrent units of work sharing the process; build a private collector or
//! use [single_metric](crate::single_metric()) when that matters.

use super::builder::Builder;
use super::collector::Collector;
use super::error::{MetricsError, Result};
use std::sync::OnceLock;

static GLOBAL: OnceLock<Collector> = OnceLock::new();

/// The process-wide collector, created from the environment on first use unless
/// [Builder::init] installed one earlier
pub fn global() -> &'static Collector {
    GLOBAL.get_or_init(|| Builder::from_env().build())
}

pub(crate) fn install(collector: Collector) -> Result<&'static Collector> {
    let mut installed = false;
    let global = GLOBAL.get_or_init(|| {
        installed = true;
        collector
    });

    if installed {
        Ok(global)
    } else {
        Err(MetricsError::AlreadyInitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NAMESPACE_ENV;
    use crate::test::SharedBuffer;
    use rusty_fork::rusty_fork_test;

    rusty_fork_test! {
        #[test]
        fn init_on_first_use_reads_environment() {
            std::env::set_var(NAMESPACE_ENV, "ServerlessAirline");
            assert_eq!(global().namespace().as_deref(), Some("ServerlessAirline"));
            assert!(std::ptr::eq(global(), global()));
        }

        #[test]
        fn init_installs_once() {
            let output = SharedBuffer::default();
            let installed = Builder::new()
                .cloudwatch_namespace("Installed")
                .with_writer(output.clone())
                .init()
                .unwrap();
            assert!(std::ptr::eq(installed, global()));

            assert!(matches!(
                Builder::new().init(),
                Err(MetricsError::AlreadyInitialized)
            ));

            global().add_dimension("service", "booking").unwrap();
            global().add_metric("BookingConfirmation", "Count", 1).unwrap();
            global().flush().unwrap();
            assert_eq!(output.lines()[0]["_aws"]["CloudWatchMetrics"][0]["Namespace"], "Installed");
        }

        #[test]
        fn state_persists_until_flushed() {
            let output = SharedBuffer::default();
            Builder::new()
                .cloudwatch_namespace("ns")
                .with_writer(output.clone())
                .init()
                .unwrap();

            global().add_dimension("service", "booking").unwrap();
            global().add_metric("first", "Count", 1).unwrap();
            global().add_metric("second", "Count", 1).unwrap();
            assert_eq!(global().metric_count(), 2);

            global().flush().unwrap();
            assert_eq!(global().metric_count(), 0);
            assert_eq!(output.lines().len(), 1);
        }
    }
}
