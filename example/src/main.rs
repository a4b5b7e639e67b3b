use lambda_powertools_metrics::{global, single_metric, Builder, EnvConfig, Error, FlushMode, MetricUnit};
use serde_json::json;
use tracing::{info, info_span};

fn function_handler(event: serde_json::Value) -> Result<String, Error> {
    let booking_id = event["bookingId"].as_str().ok_or("bookingId missing")?.to_string();

    info!(%booking_id, "Hello from function_handler");

    global()
        .add_dimension("service", "booking")?
        .add_metric("BookingConfirmation", MetricUnit::Count, 1)?
        .add_metric("ProcessingTime", "milliseconds", 12.5)?;

    Ok(booking_id)
}

fn main() -> Result<(), Error> {
    let config = EnvConfig::from_env();

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::new(config.log_level.to_lowercase()))
        .with_target(false)
        .without_time()
        .init();

    let _service = info_span!("service", name = %config.service_name).entered();

    Builder::from_config(&config)
        .cloudwatch_namespace(config.namespace.clone().unwrap_or_else(|| "ServerlessAirline".to_string()))
        .init()?;

    info!("Hello from main");

    // Cold start metric with its own dimension set
    single_metric("ColdStart", "Count", 1, |metric| {
        if config.namespace.is_none() {
            metric.add_namespace("ServerlessAirline")?;
        }
        metric.add_dimension("function_version", "$LATEST")?;
        Ok::<_, Error>(())
    })?;

    let mut handler = global().log_metrics(FlushMode::InvokeThenFlush, function_handler);
    for booking_id in ["b-1", "b-2"] {
        let response = handler.call(json!({ "bookingId": booking_id }))?;
        info!(?response, "invocation finished");
    }

    Ok(())
}
