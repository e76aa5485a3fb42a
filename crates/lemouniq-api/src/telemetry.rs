use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const DEFAULT_FILTER: &str = "lemouniq=debug,tower_http=debug";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default filter. `LOG_FORMAT=json` switches the console
/// output to one JSON object per event. Calling this twice is harmless.
pub fn init_telemetry() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let (compact_layer, json_layer) = if json {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (
            Some(
                tracing_subscriber::fmt::layer().event_format(
                    Format::default()
                        .compact()
                        .with_target(false)
                        .without_time(),
                ),
            ),
            None,
        )
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(compact_layer)
        .with(json_layer)
        .try_init();

    if result.is_ok() {
        tracing::info!(json, "Tracing initialized");
    }
}
