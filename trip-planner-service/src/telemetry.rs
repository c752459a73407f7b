use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use crate::config::LogFormat;

pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

const DEFAULT_LOG_FILTER: &str = "trip_planner_service=debug,trip_planner=debug,tower_http=debug";

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
///
/// JSON lines carry the enclosing `http_request` span, so every event logged
/// while serving a request includes its correlation id.
pub fn init_tracing(format: LogFormat) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let fmt_layer = match format {
        LogFormat::Pretty => fmt::layer().pretty().boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}

/// Tag every request with a correlation id and run it inside a span carrying it
pub async fn correlation_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let header_value = HeaderValue::from_str(&correlation_id)
        .unwrap_or_else(|_| HeaderValue::from_static("unknown"));

    request
        .headers_mut()
        .insert(CORRELATION_ID_HEADER, header_value.clone());

    let span = tracing::info_span!(
        "http_request",
        correlation_id = %correlation_id,
        method = %request.method(),
        uri = %request.uri(),
    );

    let mut response = next.run(request).instrument(span).await;
    response
        .headers_mut()
        .insert(CORRELATION_ID_HEADER, header_value);
    response
}
