use std::time::Duration;

use axum::{extract::MatchedPath, http};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::Level;

/// Names request spans after the matched route (`PATCH /steps/{id}`) so
/// traces group by endpoint rather than by concrete id.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tracer;

impl<Body> MakeSpan<Body> for Tracer {
    fn make_span(&mut self, request: &http::Request<Body>) -> tracing::Span {
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map_or("", MatchedPath::as_str);

        tracing::span!(
            Level::INFO,
            "api.request",
            otel.name = format!("{} {}", request.method(), route),
            otel.kind = "server",
            http.route = route,
            http.request.method = %request.method(),
            url.path = %request.uri().path(),
            url.query = request.uri().query(),
            user_agent.original = request.headers().get("user-agent").and_then(|h| h.to_str().ok()),
            http.response.status_code = tracing::field::Empty,
            otel.status_code = tracing::field::Empty,
        )
    }
}

impl<Body> OnResponse<Body> for Tracer {
    fn on_response(self, response: &http::Response<Body>, latency: Duration, span: &tracing::Span) {
        let status = response.status();
        let latency_ms = latency.as_millis();

        span.record("http.response.status_code", status.as_u16());

        if status.is_server_error() {
            span.record("otel.status_code", "ERROR");
            tracing::error!(status = status.as_u16(), latency_ms, "request failed");
        } else if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), latency_ms, "request rejected");
        } else {
            span.record("otel.status_code", "OK");
            tracing::info!(status = status.as_u16(), latency_ms, "request finished");
        }
    }
}
