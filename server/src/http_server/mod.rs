use std::net::SocketAddr;

use axum::{response::Response, Router};
use color_eyre::eyre::WrapErr;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::{AppConfig, AppState};
use errors::ServerError;

mod api;
pub mod errors;
pub(crate) mod routes;
mod trace;

#[cfg(test)]
pub(crate) mod test_helpers;

type ResponseResult<T = Response> = Result<T, ServerError>;

/// The full application: routes, state, request timeout and tracing.
///
/// A request that outlives `request_timeout` has its handler future dropped,
/// which rolls back any transaction it had open.
pub(crate) fn make_app(state: AppState, request_timeout: std::time::Duration) -> Router {
    let tracer = trace::Tracer;
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(tracer)
        .on_response(tracer);

    routes::make_router()
        .with_state(state)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(trace_layer)
}

pub(crate) async fn run_server(config: &AppConfig, state: AppState) -> color_eyre::Result<()> {
    let app = make_app(state, config.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on port {}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err("Failed to open port")?;

    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .await
        .wrap_err("Failed to run server")
}
