//! HTTP route handlers for the client registry.
//!
//! # Route Structure
//!
//! ```text
//! GET  /clients                    - All clients, ordered by name
//! GET  /clients/search?name=       - Case-insensitive name search
//! GET  /clients/exists/{cpf_cnpj}  - Whether a CPF/CNPJ is registered
//! POST /clients                    - Create a client
//!
//! GET  /status                     - Uptime and request count
//! GET  /health                     - Liveness
//! GET  /health/ready               - Readiness (store round-trip)
//! ```

pub mod clients;
pub mod status;

use std::time::Duration;

use axum::{Router, middleware::from_fn, middleware::from_fn_with_state, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_count_middleware, request_id_middleware};
use crate::state::AppState;

/// Create the application routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/clients", get(clients::list).post(clients::create))
        .route("/clients/search", get(clients::search))
        .route("/clients/exists/{cpf_cnpj}", get(clients::exists))
        .route("/status", get(status::status))
        .route("/health", get(status::health))
        .route("/health/ready", get(status::readiness))
}

/// Build the full router: routes, request counting, request IDs and tracing.
///
/// Sentry layers are added by the binary on top of this.
pub fn build_router(state: AppState) -> Router {
    routes()
        .layer(from_fn_with_state(state.clone(), request_count_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
