//! Request counter reported by `GET /status`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::state::AppState;

/// Count every request that reaches the router, whatever its outcome.
pub async fn request_count_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.record_request();
    next.run(request).await
}
