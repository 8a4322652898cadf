//! Unified error handling for the HTTP API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::db::{ErrorKind, StoreError};

/// Application-level error type for request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

/// JSON body returned for every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Store(err) => match err.kind() {
                ErrorKind::DuplicateTaxId => StatusCode::CONFLICT,
                ErrorKind::StoreUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::InvalidLength
                | ErrorKind::InvalidCpf
                | ErrorKind::InvalidCnpj
                | ErrorKind::MalformedRow => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Registry request error"
            );
        }

        // Don't expose internal error details to clients
        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
