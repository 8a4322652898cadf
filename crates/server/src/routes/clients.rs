//! Client registry JSON endpoints.

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::AppError;
use crate::models::{Client, NewClient};
use crate::state::AppState;

/// Query parameters for `GET /clients/search`.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

/// Response body for `GET /clients/exists/{cpf_cnpj}`.
#[derive(Debug, Serialize)]
pub struct ExistsResponse {
    pub exists: bool,
}

/// Response body for `POST /clients`.
#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub message: &'static str,
    pub client: Client,
}

/// List every client.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Client>>, AppError> {
    Ok(Json(state.store().get_all().await?))
}

/// Case-insensitive substring search on client names.
///
/// A missing or blank `name` is rejected here; the store itself accepts it.
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Client>>, AppError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("Name query parameter is required".to_string()))?;

    Ok(Json(state.store().get_by_name(name).await?))
}

/// Check whether a CPF/CNPJ is registered.
#[instrument(skip(state))]
pub async fn exists(
    State(state): State<AppState>,
    Path(cpf_cnpj): Path<String>,
) -> Result<Json<ExistsResponse>, AppError> {
    let exists = state.store().exists(&cpf_cnpj).await?;
    Ok(Json(ExistsResponse { exists }))
}

/// Create a client.
#[instrument(skip(state, payload))]
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<NewClient>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let Json(new_client) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected client payload");
        AppError::BadRequest("Invalid request body".to_string())
    })?;

    let client = state.store().insert(&new_client).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Client created successfully",
            client,
        }),
    ))
}
