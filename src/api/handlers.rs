//! API handlers

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::api::AppState;
use crate::types::Recipe;
use crate::Error;

const INVALID_ID: &str = "Invalid recipe ID";
const BAD_REQUEST: &str = "Bad request";

/// Health check
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    state.store.ping().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// List every recipe
pub async fn list_recipes(State(state): State<AppState>) -> Result<Json<Vec<Recipe>>, ApiError> {
    let recipes = state.store.list().await?;
    Ok(Json(recipes))
}

/// Create a recipe; the body's `id`, if any, is ignored
pub async fn create_recipe(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let recipe = decode_recipe(&body)?;
    let created = state.store.create(recipe.with_id(0)).await?;

    tracing::info!(id = created.id, "Created recipe");
    Ok((StatusCode::CREATED, Json(created)).into_response())
}

/// Fetch one recipe
pub async fn get_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Recipe>, ApiError> {
    let id = path_id(id)?;
    let recipe = state.store.fetch_by_id(id).await?;
    Ok(Json(recipe))
}

/// Overwrite a recipe
///
/// The path id wins over any id in the body. Updating an id with no row
/// behind it still answers 200 with the submitted record.
pub async fn update_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Recipe>, ApiError> {
    let id = path_id(id)?;
    let recipe = decode_recipe(&body)?.with_id(id);

    state.store.update(&recipe).await?;
    Ok(Json(recipe))
}

/// Delete a recipe; deleting a missing id is not an error
pub async fn delete_recipe(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id = path_id(id)?;
    state.store.delete(id).await?;

    Ok(Json(DeleteResponse { result: "success" }))
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub result: &'static str,
}

/// Any path problem, undecodable percent-escapes included, is a bad id
fn path_id(path: Result<Path<String>, PathRejection>) -> crate::Result<i64> {
    match path {
        Ok(Path(raw)) => parse_id(&raw),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Rejected recipe path");
            Err(Error::invalid_request(INVALID_ID))
        }
    }
}

fn parse_id(raw: &str) -> crate::Result<i64> {
    raw.parse::<i64>()
        .map_err(|_| Error::invalid_request(INVALID_ID))
}

fn decode_recipe(body: &[u8]) -> crate::Result<Recipe> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected recipe body");
        Error::invalid_request(BAD_REQUEST)
    })
}

/// JSON error response: `{"error": "<message>"}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self {
            status: err.status_code(),
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "Request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "Request rejected");
        }

        let body = Json(serde_json::json!({
            "error": self.message,
        }));
        (self.status, body).into_response()
    }
}
