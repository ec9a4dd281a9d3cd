//! Café management routes (administrators only).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, middleware::AuthUser};
use cafedesk_db::repositories::{CafeRepository, CreateCafeInput, UpdateCafeInput};
use cafedesk_shared::types::CafeId;

/// Request body for creating a café.
#[derive(Debug, Deserialize)]
pub struct CreateCafeRequest {
    /// Display name.
    pub name: String,
    /// Subdomain used for tenant resolution.
    pub subdomain: String,
}

/// Request body for updating a café.
#[derive(Debug, Deserialize)]
pub struct UpdateCafeRequest {
    /// New name.
    pub name: Option<String>,
    /// New subdomain.
    pub subdomain: Option<String>,
    /// Enable or disable the café.
    pub active: Option<bool>,
}

/// Creates the cafés router (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cafes", get(list_cafes).post(create_cafe))
        .route(
            "/cafes/{cafe_id}",
            get(get_cafe).put(update_cafe).delete(delete_cafe),
        )
}

/// GET /cafes - List every café.
async fn list_cafes(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    let cafes = CafeRepository::new((*state.db).clone()).list().await?;
    Ok(Json(cafes))
}

/// GET `/cafes/{cafe_id}` - Get one café.
async fn get_cafe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(cafe_id): Path<CafeId>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    let cafe = CafeRepository::new((*state.db).clone()).find(cafe_id).await?;
    Ok(Json(cafe))
}

/// POST /cafes - Register a café.
async fn create_cafe(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateCafeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    let cafe = CafeRepository::new((*state.db).clone())
        .create(CreateCafeInput {
            name: payload.name,
            subdomain: payload.subdomain,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(cafe)))
}

/// PUT `/cafes/{cafe_id}` - Update name, subdomain or active flag.
async fn update_cafe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(cafe_id): Path<CafeId>,
    Json(payload): Json<UpdateCafeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    let cafe = CafeRepository::new((*state.db).clone())
        .update(
            cafe_id,
            UpdateCafeInput {
                name: payload.name,
                subdomain: payload.subdomain,
                active: payload.active,
            },
        )
        .await?;
    Ok(Json(cafe))
}

/// DELETE `/cafes/{cafe_id}` - Remove a café and everything it owns.
async fn delete_cafe(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(cafe_id): Path<CafeId>,
) -> Result<impl IntoResponse, ApiError> {
    auth.require_admin()?;
    CafeRepository::new((*state.db).clone())
        .delete(cafe_id)
        .await?;

    Ok(Json(json!({ "message": "Cafe deleted" })))
}
