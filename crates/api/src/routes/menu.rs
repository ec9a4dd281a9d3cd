//! Menu routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, middleware::Tenant};
use cafedesk_db::repositories::{
    CreateMenuItemInput, MenuFilter, MenuRepository, UpdateMenuItemInput,
};
use cafedesk_shared::types::MenuItemId;

/// Query parameters for listing the menu.
#[derive(Debug, Default, Deserialize)]
pub struct MenuQuery {
    /// Only items of this category.
    pub category: Option<String>,
    /// Only available (or unavailable) items.
    pub available: Option<bool>,
}

const fn default_available() -> bool {
    true
}

/// Request body for creating a menu item.
#[derive(Debug, Deserialize)]
pub struct CreateMenuItemRequest {
    /// Item name.
    pub name: String,
    /// Category label, e.g. "Coffee".
    #[serde(default)]
    pub category: String,
    /// Unit price.
    pub price: Decimal,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Whether the item can be ordered.
    #[serde(default = "default_available")]
    pub available: bool,
}

/// Request body for updating a menu item.
#[derive(Debug, Deserialize)]
pub struct UpdateMenuItemRequest {
    /// New name.
    pub name: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New unit price.
    pub price: Option<Decimal>,
    /// New description.
    pub description: Option<String>,
    /// New availability.
    pub available: Option<bool>,
}

/// Creates the menu router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_menu).post(create_menu_item))
        .route("/menu/categories", get(list_categories))
        .route(
            "/menu/{item_id}",
            get(get_menu_item)
                .put(update_menu_item)
                .delete(delete_menu_item),
        )
}

/// GET /menu - List menu items ordered by category and name.
async fn list_menu(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<MenuQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = MenuFilter {
        category: query.category.filter(|c| !c.is_empty()),
        available: query.available,
    };
    let items = MenuRepository::new((*state.db).clone())
        .list(tenant.cafe_id(), filter)
        .await?;
    Ok(Json(items))
}

/// GET /menu/categories - Distinct category labels.
async fn list_categories(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<impl IntoResponse, ApiError> {
    let categories = MenuRepository::new((*state.db).clone())
        .categories(tenant.cafe_id())
        .await?;
    Ok(Json(categories))
}

/// GET `/menu/{item_id}`
async fn get_menu_item(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(item_id): Path<MenuItemId>,
) -> Result<impl IntoResponse, ApiError> {
    let item = MenuRepository::new((*state.db).clone())
        .find(tenant.cafe_id(), item_id)
        .await?;
    Ok(Json(item))
}

/// POST /menu
async fn create_menu_item(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreateMenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = MenuRepository::new((*state.db).clone())
        .create(
            tenant.cafe_id(),
            CreateMenuItemInput {
                name: payload.name,
                category: payload.category,
                price: payload.price,
                description: payload.description,
                available: payload.available,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PUT `/menu/{item_id}`
async fn update_menu_item(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(item_id): Path<MenuItemId>,
    Json(payload): Json<UpdateMenuItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let item = MenuRepository::new((*state.db).clone())
        .update(
            tenant.cafe_id(),
            item_id,
            UpdateMenuItemInput {
                name: payload.name,
                category: payload.category,
                price: payload.price,
                description: payload.description,
                available: payload.available,
            },
        )
        .await?;
    Ok(Json(item))
}

/// DELETE `/menu/{item_id}`
async fn delete_menu_item(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(item_id): Path<MenuItemId>,
) -> Result<impl IntoResponse, ApiError> {
    MenuRepository::new((*state.db).clone())
        .delete(tenant.cafe_id(), item_id)
        .await?;
    Ok(Json(json!({ "message": "Menu item deleted successfully" })))
}
