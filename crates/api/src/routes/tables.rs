//! Table routes: floor plan, seating, unbilled orders and payout.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, middleware::Tenant};
use cafedesk_core::payout::PayoutRequest;
use cafedesk_core::table::{TableRuleError, TableStatus};
use cafedesk_db::repositories::{
    AssignTableInput, CreateTableInput, PayoutRepository, TableRepository, UpdateTableInput,
};
use cafedesk_shared::types::{CustomerId, TableId};

const fn default_size() -> i32 {
    100
}

/// Request body for creating a table.
#[derive(Debug, Deserialize)]
pub struct CreateTableRequest {
    /// Table label.
    pub name: String,
    /// Left offset on the floor plan.
    #[serde(default)]
    pub position_x: i32,
    /// Top offset on the floor plan.
    #[serde(default)]
    pub position_y: i32,
    /// Width on the floor plan.
    #[serde(default = "default_size")]
    pub width: i32,
    /// Height on the floor plan.
    #[serde(default = "default_size")]
    pub height: i32,
}

/// Request body for updating a table.
#[derive(Debug, Deserialize)]
pub struct UpdateTableRequest {
    /// New label.
    pub name: Option<String>,
    /// New left offset.
    pub position_x: Option<i32>,
    /// New top offset.
    pub position_y: Option<i32>,
    /// New width.
    pub width: Option<i32>,
    /// New height.
    pub height: Option<i32>,
}

/// Request body for seating, reserving or freeing a table.
#[derive(Debug, Deserialize)]
pub struct AssignTableRequest {
    /// `free`, `occupied` or `reserved`.
    pub status: String,
    /// Registered customer at the table.
    pub customer_id: Option<CustomerId>,
    /// Walk-in guest name.
    pub guest_name: Option<String>,
    /// Walk-in guest phone.
    pub guest_phone: Option<String>,
}

/// Request body for paying out a table.
#[derive(Debug, Deserialize)]
pub struct PayoutTableRequest {
    /// Amount handed over now; the rest goes on the customer's balance.
    pub amount: Decimal,
    /// Payment method, `cash` when omitted.
    pub method: Option<String>,
    /// Note stored on the payment.
    pub notes: Option<String>,
}

/// Creates the tables router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list_tables).post(create_table))
        .route(
            "/tables/{table_id}",
            get(get_table).put(update_table).delete(delete_table),
        )
        .route("/tables/{table_id}/assign", post(assign_table))
        .route("/tables/{table_id}/orders", get(unbilled_orders))
        .route("/tables/{table_id}/payout", post(payout_table))
}

/// GET /tables
async fn list_tables(
    State(state): State<AppState>,
    tenant: Tenant,
) -> Result<impl IntoResponse, ApiError> {
    let tables = TableRepository::new((*state.db).clone())
        .list(tenant.cafe_id())
        .await?;
    Ok(Json(tables))
}

/// GET `/tables/{table_id}`
async fn get_table(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(table_id): Path<TableId>,
) -> Result<impl IntoResponse, ApiError> {
    let table = TableRepository::new((*state.db).clone())
        .find(tenant.cafe_id(), table_id)
        .await?;
    Ok(Json(table))
}

/// POST /tables - New tables start free.
async fn create_table(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreateTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let table = TableRepository::new((*state.db).clone())
        .create(
            tenant.cafe_id(),
            CreateTableInput {
                name: payload.name,
                position_x: payload.position_x,
                position_y: payload.position_y,
                width: payload.width,
                height: payload.height,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(table)))
}

/// PUT `/tables/{table_id}`
async fn update_table(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(table_id): Path<TableId>,
    Json(payload): Json<UpdateTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let table = TableRepository::new((*state.db).clone())
        .update(
            tenant.cafe_id(),
            table_id,
            UpdateTableInput {
                name: payload.name,
                position_x: payload.position_x,
                position_y: payload.position_y,
                width: payload.width,
                height: payload.height,
            },
        )
        .await?;
    Ok(Json(table))
}

/// DELETE `/tables/{table_id}`
async fn delete_table(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(table_id): Path<TableId>,
) -> Result<impl IntoResponse, ApiError> {
    TableRepository::new((*state.db).clone())
        .delete(tenant.cafe_id(), table_id)
        .await?;
    Ok(Json(json!({ "message": "Table deleted successfully" })))
}

/// POST `/tables/{table_id}/assign` - Seat a customer or guest, reserve, or free.
async fn assign_table(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(table_id): Path<TableId>,
    Json(payload): Json<AssignTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = TableStatus::parse(&payload.status)
        .ok_or_else(|| TableRuleError::InvalidStatus(payload.status.clone()))?;

    let table = TableRepository::new((*state.db).clone())
        .assign(
            tenant.cafe_id(),
            table_id,
            AssignTableInput {
                status,
                customer_id: payload.customer_id,
                guest_name: payload.guest_name,
                guest_phone: payload.guest_phone,
            },
        )
        .await?;
    Ok(Json(table))
}

/// GET `/tables/{table_id}/orders` - Unbilled orders and what they add up to.
async fn unbilled_orders(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(table_id): Path<TableId>,
) -> Result<impl IntoResponse, ApiError> {
    let unbilled = TableRepository::new((*state.db).clone())
        .unbilled_orders(tenant.cafe_id(), table_id)
        .await?;
    Ok(Json(unbilled))
}

/// POST `/tables/{table_id}/payout` - Settle the table and free it.
async fn payout_table(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(table_id): Path<TableId>,
    Json(payload): Json<PayoutTableRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = PayoutRepository::new((*state.db).clone())
        .payout(
            tenant.cafe_id(),
            table_id,
            PayoutRequest {
                amount: payload.amount,
                method: payload.method,
                notes: payload.notes,
            },
        )
        .await?;

    Ok(Json(json!({
        "message": "Table paid out",
        "total": summary.total_owed,
        "paid": summary.amount_paid,
        "remaining_credit": summary.remaining_credit,
    })))
}
