//! Order routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, middleware::Tenant};
use cafedesk_core::order::{OrderRuleError, OrderStatus};
use cafedesk_db::repositories::{
    CreateOrderInput, NewOrderItem, OrderFilter, OrderRepository, UpdateOrderInput,
};
use cafedesk_shared::types::{CustomerId, OrderId, TableId};

/// Query parameters for listing orders.
#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    /// `pending`, `served` or `billed`.
    pub status: Option<String>,
    /// Only orders of this table.
    pub table_id: Option<TableId>,
    /// Only orders of this customer.
    pub customer_id: Option<CustomerId>,
}

/// One line of an order request.
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    /// Item name as printed on the bill.
    pub item_name: String,
    /// Quantity, at least 1.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
}

impl From<OrderItemRequest> for NewOrderItem {
    fn from(item: OrderItemRequest) -> Self {
        Self {
            item_name: item.item_name,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Request body for creating an order.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Table the order is for.
    pub table_id: TableId,
    /// Customer to bill; defaults to the customer seated at the table.
    pub customer_id: Option<CustomerId>,
    /// Order lines.
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
    /// Kitchen notes.
    pub notes: Option<String>,
}

/// Request body for updating an order.
#[derive(Debug, Deserialize)]
pub struct UpdateOrderRequest {
    /// New status.
    pub status: Option<String>,
    /// New notes.
    pub notes: Option<String>,
}

fn parse_status(raw: &str) -> Result<OrderStatus, OrderRuleError> {
    OrderStatus::parse(raw).ok_or_else(|| OrderRuleError::InvalidStatus(raw.to_string()))
}

/// Creates the orders router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{order_id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/orders/{order_id}/items", post(add_order_item))
}

/// GET /orders - Newest first.
async fn list_orders(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = OrderFilter {
        status: query.status.as_deref().map(parse_status).transpose()?,
        table_id: query.table_id,
        customer_id: query.customer_id,
    };
    let orders = OrderRepository::new((*state.db).clone())
        .list(tenant.cafe_id(), filter)
        .await?;
    Ok(Json(orders))
}

/// GET `/orders/{order_id}` - The order with its items.
async fn get_order(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderRepository::new((*state.db).clone())
        .find(tenant.cafe_id(), order_id)
        .await?;
    Ok(Json(order))
}

/// POST /orders
async fn create_order(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = OrderRepository::new((*state.db).clone())
        .create(
            tenant.cafe_id(),
            CreateOrderInput {
                table_id: payload.table_id,
                customer_id: payload.customer_id,
                items: payload.items.into_iter().map(Into::into).collect(),
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// PUT `/orders/{order_id}` - Billing adds the total to the customer's balance.
async fn update_order(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = payload.status.as_deref().map(parse_status).transpose()?;
    let order = OrderRepository::new((*state.db).clone())
        .update(
            tenant.cafe_id(),
            order_id,
            UpdateOrderInput {
                status,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(order))
}

/// DELETE `/orders/{order_id}` - Items go with the order.
async fn delete_order(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(order_id): Path<OrderId>,
) -> Result<impl IntoResponse, ApiError> {
    OrderRepository::new((*state.db).clone())
        .delete(tenant.cafe_id(), order_id)
        .await?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

/// POST `/orders/{order_id}/items` - Responds with the new item.
async fn add_order_item(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(order_id): Path<OrderId>,
    Json(payload): Json<OrderItemRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (item, _order) = OrderRepository::new((*state.db).clone())
        .add_item(tenant.cafe_id(), order_id, payload.into())
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}
