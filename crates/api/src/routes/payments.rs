//! Payment routes.

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
use cafedesk_db::repositories::{CreatePaymentInput, PaymentRepository};
use cafedesk_shared::types::{CustomerId, OrderId, PaymentId};

/// Query parameters for listing payments.
#[derive(Debug, Default, Deserialize)]
pub struct PaymentQuery {
    /// Only payments of this customer.
    pub customer_id: Option<CustomerId>,
}

/// Request body for recording a payment.
#[derive(Debug, Deserialize)]
pub struct CreatePaymentRequest {
    /// Paying customer.
    pub customer_id: CustomerId,
    /// Order the payment is for.
    pub order_id: Option<OrderId>,
    /// Amount received, greater than zero.
    pub amount: Decimal,
    /// Payment method, `cash` when omitted.
    pub method: Option<String>,
    /// Free-form note.
    pub notes: Option<String>,
}

/// Creates the payments router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/payments", get(list_payments).post(create_payment))
        .route(
            "/payments/{payment_id}",
            get(get_payment).delete(delete_payment),
        )
}

/// GET /payments - Newest first.
async fn list_payments(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<PaymentQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = PaymentRepository::new((*state.db).clone())
        .list(tenant.cafe_id(), query.customer_id)
        .await?;
    Ok(Json(payments))
}

/// GET `/payments/{payment_id}`
async fn get_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(payment_id): Path<PaymentId>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = PaymentRepository::new((*state.db).clone())
        .find(tenant.cafe_id(), payment_id)
        .await?;
    Ok(Json(payment))
}

/// POST /payments - Lowers the customer's balance.
async fn create_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = PaymentRepository::new((*state.db).clone())
        .create(
            tenant.cafe_id(),
            CreatePaymentInput {
                customer_id: payload.customer_id,
                order_id: payload.order_id,
                amount: payload.amount,
                method: payload.method,
                notes: payload.notes,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

/// DELETE `/payments/{payment_id}` - Puts back what the payment took off the balance.
async fn delete_payment(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(payment_id): Path<PaymentId>,
) -> Result<impl IntoResponse, ApiError> {
    PaymentRepository::new((*state.db).clone())
        .delete(tenant.cafe_id(), payment_id)
        .await?;
    Ok(Json(json!({ "message": "Payment deleted successfully" })))
}
