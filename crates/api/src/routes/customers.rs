//! Customer routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use crate::{AppState, error::ApiError, middleware::Tenant};
use cafedesk_db::repositories::{CreateCustomerInput, CustomerRepository, UpdateCustomerInput};
use cafedesk_shared::types::CustomerId;

/// Query parameters for listing customers.
#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    /// Name or phone fragment.
    pub search: Option<String>,
}

/// Request body for creating a customer.
///
/// There is no balance field; balances only move through billing and payments.
#[derive(Debug, Deserialize)]
pub struct CreateCustomerRequest {
    /// Customer name.
    pub name: String,
    /// Phone number, unique within the café when present.
    #[serde(default)]
    pub phone: String,
}

/// Request body for updating a customer.
#[derive(Debug, Deserialize)]
pub struct UpdateCustomerRequest {
    /// New name.
    pub name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
}

/// Creates the customers router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{customer_id}",
            get(get_customer)
                .put(update_customer)
                .delete(delete_customer),
        )
        .route("/customers/{customer_id}/balance", get(customer_balance))
}

/// GET /customers
async fn list_customers(
    State(state): State<AppState>,
    tenant: Tenant,
    Query(query): Query<CustomerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let customers = CustomerRepository::new((*state.db).clone())
        .list(tenant.cafe_id(), query.search.as_deref())
        .await?;
    Ok(Json(customers))
}

/// GET `/customers/{customer_id}`
async fn get_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(customer_id): Path<CustomerId>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .find(tenant.cafe_id(), customer_id)
        .await?;
    Ok(Json(customer))
}

/// POST /customers
async fn create_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Json(payload): Json<CreateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .create(
            tenant.cafe_id(),
            CreateCustomerInput {
                name: payload.name,
                phone: payload.phone,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

/// PUT `/customers/{customer_id}`
async fn update_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(customer_id): Path<CustomerId>,
    Json(payload): Json<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = CustomerRepository::new((*state.db).clone())
        .update(
            tenant.cafe_id(),
            customer_id,
            UpdateCustomerInput {
                name: payload.name,
                phone: payload.phone,
            },
        )
        .await?;
    Ok(Json(customer))
}

/// DELETE `/customers/{customer_id}`
async fn delete_customer(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(customer_id): Path<CustomerId>,
) -> Result<impl IntoResponse, ApiError> {
    CustomerRepository::new((*state.db).clone())
        .delete(tenant.cafe_id(), customer_id)
        .await?;
    Ok(Json(json!({ "message": "Customer deleted successfully" })))
}

/// GET `/customers/{customer_id}/balance`
async fn customer_balance(
    State(state): State<AppState>,
    tenant: Tenant,
    Path(customer_id): Path<CustomerId>,
) -> Result<impl IntoResponse, ApiError> {
    let (customer, balance) = CustomerRepository::new((*state.db).clone())
        .balance(tenant.cafe_id(), customer_id)
        .await?;

    Ok(Json(json!({
        "customer_id": customer.id,
        "name": customer.name,
        "credit_balance": balance,
    })))
}
