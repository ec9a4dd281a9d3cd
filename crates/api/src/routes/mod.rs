//! API route definitions.

use axum::{Router, middleware};

use crate::AppState;
use crate::middleware::{auth_middleware, tenant_middleware};

pub mod cafes;
pub mod customers;
pub mod health;
pub mod menu;
pub mod orders;
pub mod payments;
pub mod tables;

/// Creates the API router: public health check, admin café management and
/// the café-scoped routes.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    // Platform administration; not scoped to a tenant
    let admin_routes = Router::new()
        .merge(cafes::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // Tenant middleware runs after authentication
    let tenant_routes = Router::new()
        .merge(tables::routes())
        .merge(menu::routes())
        .merge(customers::routes())
        .merge(orders::routes())
        .merge(payments::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tenant_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(admin_routes)
        .merge(tenant_routes)
}
