//! Tenant resolution for café-scoped routes.
//!
//! The café a request works on comes from, in order:
//! 1. the `X-Tenant` header (café UUID or subdomain),
//! 2. the first label of the `Host` header when it has a subdomain,
//! 3. the `cafe` claim of the bearer token.
//!
//! A café resolved from the request must match the token's café. Runs after
//! `auth_middleware`.

use std::net::IpAddr;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header::HOST, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::AppState;
use crate::error::ApiError;
use cafedesk_db::repositories::{CafeError, CafeRepository};
use cafedesk_shared::Claims;
use cafedesk_shared::types::CafeId;

/// Header carrying an explicit tenant key.
pub const TENANT_HEADER: &str = "x-tenant";

/// The café the current request is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenant(pub CafeId);

impl Tenant {
    /// Returns the café id.
    #[must_use]
    pub const fn cafe_id(self) -> CafeId {
        self.0
    }
}

/// Returns the tenant key named by the request, if any.
fn tenant_key(headers: &HeaderMap) -> Option<String> {
    let explicit = headers
        .get(TENANT_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    if let Some(key) = explicit {
        return Some(key.to_string());
    }

    headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .and_then(subdomain_of)
}

/// First label of a host name with at least three labels.
fn subdomain_of(host: &str) -> Option<String> {
    let host = host.rsplit_once(':').map_or(host, |(name, port)| {
        if port.chars().all(|c| c.is_ascii_digit()) {
            name
        } else {
            host
        }
    });
    if host.parse::<IpAddr>().is_ok() {
        return None;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 && !labels[0].is_empty() {
        Some(labels[0].to_ascii_lowercase())
    } else {
        None
    }
}

/// Resolves the tenant and stores it in the request extensions.
pub async fn tenant_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(claims) = request.extensions().get::<Claims>().cloned() else {
        return ApiError::new(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Authentication required",
        )
        .into_response();
    };

    let cafes = CafeRepository::new((*state.db).clone());
    let lookup = match tenant_key(request.headers()) {
        Some(key) => cafes.resolve(&key).await,
        None => cafes.find(claims.cafe_id()).await,
    };

    let cafe = match lookup {
        Ok(cafe) => cafe,
        Err(CafeError::NotFound(key)) => {
            debug!(tenant = %key, "Unknown tenant");
            return ApiError::not_found("Tenant not found").into_response();
        }
        Err(e) => return ApiError::from(e).into_response(),
    };

    let cafe_id = CafeId::from_uuid(cafe.id);
    if cafe_id != claims.cafe_id() {
        warn!(
            staff_id = %claims.staff_id(),
            token_cafe = %claims.cafe_id(),
            cafe_id = %cafe_id,
            "Tenant does not match token"
        );
        return ApiError::forbidden("Token is not valid for this cafe").into_response();
    }
    if !cafe.active {
        return ApiError::forbidden("Cafe is inactive").into_response();
    }

    request.extensions_mut().insert(Tenant(cafe_id));
    next.run(request).await
}

impl<S> FromRequestParts<S> for Tenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .copied()
            .ok_or_else(|| ApiError::forbidden("No tenant resolved for this request"))
    }
}
