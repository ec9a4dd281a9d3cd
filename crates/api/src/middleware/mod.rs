//! Request middleware: bearer authentication and tenant resolution.

pub mod auth;
pub mod tenant;

pub use auth::{AuthUser, auth_middleware};
pub use tenant::{Tenant, tenant_middleware};
