//! HTTP error responses.
//!
//! Handlers return `Result<_, ApiError>`. Repository errors convert into
//! `ApiError` through `AppError`, except rule violations, which keep their
//! own error code. Every body has the shape
//! `{"error": "<snake_code>", "message": "<text>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use cafedesk_core::order::OrderRuleError;
use cafedesk_core::payout::PayoutRuleError;
use cafedesk_core::table::TableRuleError;
use cafedesk_db::repositories::{
    CafeError, CustomerError, LedgerError, MenuError, OrderError, PaymentError, PayoutError,
    TableError,
};
use cafedesk_shared::AppError;

/// An error response.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    /// Builds an error response from its parts.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// 400 with the generic validation code.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation(message.into()).into()
    }

    /// 404 with the generic not-found code.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into()).into()
    }

    /// 403 with the generic forbidden code.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into()).into()
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Error code of the response.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    fn rule(status: u16, code: &'static str, message: String) -> Self {
        Self::new(
            StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_REQUEST),
            code,
            message,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Some(detail) = &self.detail {
            error!(code = self.code, error = %detail, "Request failed");
        }
        (
            self.status,
            Json(json!({
                "error": self.code,
                "message": self.message,
            })),
        )
            .into_response()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            code: err.error_code(),
            message: err.public_message(),
            detail: err.is_server_error().then(|| err.to_string()),
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

impl From<OrderRuleError> for ApiError {
    fn from(err: OrderRuleError) -> Self {
        Self::rule(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<TableRuleError> for ApiError {
    fn from(err: TableRuleError) -> Self {
        Self::rule(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<PayoutRuleError> for ApiError {
    fn from(err: PayoutRuleError) -> Self {
        Self::rule(err.http_status_code(), err.error_code(), err.to_string())
    }
}

impl From<CafeError> for ApiError {
    fn from(err: CafeError) -> Self {
        let app = match err {
            CafeError::NotFound(_) => AppError::NotFound(err.to_string()),
            CafeError::EmptyName | CafeError::InvalidSubdomain(_) => {
                AppError::Validation(err.to_string())
            }
            CafeError::DuplicateSubdomain(_) => AppError::Conflict(err.to_string()),
            CafeError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        let app = match err {
            CustomerError::NotFound(_) => AppError::NotFound(err.to_string()),
            CustomerError::EmptyName => AppError::Validation(err.to_string()),
            CustomerError::DuplicatePhone(_) | CustomerError::HasPayments => {
                AppError::Conflict(err.to_string())
            }
            CustomerError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let app = match err {
            LedgerError::CustomerNotFound(_) => AppError::NotFound(err.to_string()),
            LedgerError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<MenuError> for ApiError {
    fn from(err: MenuError) -> Self {
        let app = match err {
            MenuError::NotFound(_) => AppError::NotFound(err.to_string()),
            MenuError::EmptyName
            | MenuError::NegativePrice(_)
            | MenuError::PriceTooPrecise(_) => {
                AppError::Validation(err.to_string())
            }
            MenuError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        let app = match err {
            TableError::Rule(rule) => return rule.into(),
            TableError::NotFound(_) | TableError::CustomerNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            TableError::HasOrders => AppError::Conflict(err.to_string()),
            TableError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        let app = match err {
            OrderError::Rule(rule) => return rule.into(),
            OrderError::NotFound(_)
            | OrderError::TableNotFound(_)
            | OrderError::CustomerNotFound(_) => AppError::NotFound(err.to_string()),
            OrderError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        let app = match err {
            PaymentError::NotFound(_)
            | PaymentError::CustomerNotFound(_)
            | PaymentError::OrderNotFound(_) => AppError::NotFound(err.to_string()),
            PaymentError::InvalidAmount(_) => AppError::Validation(err.to_string()),
            PaymentError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}

impl From<PayoutError> for ApiError {
    fn from(err: PayoutError) -> Self {
        let app = match err {
            PayoutError::Rule(rule) => return rule.into(),
            PayoutError::Customer(customer) => return customer.into(),
            PayoutError::TableNotFound(_) | PayoutError::CustomerNotFound(_) => {
                AppError::NotFound(err.to_string())
            }
            PayoutError::Database(e) => AppError::Database(e.to_string()),
        };
        app.into()
    }
}
