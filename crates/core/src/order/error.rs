//! Order rule violations.

use rust_decimal::Decimal;
use thiserror::Error;

use super::types::OrderStatus;

/// Errors raised while validating order input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRuleError {
    /// Item name is blank.
    #[error("item name is required")]
    EmptyItemName,

    /// Quantity must be at least one.
    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(i32),

    /// Unit price below zero.
    #[error("price cannot be negative, got {0}")]
    NegativePrice(Decimal),

    /// Unit price with more than two decimal places.
    #[error("price must have at most 2 decimal places, got {0}")]
    PriceTooPrecise(Decimal),

    /// Order must have at least one item on creation.
    #[error("order must contain at least one item")]
    NoItems,

    /// Unknown status string.
    #[error("invalid order status: {0}")]
    InvalidStatus(String),

    /// Backward status change, including reopening a billed order.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition {
        /// Current status.
        from: OrderStatus,
        /// Requested status.
        to: OrderStatus,
    },

    /// Items cannot be added once an order is billed.
    #[error("order is already billed")]
    AlreadyBilled,
}

impl OrderRuleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyItemName => "empty_item_name",
            Self::InvalidQuantity(_) => "invalid_quantity",
            Self::NegativePrice(_) => "negative_price",
            Self::PriceTooPrecise(_) => "invalid_price",
            Self::NoItems => "no_items",
            Self::InvalidStatus(_) => "invalid_status",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::AlreadyBilled => "order_billed",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
