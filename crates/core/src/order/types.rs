//! Order domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order status.
///
/// Orders move forward only:
/// - Pending → Served
/// - Pending → Billed
/// - Served → Billed
///
/// Billed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, kitchen working on it.
    Pending,
    /// Order delivered to the table.
    Served,
    /// Order closed out and charged.
    Billed,
}

impl OrderStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Served => "served",
            Self::Billed => "billed",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "served" => Some(Self::Served),
            "billed" => Some(Self::Billed),
            _ => None,
        }
    }

    /// Position in the lifecycle; transitions never decrease it.
    #[must_use]
    pub(crate) const fn stage(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Served => 1,
            Self::Billed => 2,
        }
    }

    /// Returns true once the order has been charged.
    #[must_use]
    pub const fn is_billed(&self) -> bool {
        matches!(self, Self::Billed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything carrying a line subtotal.
pub trait LineItem {
    /// Stored subtotal of the line.
    fn subtotal(&self) -> Decimal;
}

/// Anything that can be summed into a table's bill.
pub trait BillableOrder {
    /// Current status.
    fn status(&self) -> OrderStatus;
    /// Stored order total.
    fn total(&self) -> Decimal;
}

/// A validated order line ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    /// Menu item name as printed on the order.
    pub item_name: String,
    /// Number of units.
    pub quantity: i32,
    /// Unit price.
    pub price: Decimal,
    /// `quantity × price`.
    pub subtotal: Decimal,
}

impl LineItem for PricedLine {
    fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

/// Outcome of a validated status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    /// Status before the change.
    pub from: OrderStatus,
    /// Status after the change.
    pub to: OrderStatus,
}

impl StatusChange {
    /// True when this change bills a previously unbilled order.
    #[must_use]
    pub const fn bills_order(&self) -> bool {
        !self.from.is_billed() && self.to.is_billed()
    }
}
