//! Payout rule violations.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while planning a payout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayoutRuleError {
    /// Payout amount below zero.
    #[error("amount cannot be negative")]
    NegativeAmount(Decimal),

    /// Payout amount with more than two decimal places.
    #[error("amount must have at most 2 decimal places")]
    AmountTooPrecise(Decimal),

    /// Payout amount larger than what the table owes.
    #[error("amount exceeds total")]
    AmountExceedsTotal {
        /// Amount offered.
        amount: Decimal,
        /// Unbilled total of the table.
        owed: Decimal,
    },
}

impl PayoutRuleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NegativeAmount(_) => "negative_amount",
            Self::AmountTooPrecise(_) => "invalid_amount",
            Self::AmountExceedsTotal { .. } => "amount_exceeds_total",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
