//! Balance ledger types.

use rust_decimal::Decimal;
use serde::Serialize;

/// Result of applying a delta to a customer balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BalanceChange {
    /// Balance before the change.
    pub previous: Decimal,
    /// Delta the caller asked for.
    pub requested_delta: Decimal,
    /// Delta actually applied after flooring at zero.
    pub applied_delta: Decimal,
    /// Balance after the change.
    pub current: Decimal,
}

impl BalanceChange {
    /// True when the zero floor absorbed part of the requested delta.
    #[must_use]
    pub fn was_floored(&self) -> bool {
        self.applied_delta != self.requested_delta
    }
}
