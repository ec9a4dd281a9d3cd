//! Customer credit balance arithmetic.

use rust_decimal::Decimal;

use super::types::BalanceChange;

/// Stateless balance arithmetic.
///
/// A customer balance is money the café expects to collect. It moves by
/// signed deltas and never drops below zero: overpayment is absorbed.
pub struct BalanceLedger;

impl BalanceLedger {
    /// Applies `delta` to `current`, flooring the result at zero.
    ///
    /// The returned change records both the requested and the applied delta;
    /// they differ only when the floor kicked in.
    #[must_use]
    pub fn apply_delta(current: Decimal, delta: Decimal) -> BalanceChange {
        let next = (current + delta).max(Decimal::ZERO);
        BalanceChange {
            previous: current,
            requested_delta: delta,
            applied_delta: next - current,
            current: next,
        }
    }

    /// Delta that undoes a previously applied delta.
    #[must_use]
    pub fn reversal_of(applied_delta: Decimal) -> Decimal {
        -applied_delta
    }
}
