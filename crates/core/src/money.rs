//! Money precision.
//!
//! Every stored amount is `NUMERIC(12, 2)`. Values with finer precision are
//! rejected before any arithmetic so totals never disagree with their parts.

use rust_decimal::Decimal;

/// Decimal places kept for prices, totals, payments and balances.
pub const MONEY_SCALE: u32 = 2;

/// True when `value` has no significant digits past [`MONEY_SCALE`].
///
/// Trailing zeros don't count, so `0.330` fits while `0.333` does not.
#[must_use]
pub fn fits_money_scale(value: Decimal) -> bool {
    value.round_dp(MONEY_SCALE) == value
}
