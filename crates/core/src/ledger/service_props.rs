//! Property-based tests for BalanceLedger.
//!
//! - Property 1: balance is never negative for any delta sequence
//! - Property 2: reversing an applied delta restores the prior balance
//! - Property 3: positive deltas are never floored

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::BalanceLedger;

/// Signed deltas between -10,000.00 and 10,000.00.
fn delta() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn balance() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #[test]
    fn prop_balance_never_negative(
        start in balance(),
        deltas in prop::collection::vec(delta(), 0..50),
    ) {
        let mut current = start;
        for d in deltas {
            let change = BalanceLedger::apply_delta(current, d);
            prop_assert!(change.current >= Decimal::ZERO);
            prop_assert_eq!(change.current, change.previous + change.applied_delta);
            current = change.current;
        }
    }

    #[test]
    fn prop_reversal_restores_balance(start in balance(), d in delta()) {
        let change = BalanceLedger::apply_delta(start, d);
        let undone = BalanceLedger::apply_delta(
            change.current,
            BalanceLedger::reversal_of(change.applied_delta),
        );
        prop_assert_eq!(undone.current, start);
    }

    #[test]
    fn prop_positive_delta_applies_fully(start in balance(), cents in 0i64..1_000_000i64) {
        let d = Decimal::new(cents, 2);
        let change = BalanceLedger::apply_delta(start, d);
        prop_assert!(!change.was_floored());
        prop_assert_eq!(change.current, start + d);
    }
}
