//! Property-based tests for PayoutWorkflow.
//!
//! - Property 1: paid + carried credit always equals the unbilled total
//! - Property 2: amounts above the unbilled total are always rejected
//! - Property 3: a payment is planned exactly when the amount is positive

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::error::PayoutRuleError;
use super::service::PayoutWorkflow;
use super::types::{PayoutRequest, SeatedParty};
use crate::order::{BillableOrder, OrderStatus};

#[derive(Debug)]
struct Order {
    status: OrderStatus,
    total: Decimal,
}

impl BillableOrder for Order {
    fn status(&self) -> OrderStatus {
        self.status
    }
    fn total(&self) -> Decimal {
        self.total
    }
}

fn orders() -> impl Strategy<Value = Vec<Order>> {
    prop::collection::vec(
        (
            prop_oneof![
                Just(OrderStatus::Pending),
                Just(OrderStatus::Served),
                Just(OrderStatus::Billed),
            ],
            (0i64..100_000i64).prop_map(|c| Decimal::new(c, 2)),
        ),
        0..10,
    )
    .prop_map(|v| {
        v.into_iter()
            .map(|(status, total)| Order { status, total })
            .collect()
    })
}

const PARTY: SeatedParty<'static> = SeatedParty {
    table_name: "Table 1",
    customer_id: None,
    guest_name: "Guest",
    guest_phone: "",
};

proptest! {
    #[test]
    fn prop_paid_plus_credit_equals_owed(orders in orders(), fraction in 0u32..=100) {
        let owed: Decimal = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Billed)
            .map(|o| o.total)
            .sum();
        let amount = (owed * Decimal::from(fraction) / Decimal::from(100)).round_dp(2).min(owed);

        let plan = PayoutWorkflow::plan(
            &PARTY,
            &orders,
            &PayoutRequest { amount, ..PayoutRequest::default() },
        )
        .unwrap();

        prop_assert_eq!(plan.amount_paid + plan.shortfall, plan.total_owed);
        prop_assert!(plan.shortfall >= Decimal::ZERO);
        prop_assert_eq!(plan.payment.is_some(), amount > Decimal::ZERO);
    }

    #[test]
    fn prop_excess_amount_rejected(orders in orders(), excess in 1i64..100_000i64) {
        let owed: Decimal = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Billed)
            .map(|o| o.total)
            .sum();
        let amount = owed + Decimal::new(excess, 2);

        let result = PayoutWorkflow::plan(
            &PARTY,
            &orders,
            &PayoutRequest { amount, ..PayoutRequest::default() },
        );
        let is_exceeds = matches!(result, Err(PayoutRuleError::AmountExceedsTotal { .. }));
        prop_assert!(is_exceeds);
    }
}
