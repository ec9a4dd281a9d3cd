//! Property-based tests for OrderAggregator.
//!
//! - Property 1: order total equals the sum of line subtotals
//! - Property 2: recomputation is idempotent
//! - Property 3: unbilled total ignores billed orders

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::service::OrderAggregator;
use super::types::{BillableOrder, OrderStatus, PricedLine};

/// Strategy for unit prices between 0.00 and 5,000.00.
fn unit_price() -> impl Strategy<Value = Decimal> {
    (0i64..500_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn line() -> impl Strategy<Value = (i32, Decimal)> {
    (1i32..50, unit_price())
}

fn status() -> impl Strategy<Value = OrderStatus> {
    prop_oneof![
        Just(OrderStatus::Pending),
        Just(OrderStatus::Served),
        Just(OrderStatus::Billed),
    ]
}

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

proptest! {
    #[test]
    fn prop_total_is_sum_of_subtotals(lines in prop::collection::vec(line(), 0..20)) {
        let priced: Vec<PricedLine> = lines
            .iter()
            .map(|(q, p)| OrderAggregator::price_line("item", *q, *p).unwrap())
            .collect();

        let expected: Decimal = lines.iter().map(|(q, p)| Decimal::from(*q) * p).sum();
        prop_assert_eq!(OrderAggregator::recompute_order_total(&priced), expected);
    }

    #[test]
    fn prop_appending_a_line_adds_its_subtotal(
        lines in prop::collection::vec(line(), 0..20),
        extra in line(),
    ) {
        let mut priced: Vec<PricedLine> = lines
            .iter()
            .map(|(q, p)| OrderAggregator::price_line("item", *q, *p).unwrap())
            .collect();
        let before = OrderAggregator::recompute_order_total(&priced);

        let added = OrderAggregator::price_line("extra", extra.0, extra.1).unwrap();
        let added_subtotal = added.subtotal;
        priced.push(added);

        let after = OrderAggregator::recompute_order_total(&priced);
        prop_assert_eq!(after, before + added_subtotal);
        prop_assert_eq!(OrderAggregator::recompute_order_total(&priced), after);
    }

    #[test]
    fn prop_unbilled_total_ignores_billed(
        orders in prop::collection::vec((status(), unit_price()), 0..30)
    ) {
        let orders: Vec<Order> = orders
            .into_iter()
            .map(|(status, total)| Order { status, total })
            .collect();

        let expected: Decimal = orders
            .iter()
            .filter(|o| o.status != OrderStatus::Billed)
            .map(|o| o.total)
            .sum();
        prop_assert_eq!(OrderAggregator::unbilled_total(&orders), expected);
        prop_assert!(OrderAggregator::unbilled_total(&orders) >= Decimal::ZERO);
    }
}
