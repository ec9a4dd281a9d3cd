//! Concurrent settlement tests against PostgreSQL.
//!
//! These verify that row locks serialize writers:
//! - Two payouts racing on one table settle it exactly once
//! - Payments racing on one customer never lose an update
//! - Items racing onto one order all land in its total
//!
//! Skipped when no database is reachable at `DATABASE_URL`.

#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::items_after_statements)]

mod common;

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use cafedesk_core::payout::{PayoutRequest, PayoutRuleError};
use cafedesk_db::repositories::{
    BalanceLedgerRepository, CreatePaymentInput, CustomerRepository, NewOrderItem,
    OrderRepository, PaymentRepository, PayoutError, PayoutRepository,
};

use common::postgres::{connect_postgres, unique_subdomain};
use common::{create_cafe, create_customer, create_table, place_order, seat_customer};

// ============================================================================
// Test 1: Two payouts on one table, only one settles it
// ============================================================================
#[tokio::test]
async fn test_concurrent_payouts_settle_table_once() {
    let Some(db) = connect_postgres().await else {
        return;
    };

    let cafe = create_cafe(&db, &unique_subdomain("payout")).await;
    let table = create_table(&db, cafe, "Table 1").await;
    let customer = create_customer(&db, cafe, "Ram Sharma", "9841000001").await;
    seat_customer(&db, cafe, table, customer).await;
    place_order(&db, cafe, table, "Momo", 2, dec!(60)).await;
    place_order(&db, cafe, table, "Thakali Set", 1, dec!(180)).await;

    const RACERS: usize = 2;
    let barrier = Arc::new(Barrier::new(RACERS));
    let mut handles = Vec::with_capacity(RACERS);

    for _ in 0..RACERS {
        let repo = PayoutRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.payout(
                cafe,
                table,
                PayoutRequest {
                    amount: dec!(200),
                    method: Some("cash".to_string()),
                    notes: None,
                },
            )
            .await
        }));
    }

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("Payout task panicked"))
        .collect();

    let settled: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(settled.len(), 1, "exactly one payout should succeed");
    assert_eq!(settled[0].total_owed, dec!(300));
    assert_eq!(settled[0].remaining_credit, dec!(100));

    let rejected = results
        .iter()
        .find_map(|r| r.as_ref().err())
        .expect("one payout should be rejected");
    assert!(
        matches!(
            rejected,
            PayoutError::Rule(PayoutRuleError::AmountExceedsTotal { owed, .. }) if owed.is_zero()
        ),
        "unexpected error: {rejected}"
    );

    let payments = PaymentRepository::new(db.clone())
        .list(cafe, None)
        .await
        .expect("Failed to list payments");
    assert_eq!(payments.len(), 1);

    let (_, balance) = CustomerRepository::new(db.clone())
        .balance(cafe, customer)
        .await
        .expect("Customer missing");
    assert_eq!(balance, dec!(100));
}

// ============================================================================
// Test 2: Payments on one customer never lose an update
// ============================================================================
#[tokio::test]
async fn test_concurrent_payments_keep_balance_exact() {
    let Some(db) = connect_postgres().await else {
        return;
    };

    let cafe = create_cafe(&db, &unique_subdomain("payments")).await;
    let customer = create_customer(&db, cafe, "Sita Thapa", "9800000001").await;
    BalanceLedgerRepository::new(db.clone())
        .apply_delta(cafe, customer, dec!(1000))
        .await
        .expect("Failed to open balance");

    const PAYMENTS: usize = 20;
    let amount = dec!(10);
    let barrier = Arc::new(Barrier::new(PAYMENTS));
    let mut handles = Vec::with_capacity(PAYMENTS);

    for i in 0..PAYMENTS {
        let repo = PaymentRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.create(
                cafe,
                CreatePaymentInput {
                    customer_id: customer,
                    order_id: None,
                    amount,
                    method: None,
                    notes: Some(format!("Installment {i}")),
                },
            )
            .await
        }));
    }

    for joined in join_all(handles).await {
        joined
            .expect("Payment task panicked")
            .expect("Payment failed");
    }

    let (_, balance) = CustomerRepository::new(db.clone())
        .balance(cafe, customer)
        .await
        .expect("Customer missing");
    assert_eq!(balance, dec!(1000) - amount * Decimal::from(PAYMENTS as i64));
    assert_eq!(balance, dec!(800));

    let recorded = PaymentRepository::new(db.clone())
        .list(cafe, Some(customer))
        .await
        .expect("Failed to list payments");
    assert_eq!(recorded.len(), PAYMENTS);
    assert!(recorded.iter().all(|p| p.balance_delta == -amount));
}

// ============================================================================
// Test 3: Items added at once all count toward the total
// ============================================================================
#[tokio::test]
async fn test_concurrent_item_additions_sum_into_total() {
    let Some(db) = connect_postgres().await else {
        return;
    };

    let cafe = create_cafe(&db, &unique_subdomain("items")).await;
    let table = create_table(&db, cafe, "Table 1").await;
    let order = place_order(&db, cafe, table, "Coffee", 1, dec!(150)).await;

    const ITEMS: usize = 15;
    let barrier = Arc::new(Barrier::new(ITEMS));
    let mut handles = Vec::with_capacity(ITEMS);

    for _ in 0..ITEMS {
        let repo = OrderRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.add_item(
                cafe,
                order,
                NewOrderItem {
                    item_name: "Samosa".to_string(),
                    quantity: 2,
                    price: dec!(12.50),
                },
            )
            .await
        }));
    }

    for joined in join_all(handles).await {
        joined
            .expect("Item task panicked")
            .expect("Adding item failed");
    }

    let stored = OrderRepository::new(db.clone())
        .find(cafe, order)
        .await
        .expect("Order missing");
    assert_eq!(stored.items.len(), ITEMS + 1);
    assert_eq!(stored.order.total, dec!(525));
}
