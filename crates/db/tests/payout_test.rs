//! Integration tests for table payouts.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use cafedesk_core::payout::{PayoutRequest, PayoutRuleError, SettlementSummary};
use cafedesk_db::entities::sea_orm_active_enums::{OrderStatus, TableStatus};
use cafedesk_db::repositories::{
    CustomerRepository, OrderRepository, PaymentRepository, PayoutError, PayoutRepository,
    TableRepository,
};
use cafedesk_shared::types::{CustomerId, PaymentId, TableId};

use common::{
    create_cafe, create_customer, create_table, place_order, seat_customer, seat_guest, setup_db,
};

fn cash(amount: Decimal) -> PayoutRequest {
    PayoutRequest {
        amount,
        method: Some("cash".to_string()),
        notes: None,
    }
}

// ============================================================================
// Test 1: Partial payment carries the shortfall to the customer
// ============================================================================
#[tokio::test]
async fn test_partial_payout_bills_orders_and_carries_credit() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 1").await;
    let customer = create_customer(&db, cafe, "Ram Sharma", "9841000001").await;
    seat_customer(&db, cafe, table, customer).await;

    let first = place_order(&db, cafe, table, "Momo", 2, dec!(60)).await;
    let second = place_order(&db, cafe, table, "Thakali Set", 1, dec!(180)).await;

    let summary = PayoutRepository::new(db.clone())
        .payout(cafe, table, cash(dec!(200)))
        .await
        .expect("Payout failed");

    assert_eq!(
        summary,
        SettlementSummary {
            total_owed: dec!(300),
            amount_paid: dec!(200),
            remaining_credit: dec!(100),
        }
    );

    let orders = OrderRepository::new(db.clone());
    for id in [first, second] {
        let order = orders.find(cafe, id).await.expect("Order missing");
        assert_eq!(order.order.status, OrderStatus::Billed);
    }

    let payments = PaymentRepository::new(db.clone())
        .list(cafe, Some(customer))
        .await
        .expect("Failed to list payments");
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, dec!(200));
    assert_eq!(payments[0].method, "cash");
    assert_eq!(payments[0].order_id, None);

    let (_, balance) = CustomerRepository::new(db.clone())
        .balance(cafe, customer)
        .await
        .expect("Customer missing");
    assert_eq!(balance, dec!(100));

    let table = TableRepository::new(db.clone())
        .find(cafe, table)
        .await
        .expect("Table missing");
    assert_eq!(table.status, TableStatus::Free);
    assert_eq!(table.customer_id, None);
    assert!(table.guest_name.is_empty());
    assert!(table.guest_phone.is_empty());
}

// ============================================================================
// Test 2: Overpayment is rejected and nothing changes
// ============================================================================
#[tokio::test]
async fn test_payout_above_total_is_rejected_without_side_effects() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 1").await;
    let customer = create_customer(&db, cafe, "Ram Sharma", "").await;
    seat_customer(&db, cafe, table, customer).await;
    let order = place_order(&db, cafe, table, "Momo", 5, dec!(60)).await;

    let result = PayoutRepository::new(db.clone())
        .payout(cafe, table, cash(dec!(350)))
        .await;

    assert!(matches!(
        result,
        Err(PayoutError::Rule(PayoutRuleError::AmountExceedsTotal { .. }))
    ));

    let order = OrderRepository::new(db.clone())
        .find(cafe, order)
        .await
        .expect("Order missing");
    assert_eq!(order.order.status, OrderStatus::Pending);

    let table = TableRepository::new(db.clone())
        .find(cafe, table)
        .await
        .expect("Table missing");
    assert_eq!(table.status, TableStatus::Occupied);
    assert_eq!(table.customer_id, Some(customer.into_inner()));

    let payments = PaymentRepository::new(db.clone())
        .list(cafe, None)
        .await
        .expect("Failed to list payments");
    assert!(payments.is_empty());

    let (_, balance) = CustomerRepository::new(db.clone())
        .balance(cafe, customer)
        .await
        .expect("Customer missing");
    assert_eq!(balance, Decimal::ZERO);
}

// ============================================================================
// Test 3: Exact payment leaves no credit
// ============================================================================
#[tokio::test]
async fn test_full_payout_leaves_no_credit() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 1").await;
    let customer = create_customer(&db, cafe, "Hari Gurung", "").await;
    seat_customer(&db, cafe, table, customer).await;
    place_order(&db, cafe, table, "Coffee", 3, dec!(150)).await;

    let summary = PayoutRepository::new(db.clone())
        .payout(
            cafe,
            table,
            PayoutRequest {
                amount: dec!(450),
                method: Some("Card".to_string()),
                notes: Some("Visa".to_string()),
            },
        )
        .await
        .expect("Payout failed");

    assert_eq!(summary.remaining_credit, Decimal::ZERO);

    let payments = PaymentRepository::new(db.clone())
        .list(cafe, Some(customer))
        .await
        .expect("Failed to list payments");
    assert_eq!(payments[0].method, "Card");
    assert_eq!(payments[0].notes, "Visa");

    let (_, balance) = CustomerRepository::new(db.clone())
        .balance(cafe, customer)
        .await
        .expect("Customer missing");
    assert_eq!(balance, Decimal::ZERO);
}

// ============================================================================
// Test 4: Deleting a payout's payment puts the amount back on the balance
// ============================================================================
#[tokio::test]
async fn test_deleting_payout_payment_restores_owed_amount() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 1").await;
    let customer = create_customer(&db, cafe, "Ram Sharma", "").await;
    seat_customer(&db, cafe, table, customer).await;
    place_order(&db, cafe, table, "Momo", 5, dec!(60)).await;

    PayoutRepository::new(db.clone())
        .payout(cafe, table, cash(dec!(200)))
        .await
        .expect("Payout failed");

    let payments = PaymentRepository::new(db.clone());
    let recorded = payments
        .list(cafe, Some(customer))
        .await
        .expect("Failed to list payments");
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].balance_delta, dec!(-200));

    let customers = CustomerRepository::new(db.clone());
    let (_, balance) = customers.balance(cafe, customer).await.expect("Customer missing");
    assert_eq!(balance, dec!(100));

    payments
        .delete(cafe, PaymentId::from_uuid(recorded[0].id))
        .await
        .expect("Failed to delete payment");

    let (_, balance) = customers.balance(cafe, customer).await.expect("Customer missing");
    assert_eq!(balance, dec!(300));
}

// ============================================================================
// Test 5: A freed table owes nothing
// ============================================================================
#[tokio::test]
async fn test_second_payout_on_freed_table() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 1").await;
    let customer = create_customer(&db, cafe, "Ram Sharma", "").await;
    seat_customer(&db, cafe, table, customer).await;
    place_order(&db, cafe, table, "Momo", 1, dec!(100)).await;

    let repo = PayoutRepository::new(db.clone());
    repo.payout(cafe, table, cash(dec!(100)))
        .await
        .expect("First payout failed");

    let summary = repo
        .payout(cafe, table, cash(Decimal::ZERO))
        .await
        .expect("Empty payout failed");
    assert_eq!(summary.total_owed, Decimal::ZERO);
    assert_eq!(summary.remaining_credit, Decimal::ZERO);

    let result = repo.payout(cafe, table, cash(dec!(50))).await;
    assert!(matches!(
        result,
        Err(PayoutError::Rule(PayoutRuleError::AmountExceedsTotal { .. }))
    ));

    let payments = PaymentRepository::new(db.clone())
        .list(cafe, None)
        .await
        .expect("Failed to list payments");
    assert_eq!(payments.len(), 1);
}

// ============================================================================
// Test 6: Walk-in guests become customers, matched by phone
// ============================================================================
#[tokio::test]
async fn test_guest_payout_creates_and_reuses_customer() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 2").await;
    let repo = PayoutRepository::new(db.clone());
    let customers = CustomerRepository::new(db.clone());

    seat_guest(&db, cafe, table, "Sita Thapa", "9800000001").await;
    place_order(&db, cafe, table, "Lassi", 2, dec!(75)).await;
    repo.payout(cafe, table, cash(dec!(100)))
        .await
        .expect("First guest payout failed");

    let listed = customers
        .list(cafe, Some("9800000001"))
        .await
        .expect("Failed to list customers");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Sita Thapa");
    assert_eq!(listed[0].credit_balance, dec!(50));
    let guest = CustomerId::from_uuid(listed[0].id);

    seat_guest(&db, cafe, table, "Sita", "9800000001").await;
    place_order(&db, cafe, table, "Tea", 1, dec!(25)).await;
    repo.payout(cafe, table, cash(Decimal::ZERO))
        .await
        .expect("Second guest payout failed");

    let listed = customers
        .list(cafe, None)
        .await
        .expect("Failed to list customers");
    assert_eq!(listed.len(), 1);

    let (_, balance) = customers.balance(cafe, guest).await.expect("Guest missing");
    assert_eq!(balance, dec!(75));
}

// ============================================================================
// Test 7: Orders on an unassigned table bill to a table-named guest
// ============================================================================
#[tokio::test]
async fn test_unassigned_table_bills_to_table_guest() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Patio 5").await;
    let order = place_order(&db, cafe, table, "Coffee", 2, dec!(40)).await;

    let summary = PayoutRepository::new(db.clone())
        .payout(cafe, table, cash(Decimal::ZERO))
        .await
        .expect("Payout failed");
    assert_eq!(summary.remaining_credit, dec!(80));

    let listed = CustomerRepository::new(db.clone())
        .list(cafe, None)
        .await
        .expect("Failed to list customers");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "Guest - Patio 5");
    assert_eq!(listed[0].credit_balance, dec!(80));

    let order = OrderRepository::new(db.clone())
        .find(cafe, order)
        .await
        .expect("Order missing");
    assert_eq!(order.order.customer_id, Some(listed[0].id));
}

// ============================================================================
// Test 8: Lookups are scoped to the café
// ============================================================================
#[tokio::test]
async fn test_payout_rejects_unknown_or_foreign_table() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let other = create_cafe(&db, "bakery").await;
    let table = create_table(&db, cafe, "Table 1").await;
    let repo = PayoutRepository::new(db.clone());

    let missing = TableId::new();
    assert!(matches!(
        repo.payout(cafe, missing, cash(Decimal::ZERO)).await,
        Err(PayoutError::TableNotFound(id)) if id == missing
    ));
    assert!(matches!(
        repo.payout(other, table, cash(Decimal::ZERO)).await,
        Err(PayoutError::TableNotFound(_))
    ));
}

#[tokio::test]
async fn test_negative_payout_is_rejected() {
    let db = setup_db().await;
    let cafe = create_cafe(&db, "altia").await;
    let table = create_table(&db, cafe, "Table 1").await;
    place_order(&db, cafe, table, "Coffee", 1, dec!(40)).await;

    let result = PayoutRepository::new(db.clone())
        .payout(cafe, table, cash(dec!(-1)))
        .await;
    assert!(matches!(
        result,
        Err(PayoutError::Rule(PayoutRuleError::NegativeAmount(_)))
    ));
}
