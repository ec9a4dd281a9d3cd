//! Row-level security tests against PostgreSQL.
//!
//! Queries here deliberately leave out `cafe_id` filters and run as a role
//! without superuser rights, so only the migration's policies keep cafés
//! apart. Skipped when no database is reachable at `DATABASE_URL`.

mod common;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbBackend, EntityTrait, QueryFilter, Set,
    Statement, TransactionTrait,
};

use cafedesk_db::entities::{customers, dining_tables, orders};
use cafedesk_shared::types::CustomerId;

use common::postgres::{
    TENANT_ROLE, connect_postgres, ensure_tenant_role, tenant_scope, unique_subdomain,
};
use common::{create_cafe, create_customer, create_table, place_order};

const TENANT_TABLES: [&str; 6] = [
    "customers",
    "dining_tables",
    "menu_items",
    "orders",
    "order_items",
    "payments",
];

// ============================================================================
// Test 1: A café only sees its own rows
// ============================================================================
#[tokio::test]
async fn test_rls_isolates_cafes() {
    let Some(db) = connect_postgres().await else {
        return;
    };
    ensure_tenant_role(&db).await;

    let cafe_a = create_cafe(&db, &unique_subdomain("rls-a")).await;
    let cafe_b = create_cafe(&db, &unique_subdomain("rls-b")).await;
    let table_a = create_table(&db, cafe_a, "Table A").await;
    let table_b = create_table(&db, cafe_b, "Table B").await;
    let order_a = place_order(&db, cafe_a, table_a, "Momo", 2, dec!(60)).await;
    place_order(&db, cafe_b, table_b, "Croissant", 1, dec!(90)).await;

    // Listing without a cafe filter
    {
        let scope = tenant_scope(&db, cafe_a).await;

        let tables = dining_tables::Entity::find()
            .all(scope.conn())
            .await
            .expect("Failed to query tables");
        assert_eq!(tables.len(), 1, "café A should see exactly its table");
        assert_eq!(tables[0].id, table_a.into_inner());

        let orders = orders::Entity::find()
            .all(scope.conn())
            .await
            .expect("Failed to query orders");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].id, order_a.into_inner());

        scope.rollback().await.expect("Failed to rollback");
    }

    // Lookup by id across cafés
    {
        let scope = tenant_scope(&db, cafe_a).await;
        let foreign = dining_tables::Entity::find_by_id(table_b.into_inner())
            .one(scope.conn())
            .await
            .expect("Query should succeed");
        assert!(foreign.is_none(), "café A must not see café B's table");
        scope.rollback().await.expect("Failed to rollback");
    }

    // And the other way round
    {
        let scope = tenant_scope(&db, cafe_b).await;
        let tables = dining_tables::Entity::find()
            .all(scope.conn())
            .await
            .expect("Failed to query tables");
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].id, table_b.into_inner());
        scope.rollback().await.expect("Failed to rollback");
    }
}

// ============================================================================
// Test 2: Writes cannot reach another café
// ============================================================================
#[tokio::test]
async fn test_rls_blocks_cross_cafe_writes() {
    let Some(db) = connect_postgres().await else {
        return;
    };
    ensure_tenant_role(&db).await;

    let cafe_a = create_cafe(&db, &unique_subdomain("rls-w-a")).await;
    let cafe_b = create_cafe(&db, &unique_subdomain("rls-w-b")).await;
    let customer_b = create_customer(&db, cafe_b, "Hari Gurung", "9812345678").await;

    // Updates silently match nothing
    {
        let scope = tenant_scope(&db, cafe_a).await;
        let result = customers::Entity::update_many()
            .col_expr(customers::Column::CreditBalance, Expr::value(dec!(0.01)))
            .filter(customers::Column::Id.eq(customer_b.into_inner()))
            .exec(scope.conn())
            .await
            .expect("Update should succeed");
        assert_eq!(result.rows_affected, 0);
        scope.commit().await.expect("Failed to commit");
    }

    // Inserting a row for another café violates the policy
    {
        let scope = tenant_scope(&db, cafe_a).await;
        let now = chrono::Utc::now();
        let insert = customers::ActiveModel {
            id: Set(CustomerId::new().into_inner()),
            cafe_id: Set(cafe_b.into_inner()),
            name: Set("Intruder".to_string()),
            phone: Set(String::new()),
            credit_balance: Set(Decimal::ZERO),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(scope.conn())
        .await;
        assert!(insert.is_err(), "insert into café B must be rejected");
        scope.rollback().await.expect("Failed to rollback");
    }

    let (customer, balance) = cafedesk_db::CustomerRepository::new(db.clone())
        .balance(cafe_b, customer_b)
        .await
        .expect("Customer missing");
    assert_eq!(customer.name, "Hari Gurung");
    assert_eq!(balance, Decimal::ZERO);
}

// ============================================================================
// Test 3: Without a café context nothing is visible
// ============================================================================
#[tokio::test]
async fn test_rls_hides_everything_without_context() {
    let Some(db) = connect_postgres().await else {
        return;
    };
    ensure_tenant_role(&db).await;

    let cafe = create_cafe(&db, &unique_subdomain("rls-none")).await;
    let table = create_table(&db, cafe, "Table 1").await;
    place_order(&db, cafe, table, "Tea", 1, dec!(25)).await;

    let txn = db.begin().await.expect("Failed to begin transaction");
    txn.execute_unprepared(&format!("SET LOCAL ROLE {TENANT_ROLE}"))
        .await
        .expect("Failed to switch role");

    let orders = orders::Entity::find()
        .all(&txn)
        .await
        .expect("Failed to query orders");
    assert!(orders.is_empty());

    txn.rollback().await.expect("Failed to rollback");
}

// ============================================================================
// Test 4: Table owners are subject to the policies too
// ============================================================================
#[tokio::test]
async fn test_rls_forced_on_tenant_tables() {
    let Some(db) = connect_postgres().await else {
        return;
    };

    let rows = db
        .query_all(Statement::from_string(
            DbBackend::Postgres,
            "SELECT relname::text AS relname, relrowsecurity, relforcerowsecurity \
             FROM pg_class \
             WHERE relnamespace = 'public'::regnamespace AND relkind = 'r'",
        ))
        .await
        .expect("Failed to read pg_class");

    for table in TENANT_TABLES {
        let row = rows
            .iter()
            .find(|row| row.try_get::<String>("", "relname").is_ok_and(|name| name == table))
            .unwrap_or_else(|| panic!("table {table} missing"));
        let enabled: bool = row.try_get("", "relrowsecurity").expect("relrowsecurity");
        let forced: bool = row.try_get("", "relforcerowsecurity").expect("relforcerowsecurity");
        assert!(enabled, "RLS not enabled on {table}");
        assert!(forced, "RLS not forced on {table}");
    }

    let cafes = rows
        .iter()
        .find(|row| row.try_get::<String>("", "relname").is_ok_and(|name| name == "cafes"))
        .expect("cafes table missing");
    let enabled: bool = cafes.try_get("", "relrowsecurity").expect("relrowsecurity");
    assert!(!enabled, "cafes are looked up before a tenant is known");
}
