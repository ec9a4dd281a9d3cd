//! Shared fixtures for repository tests.
//!
//! Each test gets its own in-memory SQLite database with the schema generated
//! from the entities. SQLite stores decimals as floating point, so fixtures
//! stick to amounts that are exact in binary.

#![allow(dead_code)]

pub mod postgres;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

use cafedesk_db::entities::{
    cafes, customers, dining_tables, menu_items, order_items, orders, payments,
};
use cafedesk_db::repositories::{
    AssignTableInput, CafeRepository, CreateCafeInput, CreateCustomerInput, CreateOrderInput,
    CreateTableInput, CustomerRepository, NewOrderItem, OrderRepository, TableRepository,
};
use cafedesk_core::table::TableStatus;
use cafedesk_shared::types::{CafeId, CustomerId, OrderId, TableId};
use rust_decimal::Decimal;

/// Opens a fresh in-memory database with every table created.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // parents before children
    let statements = [
        schema.create_table_from_entity(cafes::Entity),
        schema.create_table_from_entity(customers::Entity),
        schema.create_table_from_entity(dining_tables::Entity),
        schema.create_table_from_entity(menu_items::Entity),
        schema.create_table_from_entity(orders::Entity),
        schema.create_table_from_entity(order_items::Entity),
        schema.create_table_from_entity(payments::Entity),
    ];
    for stmt in &statements {
        db.execute(builder.build(stmt))
            .await
            .expect("Failed to create table");
    }

    db
}

/// Creates a café with a unique subdomain.
pub async fn create_cafe(db: &DatabaseConnection, subdomain: &str) -> CafeId {
    let cafe = CafeRepository::new(db.clone())
        .create(CreateCafeInput {
            name: format!("Cafe {subdomain}"),
            subdomain: subdomain.to_string(),
        })
        .await
        .expect("Failed to create cafe");
    CafeId::from_uuid(cafe.id)
}

/// Creates a free table.
pub async fn create_table(db: &DatabaseConnection, cafe_id: CafeId, name: &str) -> TableId {
    let table = TableRepository::new(db.clone())
        .create(
            cafe_id,
            CreateTableInput {
                name: name.to_string(),
                position_x: 0,
                position_y: 0,
                width: 100,
                height: 100,
            },
        )
        .await
        .expect("Failed to create table");
    TableId::from_uuid(table.id)
}

/// Creates a customer with a zero balance.
pub async fn create_customer(
    db: &DatabaseConnection,
    cafe_id: CafeId,
    name: &str,
    phone: &str,
) -> CustomerId {
    let customer = CustomerRepository::new(db.clone())
        .create(
            cafe_id,
            CreateCustomerInput {
                name: name.to_string(),
                phone: phone.to_string(),
            },
        )
        .await
        .expect("Failed to create customer");
    CustomerId::from_uuid(customer.id)
}

/// Seats a registered customer at a table.
pub async fn seat_customer(
    db: &DatabaseConnection,
    cafe_id: CafeId,
    table_id: TableId,
    customer_id: CustomerId,
) {
    TableRepository::new(db.clone())
        .assign(
            cafe_id,
            table_id,
            AssignTableInput {
                status: TableStatus::Occupied,
                customer_id: Some(customer_id),
                guest_name: None,
                guest_phone: None,
            },
        )
        .await
        .expect("Failed to seat customer");
}

/// Seats a walk-in guest at a table.
pub async fn seat_guest(
    db: &DatabaseConnection,
    cafe_id: CafeId,
    table_id: TableId,
    name: &str,
    phone: &str,
) {
    TableRepository::new(db.clone())
        .assign(
            cafe_id,
            table_id,
            AssignTableInput {
                status: TableStatus::Occupied,
                customer_id: None,
                guest_name: Some(name.to_string()),
                guest_phone: Some(phone.to_string()),
            },
        )
        .await
        .expect("Failed to seat guest");
}

/// Places a single-line order at a table.
pub async fn place_order(
    db: &DatabaseConnection,
    cafe_id: CafeId,
    table_id: TableId,
    item_name: &str,
    quantity: i32,
    price: Decimal,
) -> OrderId {
    let order = OrderRepository::new(db.clone())
        .create(
            cafe_id,
            CreateOrderInput {
                table_id,
                customer_id: None,
                items: vec![NewOrderItem {
                    item_name: item_name.to_string(),
                    quantity,
                    price,
                }],
                notes: None,
            },
        )
        .await
        .expect("Failed to place order");
    OrderId::from_uuid(order.order.id)
}
