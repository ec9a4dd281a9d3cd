//! Dining table repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::info;

use cafedesk_core::order::OrderAggregator;
use cafedesk_core::table::{Occupancy, TableRuleError, TableRules, TableStatus};
use cafedesk_shared::types::{CafeId, CustomerId, TableId};

use super::is_foreign_key_violation;
use super::order::{OrderWithItems, items_of, unbilled_orders_of};
use crate::entities::{customers, dining_tables};
use crate::rls::TenantTransaction;

/// Error types for table operations.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// Table not found.
    #[error("Table not found: {0}")]
    NotFound(TableId),

    /// Customer to seat not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Orders still reference the table.
    #[error("Table has orders and cannot be deleted")]
    HasOrders,

    /// Table rule violated.
    #[error(transparent)]
    Rule(#[from] TableRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a table. New tables are free.
#[derive(Debug, Clone)]
pub struct CreateTableInput {
    /// Display name.
    pub name: String,
    /// Floor plan x position.
    pub position_x: i32,
    /// Floor plan y position.
    pub position_y: i32,
    /// Floor plan width.
    pub width: i32,
    /// Floor plan height.
    pub height: i32,
}

/// Input for updating a table's name or layout.
#[derive(Debug, Clone, Default)]
pub struct UpdateTableInput {
    /// New name.
    pub name: Option<String>,
    /// New x position.
    pub position_x: Option<i32>,
    /// New y position.
    pub position_y: Option<i32>,
    /// New width.
    pub width: Option<i32>,
    /// New height.
    pub height: Option<i32>,
}

/// Input for seating or releasing a table.
#[derive(Debug, Clone)]
pub struct AssignTableInput {
    /// Target status.
    pub status: TableStatus,
    /// Registered customer to seat.
    pub customer_id: Option<CustomerId>,
    /// Walk-in guest name.
    pub guest_name: Option<String>,
    /// Walk-in guest phone.
    pub guest_phone: Option<String>,
}

/// Unbilled orders of a table and what they add up to.
#[derive(Debug, Clone, Serialize)]
pub struct UnbilledOrders {
    /// Orders not yet billed, oldest first.
    pub orders: Vec<OrderWithItems>,
    /// Sum of their totals.
    pub total: Decimal,
}

/// Dining table repository.
#[derive(Debug, Clone)]
pub struct TableRepository {
    db: DatabaseConnection,
}

impl TableRepository {
    /// Creates a new table repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists the café's tables by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(&self, cafe_id: CafeId) -> Result<Vec<dining_tables::Model>, TableError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let tables = dining_tables::Entity::find()
            .filter(dining_tables::Column::CafeId.eq(cafe_id.into_inner()))
            .order_by_asc(dining_tables::Column::Name)
            .all(txn.conn())
            .await?;
        txn.commit().await?;
        Ok(tables)
    }

    /// Finds a table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::NotFound` if the table is not in the café.
    pub async fn find(
        &self,
        cafe_id: CafeId,
        id: TableId,
    ) -> Result<dining_tables::Model, TableError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let table = find_table(txn.conn(), cafe_id, id, false).await?;
        txn.commit().await?;
        Ok(table)
    }

    /// Creates a free table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::Rule` for a blank name.
    pub async fn create(
        &self,
        cafe_id: CafeId,
        input: CreateTableInput,
    ) -> Result<dining_tables::Model, TableError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(TableRuleError::EmptyName.into());
        }

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let now = chrono::Utc::now().into();
        let free = Occupancy::free();
        let table = dining_tables::ActiveModel {
            id: Set(TableId::new().into_inner()),
            cafe_id: Set(cafe_id.into_inner()),
            name: Set(name),
            position_x: Set(input.position_x),
            position_y: Set(input.position_y),
            width: Set(input.width),
            height: Set(input.height),
            status: Set(free.status.into()),
            customer_id: Set(None),
            guest_name: Set(free.guest_name),
            guest_phone: Set(free.guest_phone),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn.conn())
        .await?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, table_id = %table.id, name = %table.name, "Table created");
        Ok(table)
    }

    /// Renames or moves a table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::NotFound`, or `TableError::Rule` for a blank name.
    pub async fn update(
        &self,
        cafe_id: CafeId,
        id: TableId,
        input: UpdateTableInput,
    ) -> Result<dining_tables::Model, TableError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let table = find_table(txn.conn(), cafe_id, id, true).await?;

        let mut active: dining_tables::ActiveModel = table.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(TableRuleError::EmptyName.into());
            }
            active.name = Set(name);
        }
        if let Some(x) = input.position_x {
            active.position_x = Set(x);
        }
        if let Some(y) = input.position_y {
            active.position_y = Set(y);
        }
        if let Some(w) = input.width {
            active.width = Set(w);
        }
        if let Some(h) = input.height {
            active.height = Set(h);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let table = active.update(txn.conn()).await?;
        txn.commit().await?;
        Ok(table)
    }

    /// Deletes a table.
    ///
    /// # Errors
    ///
    /// Returns `TableError::NotFound`, or `TableError::HasOrders` when orders
    /// still reference it.
    pub async fn delete(&self, cafe_id: CafeId, id: TableId) -> Result<(), TableError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let table = find_table(txn.conn(), cafe_id, id, true).await?;
        dining_tables::Entity::delete_by_id(table.id)
            .exec(txn.conn())
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    TableError::HasOrders
                } else {
                    TableError::Database(e)
                }
            })?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, table_id = %id, "Table deleted");
        Ok(())
    }

    /// Seats a customer or guest at a table, or frees it.
    ///
    /// # Errors
    ///
    /// Returns `TableError::NotFound`, `TableError::CustomerNotFound`, or
    /// `TableError::Rule` when a held table names nobody.
    pub async fn assign(
        &self,
        cafe_id: CafeId,
        id: TableId,
        input: AssignTableInput,
    ) -> Result<dining_tables::Model, TableError> {
        let occupancy = TableRules::assign(
            input.status,
            input.customer_id,
            input.guest_name.as_deref(),
            input.guest_phone.as_deref(),
        )?;

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let table = find_table(txn.conn(), cafe_id, id, true).await?;

        if let Some(customer_id) = occupancy.customer_id {
            customers::Entity::find_by_id(customer_id.into_inner())
                .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
                .one(txn.conn())
                .await?
                .ok_or(TableError::CustomerNotFound(customer_id))?;
        }

        let table = write_occupancy(txn.conn(), table, occupancy).await?;
        txn.commit().await?;

        info!(
            cafe_id = %cafe_id,
            table_id = %table.id,
            status = %TableStatus::from(table.status),
            "Table assigned"
        );
        Ok(table)
    }

    /// Unbilled orders of a table with their items and total.
    ///
    /// # Errors
    ///
    /// Returns `TableError::NotFound` if the table is not in the café.
    pub async fn unbilled_orders(
        &self,
        cafe_id: CafeId,
        id: TableId,
    ) -> Result<UnbilledOrders, TableError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let table = find_table(txn.conn(), cafe_id, id, false).await?;

        let orders = unbilled_orders_of(txn.conn(), cafe_id, table.id, false).await?;
        let total = OrderAggregator::unbilled_total(&orders);

        let mut with_items = Vec::with_capacity(orders.len());
        for order in orders {
            let items = items_of(txn.conn(), order.id).await?;
            with_items.push(OrderWithItems { order, items });
        }
        txn.commit().await?;

        Ok(UnbilledOrders {
            orders: with_items,
            total,
        })
    }
}

/// Loads a table of the café, optionally under `FOR UPDATE`.
pub(crate) async fn find_table<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    id: TableId,
    lock: bool,
) -> Result<dining_tables::Model, TableError> {
    let mut query = dining_tables::Entity::find_by_id(id.into_inner())
        .filter(dining_tables::Column::CafeId.eq(cafe_id.into_inner()));
    if lock {
        query = query.lock_exclusive();
    }
    query.one(conn).await?.ok_or(TableError::NotFound(id))
}

/// Writes an occupancy onto a table row.
pub(crate) async fn write_occupancy<C: ConnectionTrait>(
    conn: &C,
    table: dining_tables::Model,
    occupancy: Occupancy,
) -> Result<dining_tables::Model, DbErr> {
    let mut active: dining_tables::ActiveModel = table.into();
    active.status = Set(occupancy.status.into());
    active.customer_id = Set(occupancy.customer_id.map(CustomerId::into_inner));
    active.guest_name = Set(occupancy.guest_name);
    active.guest_phone = Set(occupancy.guest_phone);
    active.updated_at = Set(chrono::Utc::now().into());
    active.update(conn).await
}
