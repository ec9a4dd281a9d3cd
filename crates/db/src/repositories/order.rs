//! Order repository.
//!
//! Orders own their items. Every item mutation recomputes the order total
//! from all stored items before the order row is written, so `total` always
//! equals the sum of item subtotals.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::Serialize;
use tracing::{info, warn};

use cafedesk_core::order::{BillableOrder, LineItem, OrderAggregator, OrderRuleError, OrderStatus};
use cafedesk_shared::types::{CafeId, CustomerId, OrderId, OrderItemId, TableId};

use super::ledger::{LedgerError, apply_balance_delta};
use crate::entities::{customers, dining_tables, order_items, orders};
use crate::rls::TenantTransaction;

/// Error types for order operations.
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Order not found.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// Table not found.
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Order rule violated.
    #[error(transparent)]
    Rule(#[from] OrderRuleError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for OrderError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::CustomerNotFound(id) => Self::CustomerNotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

impl BillableOrder for orders::Model {
    fn status(&self) -> OrderStatus {
        self.status.into()
    }

    fn total(&self) -> Decimal {
        self.total
    }
}

impl LineItem for order_items::Model {
    fn subtotal(&self) -> Decimal {
        self.subtotal
    }
}

/// An order together with its items.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    /// The order row.
    #[serde(flatten)]
    pub order: orders::Model,
    /// Items in insertion order.
    pub items: Vec<order_items::Model>,
}

/// A line to add to an order.
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    /// Item name as printed on the bill.
    pub item_name: String,
    /// Quantity, must be positive.
    pub quantity: i32,
    /// Unit price, must not be negative.
    pub price: Decimal,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct CreateOrderInput {
    /// Table the order is for.
    pub table_id: TableId,
    /// Customer to charge; defaults to the table's customer.
    pub customer_id: Option<CustomerId>,
    /// Initial items.
    pub items: Vec<NewOrderItem>,
    /// Kitchen notes.
    pub notes: Option<String>,
}

/// Input for updating an order.
#[derive(Debug, Clone, Default)]
pub struct UpdateOrderInput {
    /// New status.
    pub status: Option<OrderStatus>,
    /// New notes.
    pub notes: Option<String>,
}

/// Filters for listing orders.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderFilter {
    /// Only orders in this status.
    pub status: Option<OrderStatus>,
    /// Only orders of this table.
    pub table_id: Option<TableId>,
    /// Only orders of this customer.
    pub customer_id: Option<CustomerId>,
}

/// Order repository.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    db: DatabaseConnection,
}

impl OrderRepository {
    /// Creates a new order repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        cafe_id: CafeId,
        filter: OrderFilter,
    ) -> Result<Vec<orders::Model>, OrderError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;

        let mut query =
            orders::Entity::find().filter(orders::Column::CafeId.eq(cafe_id.into_inner()));

        if let Some(status) = filter.status {
            let status: crate::entities::sea_orm_active_enums::OrderStatus = status.into();
            query = query.filter(orders::Column::Status.eq(status));
        }
        if let Some(table_id) = filter.table_id {
            query = query.filter(orders::Column::TableId.eq(table_id.into_inner()));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(orders::Column::CustomerId.eq(customer_id.into_inner()));
        }

        let orders = query
            .order_by_desc(orders::Column::CreatedAt)
            .all(txn.conn())
            .await?;
        txn.commit().await?;
        Ok(orders)
    }

    /// Gets an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is not in the café.
    pub async fn find(&self, cafe_id: CafeId, id: OrderId) -> Result<OrderWithItems, OrderError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let order = find_order(txn.conn(), cafe_id, id, false).await?;
        let items = items_of(txn.conn(), order.id).await?;
        txn.commit().await?;
        Ok(OrderWithItems { order, items })
    }

    /// Creates a pending order with its items.
    ///
    /// # Errors
    ///
    /// Returns an `OrderError::Rule` for invalid items, or a not-found error
    /// for an unknown table or customer.
    pub async fn create(
        &self,
        cafe_id: CafeId,
        input: CreateOrderInput,
    ) -> Result<OrderWithItems, OrderError> {
        let (lines, total) = OrderAggregator::price_order(
            input
                .items
                .iter()
                .map(|i| (i.item_name.as_str(), i.quantity, i.price)),
        )?;

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;

        let table = dining_tables::Entity::find_by_id(input.table_id.into_inner())
            .filter(dining_tables::Column::CafeId.eq(cafe_id.into_inner()))
            .one(txn.conn())
            .await?
            .ok_or(OrderError::TableNotFound(input.table_id))?;

        let customer_id = match input.customer_id {
            Some(id) => {
                customers::Entity::find_by_id(id.into_inner())
                    .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
                    .one(txn.conn())
                    .await?
                    .ok_or(OrderError::CustomerNotFound(id))?;
                Some(id.into_inner())
            }
            None => table.customer_id,
        };

        let now = chrono::Utc::now().into();
        let order = orders::ActiveModel {
            id: Set(OrderId::new().into_inner()),
            cafe_id: Set(cafe_id.into_inner()),
            table_id: Set(table.id),
            customer_id: Set(customer_id),
            status: Set(OrderStatus::Pending.into()),
            total: Set(total),
            notes: Set(input.notes.unwrap_or_default()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn.conn())
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in lines {
            let item = order_items::ActiveModel {
                id: Set(OrderItemId::new().into_inner()),
                cafe_id: Set(cafe_id.into_inner()),
                order_id: Set(order.id),
                item_name: Set(line.item_name),
                quantity: Set(line.quantity),
                price: Set(line.price),
                subtotal: Set(line.subtotal),
                created_at: Set(now),
            }
            .insert(txn.conn())
            .await?;
            items.push(item);
        }

        txn.commit().await?;

        info!(
            cafe_id = %cafe_id,
            order_id = %order.id,
            table_id = %table.id,
            total = %order.total,
            "Order created"
        );

        Ok(OrderWithItems { order, items })
    }

    /// Adds an item and recomputes the order total from all of its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound`, or an `OrderError::Rule` when the item
    /// is invalid or the order is already billed.
    pub async fn add_item(
        &self,
        cafe_id: CafeId,
        order_id: OrderId,
        item: NewOrderItem,
    ) -> Result<(order_items::Model, orders::Model), OrderError> {
        let line = OrderAggregator::price_line(&item.item_name, item.quantity, item.price)?;

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let order = find_order(txn.conn(), cafe_id, order_id, true).await?;
        OrderAggregator::ensure_open(order.status.into())?;

        let item = order_items::ActiveModel {
            id: Set(OrderItemId::new().into_inner()),
            cafe_id: Set(cafe_id.into_inner()),
            order_id: Set(order.id),
            item_name: Set(line.item_name),
            quantity: Set(line.quantity),
            price: Set(line.price),
            subtotal: Set(line.subtotal),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(txn.conn())
        .await?;

        let items = items_of(txn.conn(), order.id).await?;
        let total = OrderAggregator::recompute_order_total(&items);

        let mut active: orders::ActiveModel = order.into();
        active.total = Set(total);
        active.updated_at = Set(chrono::Utc::now().into());
        let order = active.update(txn.conn()).await?;

        txn.commit().await?;

        info!(
            cafe_id = %cafe_id,
            order_id = %order.id,
            item_id = %item.id,
            total = %order.total,
            "Order item added"
        );

        Ok((item, order))
    }

    /// Updates status and notes.
    ///
    /// Moving an order to billed adds its total to the customer's balance.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound`, or `OrderError::Rule` for a billed
    /// order moving back.
    pub async fn update(
        &self,
        cafe_id: CafeId,
        id: OrderId,
        input: UpdateOrderInput,
    ) -> Result<OrderWithItems, OrderError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let order = find_order(txn.conn(), cafe_id, id, true).await?;

        let change = input
            .status
            .map(|to| OrderAggregator::transition(order.status.into(), to))
            .transpose()?;

        let total = order.total;
        let customer_id = order.customer_id.map(CustomerId::from_uuid);

        let mut active: orders::ActiveModel = order.into();
        if let Some(change) = change {
            active.status = Set(change.to.into());
        }
        if let Some(notes) = input.notes {
            active.notes = Set(notes);
        }
        active.updated_at = Set(chrono::Utc::now().into());
        let order = active.update(txn.conn()).await?;

        if change.is_some_and(|c| c.bills_order()) {
            match customer_id {
                Some(customer_id) => {
                    apply_balance_delta(txn.conn(), cafe_id, customer_id, total).await?;
                    info!(
                        cafe_id = %cafe_id,
                        order_id = %order.id,
                        customer_id = %customer_id,
                        total = %total,
                        "Order billed to customer"
                    );
                }
                None => {
                    warn!(
                        cafe_id = %cafe_id,
                        order_id = %order.id,
                        "Order billed without a customer, balance unchanged"
                    );
                }
            }
        }

        let items = items_of(txn.conn(), order.id).await?;
        txn.commit().await?;
        Ok(OrderWithItems { order, items })
    }

    /// Deletes an order and its items. Payments linked to it are kept.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order is not in the café.
    pub async fn delete(&self, cafe_id: CafeId, id: OrderId) -> Result<(), OrderError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let order = find_order(txn.conn(), cafe_id, id, true).await?;
        orders::Entity::delete_by_id(order.id)
            .exec(txn.conn())
            .await?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, order_id = %id, "Order deleted");
        Ok(())
    }
}

/// Loads an order of the café, optionally under `FOR UPDATE`.
pub(crate) async fn find_order<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    id: OrderId,
    lock: bool,
) -> Result<orders::Model, OrderError> {
    let mut query = orders::Entity::find_by_id(id.into_inner())
        .filter(orders::Column::CafeId.eq(cafe_id.into_inner()));
    if lock {
        query = query.lock_exclusive();
    }
    query.one(conn).await?.ok_or(OrderError::NotFound(id))
}

/// Items of an order in insertion order.
pub(crate) async fn items_of<C: ConnectionTrait>(
    conn: &C,
    order_id: uuid::Uuid,
) -> Result<Vec<order_items::Model>, DbErr> {
    order_items::Entity::find()
        .filter(order_items::Column::OrderId.eq(order_id))
        .order_by_asc(order_items::Column::CreatedAt)
        .order_by_asc(order_items::Column::Id)
        .all(conn)
        .await
}

/// Unbilled orders of a table, optionally under `FOR UPDATE`.
pub(crate) async fn unbilled_orders_of<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    table_id: uuid::Uuid,
    lock: bool,
) -> Result<Vec<orders::Model>, DbErr> {
    let billed: crate::entities::sea_orm_active_enums::OrderStatus = OrderStatus::Billed.into();
    let mut query = orders::Entity::find()
        .filter(orders::Column::CafeId.eq(cafe_id.into_inner()))
        .filter(orders::Column::TableId.eq(table_id))
        .filter(orders::Column::Status.ne(billed))
        .order_by_asc(orders::Column::CreatedAt);
    if lock {
        query = query.lock_exclusive();
    }
    query.all(conn).await
}
