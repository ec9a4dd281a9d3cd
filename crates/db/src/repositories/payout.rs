//! Table payout persistence.
//!
//! Executes a `PayoutPlan` in a single tenant transaction. Locks are taken
//! table first, then orders, then the customer, the same order every other
//! writer uses.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use tracing::info;

use cafedesk_core::order::OrderStatus;
use cafedesk_core::payout::{
    BillingCustomer, PayoutRequest, PayoutRuleError, PayoutWorkflow, SeatedParty,
    SettlementSummary,
};
use cafedesk_core::table::Occupancy;
use cafedesk_shared::types::{CafeId, CustomerId, PaymentId, TableId};

use super::customer::{CustomerError, find_by_phone, insert_customer};
use super::ledger::{LedgerError, apply_balance_delta};
use super::order::unbilled_orders_of;
use super::table::write_occupancy;
use crate::entities::{dining_tables, orders, payments};
use crate::rls::TenantTransaction;

/// Error types for payouts.
#[derive(Debug, thiserror::Error)]
pub enum PayoutError {
    /// Table not found.
    #[error("Table not found: {0}")]
    TableNotFound(TableId),

    /// Billing customer vanished mid-payout.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Amount rejected.
    #[error(transparent)]
    Rule(#[from] PayoutRuleError),

    /// Guest customer could not be created.
    #[error(transparent)]
    Customer(#[from] CustomerError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for PayoutError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::CustomerNotFound(id) => Self::CustomerNotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// Payout repository.
#[derive(Debug, Clone)]
pub struct PayoutRepository {
    db: DatabaseConnection,
}

impl PayoutRepository {
    /// Creates a new payout repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Settles a table.
    ///
    /// Bills every unbilled order of the table, records the payment, carries
    /// the shortfall to the billing customer and frees the table. Nothing is
    /// written when any step fails.
    ///
    /// # Errors
    ///
    /// Returns `PayoutError::TableNotFound`, `PayoutError::Rule` for an
    /// amount outside `0..=owed`, or a database error.
    pub async fn payout(
        &self,
        cafe_id: CafeId,
        table_id: TableId,
        request: PayoutRequest,
    ) -> Result<SettlementSummary, PayoutError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;

        let table = dining_tables::Entity::find_by_id(table_id.into_inner())
            .filter(dining_tables::Column::CafeId.eq(cafe_id.into_inner()))
            .lock_exclusive()
            .one(txn.conn())
            .await?
            .ok_or(PayoutError::TableNotFound(table_id))?;

        let unbilled = unbilled_orders_of(txn.conn(), cafe_id, table.id, true).await?;

        let party = SeatedParty {
            table_name: &table.name,
            customer_id: table.customer_id.map(CustomerId::from_uuid),
            guest_name: &table.guest_name,
            guest_phone: &table.guest_phone,
        };
        let plan = PayoutWorkflow::plan(&party, &unbilled, &request)?;

        let customer_id = match plan.billing_customer.clone() {
            None => None,
            Some(BillingCustomer::Registered(id)) => Some(id),
            Some(BillingCustomer::Guest { name, phone }) => {
                Some(resolve_guest(txn.conn(), cafe_id, name, phone).await?)
            }
        };

        let order_count = unbilled.len();
        bill_orders(txn.conn(), unbilled, customer_id).await?;

        // Deleting the payment returns its amount to the balance.
        if let (Some(draft), Some(customer_id)) = (plan.payment.clone(), customer_id) {
            payments::ActiveModel {
                id: Set(PaymentId::new().into_inner()),
                cafe_id: Set(cafe_id.into_inner()),
                customer_id: Set(customer_id.into_inner()),
                order_id: Set(None),
                amount: Set(draft.amount),
                method: Set(draft.method),
                notes: Set(draft.notes),
                balance_delta: Set(-draft.amount),
                created_at: Set(chrono::Utc::now().into()),
            }
            .insert(txn.conn())
            .await?;
        }

        if let Some(customer_id) = customer_id.filter(|_| plan.shortfall > Decimal::ZERO) {
            apply_balance_delta(txn.conn(), cafe_id, customer_id, plan.shortfall).await?;
        }

        write_occupancy(txn.conn(), table, Occupancy::free()).await?;

        txn.commit().await?;

        let summary = plan.summary();
        info!(
            cafe_id = %cafe_id,
            table_id = %table_id,
            orders = order_count,
            total_owed = %summary.total_owed,
            amount_paid = %summary.amount_paid,
            remaining_credit = %summary.remaining_credit,
            "Table paid out"
        );

        Ok(summary)
    }
}

/// Finds the café's customer with the guest's phone, or creates one.
async fn resolve_guest<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    name: String,
    phone: String,
) -> Result<CustomerId, PayoutError> {
    if let Some(existing) = find_by_phone(conn, cafe_id, &phone).await? {
        return Ok(CustomerId::from_uuid(existing.id));
    }
    let customer = insert_customer(conn, cafe_id, name, phone).await?;
    info!(cafe_id = %cafe_id, customer_id = %customer.id, "Guest customer created");
    Ok(CustomerId::from_uuid(customer.id))
}

/// Marks orders billed, linking unassigned ones to the billing customer.
async fn bill_orders<C: ConnectionTrait>(
    conn: &C,
    unbilled: Vec<orders::Model>,
    customer_id: Option<CustomerId>,
) -> Result<(), DbErr> {
    let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();
    for order in unbilled {
        let unassigned = order.customer_id.is_none();
        let mut active: orders::ActiveModel = order.into();
        active.status = Set(OrderStatus::Billed.into());
        if unassigned {
            active.customer_id = Set(customer_id.map(CustomerId::into_inner));
        }
        active.updated_at = Set(now);
        active.update(conn).await?;
    }
    Ok(())
}
