//! Customer balance ledger persistence.
//!
//! The single writer of `customers.credit_balance`. Each change reads the
//! customer under `FOR UPDATE`, applies `BalanceLedger::apply_delta` and writes
//! the result, so concurrent changes to one customer serialize.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set,
};
use tracing::debug;

use cafedesk_core::ledger::{BalanceChange, BalanceLedger};
use cafedesk_shared::types::{CafeId, CustomerId};

use crate::entities::customers;
use crate::rls::TenantTransaction;

/// Error types for balance operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Customer not found in the café.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Applies a signed delta to a customer's balance on an open connection.
///
/// Must run inside a transaction for the row lock to hold until commit.
/// The write is skipped when the floor leaves the balance unchanged.
///
/// # Errors
///
/// Returns `LedgerError::CustomerNotFound` if the customer does not belong to
/// the café.
pub async fn apply_balance_delta<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    customer_id: CustomerId,
    delta: Decimal,
) -> Result<(customers::Model, BalanceChange), LedgerError> {
    let customer = customers::Entity::find_by_id(customer_id.into_inner())
        .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or(LedgerError::CustomerNotFound(customer_id))?;

    let change = BalanceLedger::apply_delta(customer.credit_balance, delta);

    if change.applied_delta.is_zero() {
        return Ok((customer, change));
    }

    let mut active: customers::ActiveModel = customer.into();
    active.credit_balance = Set(change.current);
    active.updated_at = Set(chrono::Utc::now().into());
    let customer = active.update(conn).await?;

    debug!(
        cafe_id = %cafe_id,
        customer_id = %customer_id,
        requested = %change.requested_delta,
        applied = %change.applied_delta,
        balance = %change.current,
        "Customer balance changed"
    );

    Ok((customer, change))
}

/// Standalone entry point to the balance ledger.
#[derive(Debug, Clone)]
pub struct BalanceLedgerRepository {
    db: DatabaseConnection,
}

impl BalanceLedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Applies a delta in its own tenant transaction.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CustomerNotFound` for unknown customers.
    pub async fn apply_delta(
        &self,
        cafe_id: CafeId,
        customer_id: CustomerId,
        delta: Decimal,
    ) -> Result<BalanceChange, LedgerError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let (_, change) = apply_balance_delta(txn.conn(), cafe_id, customer_id, delta).await?;
        txn.commit().await?;
        Ok(change)
    }

    /// Current balance of a customer.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::CustomerNotFound` for unknown customers.
    pub async fn balance(
        &self,
        cafe_id: CafeId,
        customer_id: CustomerId,
    ) -> Result<Decimal, LedgerError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let customer = customers::Entity::find_by_id(customer_id.into_inner())
            .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
            .one(txn.conn())
            .await?
            .ok_or(LedgerError::CustomerNotFound(customer_id))?;
        txn.commit().await?;
        Ok(customer.credit_balance)
    }
}
