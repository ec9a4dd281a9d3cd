//! Payment repository.
//!
//! Recording a payment lowers the customer's balance through the ledger and
//! stores the delta that was actually applied, so deleting the payment can
//! reverse exactly that amount.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::info;

use cafedesk_core::ledger::BalanceLedger;
use cafedesk_core::money::fits_money_scale;
use cafedesk_core::order::OrderStatus;
use cafedesk_core::payout::PayoutWorkflow;
use cafedesk_shared::types::{CafeId, CustomerId, OrderId, PaymentId};

use super::ledger::{LedgerError, apply_balance_delta};
use crate::entities::{orders, payments};
use crate::rls::TenantTransaction;

/// Error types for payment operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// Payment not found.
    #[error("Payment not found: {0}")]
    NotFound(PaymentId),

    /// Customer not found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// Linked order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    /// Amount is not positive or is finer than cents.
    #[error("Payment amount must be positive with at most 2 decimal places, got {0}")]
    InvalidAmount(Decimal),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<LedgerError> for PaymentError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::CustomerNotFound(id) => Self::CustomerNotFound(id),
            LedgerError::Database(e) => Self::Database(e),
        }
    }
}

/// Input for recording a payment.
#[derive(Debug, Clone)]
pub struct CreatePaymentInput {
    /// Paying customer.
    pub customer_id: CustomerId,
    /// Order the payment is for.
    pub order_id: Option<OrderId>,
    /// Amount paid, positive and in whole cents.
    pub amount: Decimal,
    /// Payment method; defaults to cash.
    pub method: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// Payment repository.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    db: DatabaseConnection,
}

impl PaymentRepository {
    /// Creates a new payment repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists payments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        cafe_id: CafeId,
        customer_id: Option<CustomerId>,
    ) -> Result<Vec<payments::Model>, PaymentError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let mut query =
            payments::Entity::find().filter(payments::Column::CafeId.eq(cafe_id.into_inner()));
        if let Some(customer_id) = customer_id {
            query = query.filter(payments::Column::CustomerId.eq(customer_id.into_inner()));
        }
        let payments = query
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .all(txn.conn())
            .await?;
        txn.commit().await?;
        Ok(payments)
    }

    /// Finds a payment.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` if the payment is not in the café.
    pub async fn find(
        &self,
        cafe_id: CafeId,
        id: PaymentId,
    ) -> Result<payments::Model, PaymentError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let payment = payments::Entity::find_by_id(id.into_inner())
            .filter(payments::Column::CafeId.eq(cafe_id.into_inner()))
            .one(txn.conn())
            .await?
            .ok_or(PaymentError::NotFound(id))?;
        txn.commit().await?;
        Ok(payment)
    }

    /// Records a payment.
    ///
    /// The customer's balance drops by the amount, floored at zero. A payment
    /// linked to an order bills that order once its payments cover its total;
    /// that billing does not touch the balance.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAmount`, `PaymentError::CustomerNotFound`
    /// or `PaymentError::OrderNotFound`.
    pub async fn create(
        &self,
        cafe_id: CafeId,
        input: CreatePaymentInput,
    ) -> Result<payments::Model, PaymentError> {
        if input.amount <= Decimal::ZERO || !fits_money_scale(input.amount) {
            return Err(PaymentError::InvalidAmount(input.amount));
        }
        let method = PayoutWorkflow::payment_method(input.method.as_deref());

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;

        let order = match input.order_id {
            Some(order_id) => Some(
                orders::Entity::find_by_id(order_id.into_inner())
                    .filter(orders::Column::CafeId.eq(cafe_id.into_inner()))
                    .lock_exclusive()
                    .one(txn.conn())
                    .await?
                    .ok_or(PaymentError::OrderNotFound(order_id))?,
            ),
            None => None,
        };

        let (_, change) =
            apply_balance_delta(txn.conn(), cafe_id, input.customer_id, -input.amount).await?;

        let payment = payments::ActiveModel {
            id: Set(PaymentId::new().into_inner()),
            cafe_id: Set(cafe_id.into_inner()),
            customer_id: Set(input.customer_id.into_inner()),
            order_id: Set(order.as_ref().map(|o| o.id)),
            amount: Set(input.amount),
            method: Set(method),
            notes: Set(input.notes.unwrap_or_default()),
            balance_delta: Set(change.applied_delta),
            created_at: Set(chrono::Utc::now().into()),
        }
        .insert(txn.conn())
        .await?;

        if let Some(order) = order {
            let status: OrderStatus = order.status.into();
            if !status.is_billed() {
                let paid: Vec<Decimal> = payments::Entity::find()
                    .select_only()
                    .column(payments::Column::Amount)
                    .filter(payments::Column::CafeId.eq(cafe_id.into_inner()))
                    .filter(payments::Column::OrderId.eq(order.id))
                    .into_tuple()
                    .all(txn.conn())
                    .await?;
                let paid: Decimal = paid.into_iter().sum();

                if paid >= order.total {
                    let order_id = order.id;
                    let mut active: orders::ActiveModel = order.into();
                    active.status = Set(OrderStatus::Billed.into());
                    active.updated_at = Set(chrono::Utc::now().into());
                    active.update(txn.conn()).await?;
                    info!(cafe_id = %cafe_id, order_id = %order_id, paid = %paid, "Order fully paid");
                }
            }
        }

        txn.commit().await?;

        info!(
            cafe_id = %cafe_id,
            payment_id = %payment.id,
            customer_id = %payment.customer_id,
            amount = %payment.amount,
            applied = %payment.balance_delta,
            "Payment recorded"
        );

        Ok(payment)
    }

    /// Deletes a payment and reverses its balance effect.
    ///
    /// An order the payment auto-billed stays billed.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotFound` if the payment is not in the café.
    pub async fn delete(&self, cafe_id: CafeId, id: PaymentId) -> Result<(), PaymentError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let payment = payments::Entity::find_by_id(id.into_inner())
            .filter(payments::Column::CafeId.eq(cafe_id.into_inner()))
            .lock_exclusive()
            .one(txn.conn())
            .await?
            .ok_or(PaymentError::NotFound(id))?;

        let reversal = BalanceLedger::reversal_of(payment.balance_delta);
        if !reversal.is_zero() {
            apply_balance_delta(
                txn.conn(),
                cafe_id,
                CustomerId::from_uuid(payment.customer_id),
                reversal,
            )
            .await?;
        }

        payments::Entity::delete_by_id(payment.id)
            .exec(txn.conn())
            .await?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, payment_id = %id, reversed = %reversal, "Payment deleted");
        Ok(())
    }
}
