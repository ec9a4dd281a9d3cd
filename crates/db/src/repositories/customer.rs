//! Customer repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use tracing::info;

use cafedesk_shared::types::{CafeId, CustomerId};

use super::{is_foreign_key_violation, is_unique_violation};
use crate::entities::customers;
use crate::rls::TenantTransaction;

/// Error types for customer operations.
#[derive(Debug, thiserror::Error)]
pub enum CustomerError {
    /// Customer not found.
    #[error("Customer not found: {0}")]
    NotFound(CustomerId),

    /// Name is blank.
    #[error("Customer name is required")]
    EmptyName,

    /// Another customer of the café already uses this phone.
    #[error("Phone number '{0}' is already registered")]
    DuplicatePhone(String),

    /// Customer still referenced by payments.
    #[error("Customer has recorded payments and cannot be deleted")]
    HasPayments,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a customer. The balance always starts at zero.
#[derive(Debug, Clone)]
pub struct CreateCustomerInput {
    /// Customer name.
    pub name: String,
    /// Phone, may be empty.
    pub phone: String,
}

/// Input for updating a customer.
///
/// The balance is not here: only the ledger moves it.
#[derive(Debug, Clone, Default)]
pub struct UpdateCustomerInput {
    /// New name.
    pub name: Option<String>,
    /// New phone.
    pub phone: Option<String>,
}

/// Customer repository.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists customers ordered by name, optionally filtered by a name or phone fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list(
        &self,
        cafe_id: CafeId,
        search: Option<&str>,
    ) -> Result<Vec<customers::Model>, CustomerError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;

        let mut query = customers::Entity::find()
            .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
            .order_by_asc(customers::Column::Name);

        if let Some(term) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                customers::Column::Name
                    .contains(term)
                    .or(customers::Column::Phone.contains(term)),
            );
        }

        let customers = query.all(txn.conn()).await?;
        txn.commit().await?;
        Ok(customers)
    }

    /// Finds a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if the customer is not in the café.
    pub async fn find(
        &self,
        cafe_id: CafeId,
        id: CustomerId,
    ) -> Result<customers::Model, CustomerError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let customer = find_customer(txn.conn(), cafe_id, id).await?;
        txn.commit().await?;
        Ok(customer)
    }

    /// Creates a customer with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::EmptyName` or `CustomerError::DuplicatePhone`.
    pub async fn create(
        &self,
        cafe_id: CafeId,
        input: CreateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(CustomerError::EmptyName);
        }
        let phone = input.phone.trim().to_string();

        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        ensure_phone_free(txn.conn(), cafe_id, &phone, None).await?;
        let customer = insert_customer(txn.conn(), cafe_id, name, phone).await?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, customer_id = %customer.id, "Customer created");
        Ok(customer)
    }

    /// Updates name and phone.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound`, `CustomerError::EmptyName` or
    /// `CustomerError::DuplicatePhone`.
    pub async fn update(
        &self,
        cafe_id: CafeId,
        id: CustomerId,
        input: UpdateCustomerInput,
    ) -> Result<customers::Model, CustomerError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let customer = find_customer(txn.conn(), cafe_id, id).await?;

        let mut active: customers::ActiveModel = customer.into();

        if let Some(name) = input.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CustomerError::EmptyName);
            }
            active.name = Set(name);
        }
        if let Some(phone) = input.phone {
            let phone = phone.trim().to_string();
            ensure_phone_free(txn.conn(), cafe_id, &phone, Some(id)).await?;
            active.phone = Set(phone);
        }
        active.updated_at = Set(chrono::Utc::now().into());

        let updated = active.update(txn.conn()).await.map_err(map_write_error)?;
        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a customer. Tables and orders referencing it are unlinked.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound`, or `CustomerError::HasPayments` when
    /// payments still reference the customer.
    pub async fn delete(&self, cafe_id: CafeId, id: CustomerId) -> Result<(), CustomerError> {
        let txn = TenantTransaction::begin(&self.db, cafe_id).await?;
        let customer = find_customer(txn.conn(), cafe_id, id).await?;

        customers::Entity::delete_by_id(customer.id)
            .exec(txn.conn())
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    CustomerError::HasPayments
                } else {
                    CustomerError::Database(e)
                }
            })?;
        txn.commit().await?;

        info!(cafe_id = %cafe_id, customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Current credit balance of a customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerError::NotFound` if the customer is not in the café.
    pub async fn balance(
        &self,
        cafe_id: CafeId,
        id: CustomerId,
    ) -> Result<(customers::Model, Decimal), CustomerError> {
        let customer = self.find(cafe_id, id).await?;
        let balance = customer.credit_balance;
        Ok((customer, balance))
    }
}

/// Loads a customer of the café.
pub(crate) async fn find_customer<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    id: CustomerId,
) -> Result<customers::Model, CustomerError> {
    customers::Entity::find_by_id(id.into_inner())
        .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
        .one(conn)
        .await?
        .ok_or(CustomerError::NotFound(id))
}

/// Returns the customer of the café registered under `phone`, if any.
pub(crate) async fn find_by_phone<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    phone: &str,
) -> Result<Option<customers::Model>, DbErr> {
    if phone.is_empty() {
        return Ok(None);
    }
    customers::Entity::find()
        .filter(customers::Column::CafeId.eq(cafe_id.into_inner()))
        .filter(customers::Column::Phone.eq(phone))
        .one(conn)
        .await
}

/// Inserts a customer with a zero balance.
pub(crate) async fn insert_customer<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    name: String,
    phone: String,
) -> Result<customers::Model, CustomerError> {
    let now = chrono::Utc::now().into();
    customers::ActiveModel {
        id: Set(CustomerId::new().into_inner()),
        cafe_id: Set(cafe_id.into_inner()),
        name: Set(name),
        phone: Set(phone),
        credit_balance: Set(Decimal::ZERO),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
    .map_err(map_write_error)
}

async fn ensure_phone_free<C: ConnectionTrait>(
    conn: &C,
    cafe_id: CafeId,
    phone: &str,
    except: Option<CustomerId>,
) -> Result<(), CustomerError> {
    match find_by_phone(conn, cafe_id, phone).await? {
        Some(existing) if except.is_none_or(|id| id.into_inner() != existing.id) => {
            Err(CustomerError::DuplicatePhone(phone.to_string()))
        }
        _ => Ok(()),
    }
}

fn map_write_error(e: DbErr) -> CustomerError {
    if is_unique_violation(&e) {
        CustomerError::DuplicatePhone(String::new())
    } else {
        CustomerError::Database(e)
    }
}
