//! Row-Level Security (RLS) context management.
//!
//! Every tenant-scoped unit of work runs inside a `TenantTransaction`. On
//! PostgreSQL it sets `app.current_cafe_id` with `SET LOCAL`, so the
//! `tenant_isolation` policies only expose the current café's rows.
//!
//! ```ignore
//! let txn = TenantTransaction::begin(&db, cafe_id).await?;
//! let tables = dining_tables::Entity::find().all(txn.conn()).await?;
//! txn.commit().await?;
//! ```

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr,
    TransactionTrait,
};

use cafedesk_shared::types::CafeId;

/// A transaction bound to one café.
pub struct TenantTransaction {
    txn: DatabaseTransaction,
    cafe_id: CafeId,
}

impl TenantTransaction {
    /// Begins a transaction and sets the RLS context for `cafe_id`.
    ///
    /// The context is `SET LOCAL`, so it ends with the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started or the context
    /// cannot be set.
    pub async fn begin(db: &DatabaseConnection, cafe_id: CafeId) -> Result<Self, DbErr> {
        let txn = db.begin().await?;
        set_rls_context(&txn, cafe_id).await?;
        Ok(Self { txn, cafe_id })
    }

    /// Connection to run queries on.
    #[must_use]
    pub const fn conn(&self) -> &DatabaseTransaction {
        &self.txn
    }

    /// The café this transaction is scoped to.
    #[must_use]
    pub const fn cafe_id(&self) -> CafeId {
        self.cafe_id
    }

    /// Commits the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit fails.
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }

    /// Rolls back the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    pub async fn rollback(self) -> Result<(), DbErr> {
        self.txn.rollback().await
    }
}

/// Builds the statement that scopes a PostgreSQL transaction to a café.
#[must_use]
pub fn rls_context_sql(cafe_id: CafeId) -> String {
    // CafeId only ever renders as a hyphenated UUID
    format!("SET LOCAL app.current_cafe_id = '{cafe_id}'")
}

/// Sets the RLS context on an existing transaction.
///
/// Backends without row-level security skip this step; repositories filter
/// by `cafe_id` explicitly as well.
///
/// # Errors
///
/// Returns an error if the context cannot be set.
pub async fn set_rls_context(txn: &DatabaseTransaction, cafe_id: CafeId) -> Result<(), DbErr> {
    if txn.get_database_backend() == DatabaseBackend::Postgres {
        txn.execute_unprepared(&rls_context_sql(cafe_id)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rls_sql_format() {
        let cafe_id: CafeId = "550e8400-e29b-41d4-a716-446655440000".parse().unwrap();
        assert_eq!(
            rls_context_sql(cafe_id),
            "SET LOCAL app.current_cafe_id = '550e8400-e29b-41d4-a716-446655440000'"
        );
    }
}
