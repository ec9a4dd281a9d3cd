//! Repository abstractions for data access.
//!
//! Every tenant-scoped method takes a `CafeId`, runs inside a
//! `TenantTransaction` and filters on `cafe_id` as well.

pub mod cafe;
pub mod customer;
pub mod ledger;
pub mod menu;
pub mod order;
pub mod payment;
pub mod payout;
pub mod table;

pub use cafe::{CafeError, CafeRepository, CreateCafeInput, UpdateCafeInput};
pub use customer::{CreateCustomerInput, CustomerError, CustomerRepository, UpdateCustomerInput};
pub use ledger::{BalanceLedgerRepository, LedgerError};
pub use menu::{CreateMenuItemInput, MenuError, MenuFilter, MenuRepository, UpdateMenuItemInput};
pub use order::{
    CreateOrderInput, NewOrderItem, OrderError, OrderFilter, OrderRepository, OrderWithItems,
    UpdateOrderInput,
};
pub use payment::{CreatePaymentInput, PaymentError, PaymentRepository};
pub use payout::{PayoutError, PayoutRepository};
pub use table::{
    AssignTableInput, CreateTableInput, TableError, TableRepository, UnbilledOrders,
    UpdateTableInput,
};

use sea_orm::{DbErr, SqlErr};

/// True when the error is a unique constraint violation.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// True when the error is a foreign key violation.
pub(crate) fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}
