//! `SeaORM` entity definitions.
//!
//! Status columns are stored as short strings so the schema builds the same
//! way on every backend.

pub mod prelude;

pub mod cafes;
pub mod customers;
pub mod dining_tables;
pub mod menu_items;
pub mod order_items;
pub mod orders;
pub mod payments;
pub mod sea_orm_active_enums;
