//! Entity aliases.

pub use super::cafes::Entity as Cafes;
pub use super::customers::Entity as Customers;
pub use super::dining_tables::Entity as DiningTables;
pub use super::menu_items::Entity as MenuItems;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::payments::Entity as Payments;
