//! Order aggregation.
//!
//! Line subtotals, order totals, the unbilled total of a table and the
//! forward-only order status machine.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::OrderRuleError;
pub use service::OrderAggregator;
pub use types::{BillableOrder, LineItem, OrderStatus, PricedLine, StatusChange};
