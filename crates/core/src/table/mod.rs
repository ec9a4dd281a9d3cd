//! Table occupancy rules.

pub mod error;
pub mod service;
pub mod types;

pub use error::TableRuleError;
pub use service::TableRules;
pub use types::{Occupancy, TableStatus};
