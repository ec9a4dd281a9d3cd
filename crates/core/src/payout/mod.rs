//! Table payout workflow.
//!
//! Settles a table: bills its unbilled orders, records what was paid,
//! carries the shortfall to the customer and frees the table.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use error::PayoutRuleError;
pub use service::PayoutWorkflow;
pub use types::{
    BillingCustomer, DEFAULT_PAYMENT_METHOD, GUEST_NAME_PREFIX, PaymentDraft, PayoutPlan,
    PayoutRequest, SeatedParty, SettlementSummary,
};
