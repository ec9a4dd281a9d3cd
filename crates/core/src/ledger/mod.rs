//! Customer credit balance ledger.
//!
//! Billing adds to a balance, payments subtract from it, payout shortfalls
//! add to it. The balance is floored at zero after every change.

pub mod service;
pub mod types;

#[cfg(test)]
mod service_props;

pub use service::BalanceLedger;
pub use types::BalanceChange;
