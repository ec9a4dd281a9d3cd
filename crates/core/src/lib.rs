//! Core settlement rules for Cafedesk.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! Persistence applies what these rules decide.
//!
//! # Modules
//!
//! - `order` - Line subtotals, order totals and the order status machine
//! - `money` - Two-decimal precision check for amounts
//! - `ledger` - Customer credit balance arithmetic (floored at zero)
//! - `table` - Table occupancy rules
//! - `payout` - Table settlement planning

pub mod ledger;
pub mod money;
pub mod order;
pub mod payout;
pub mod table;
