//! Table assignment rules.

use cafedesk_shared::types::CustomerId;

use super::error::TableRuleError;
use super::types::{Occupancy, TableStatus};

/// Stateless rules for seating and releasing tables.
pub struct TableRules;

impl TableRules {
    /// Validates an assignment request and normalizes it.
    ///
    /// Assigning `free` drops any customer or guest details. Assigning
    /// `occupied` or `reserved` requires a customer or a non-blank guest name.
    ///
    /// # Errors
    ///
    /// Returns `TableRuleError::MissingOccupant` when a held table names no one.
    pub fn assign(
        status: TableStatus,
        customer_id: Option<CustomerId>,
        guest_name: Option<&str>,
        guest_phone: Option<&str>,
    ) -> Result<Occupancy, TableRuleError> {
        if !status.is_held() {
            return Ok(Occupancy::free());
        }

        let guest_name = guest_name.map(str::trim).unwrap_or_default();
        let guest_phone = guest_phone.map(str::trim).unwrap_or_default();

        if customer_id.is_none() && guest_name.is_empty() {
            return Err(TableRuleError::MissingOccupant(status));
        }

        Ok(Occupancy {
            status,
            customer_id,
            guest_name: guest_name.to_string(),
            guest_phone: guest_phone.to_string(),
        })
    }

    /// Parses a status string coming from a client.
    ///
    /// # Errors
    ///
    /// Returns `TableRuleError::InvalidStatus` for unknown values.
    pub fn parse_status(raw: &str) -> Result<TableStatus, TableRuleError> {
        TableStatus::parse(raw).ok_or_else(|| TableRuleError::InvalidStatus(raw.to_string()))
    }
}
