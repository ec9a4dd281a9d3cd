//! Table occupancy types.

use serde::{Deserialize, Serialize};
use std::fmt;

use cafedesk_shared::types::CustomerId;

/// Table status.
///
/// - Free → Occupied / Reserved (assign)
/// - Occupied / Reserved → Free (payout or manual release)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    /// No one seated.
    Free,
    /// Guests seated.
    Occupied,
    /// Held for an arriving party.
    Reserved,
}

impl TableStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Occupied => "occupied",
            Self::Reserved => "reserved",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "occupied" => Some(Self::Occupied),
            "reserved" => Some(Self::Reserved),
            _ => None,
        }
    }

    /// Returns true for occupied and reserved tables.
    #[must_use]
    pub const fn is_held(&self) -> bool {
        !matches!(self, Self::Free)
    }
}

impl fmt::Display for TableStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who is sitting at a table.
///
/// Built only through `TableRules`, so a held table always names someone and
/// a free table never does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    /// Table status.
    pub status: TableStatus,
    /// Registered customer, if any.
    pub customer_id: Option<CustomerId>,
    /// Walk-in guest name.
    pub guest_name: String,
    /// Walk-in guest phone.
    pub guest_phone: String,
}

impl Occupancy {
    /// A free table with no association.
    #[must_use]
    pub const fn free() -> Self {
        Self {
            status: TableStatus::Free,
            customer_id: None,
            guest_name: String::new(),
            guest_phone: String::new(),
        }
    }
}
