//! Table rule violations.

use thiserror::Error;

use super::types::TableStatus;

/// Errors raised while validating table assignments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableRuleError {
    /// Unknown status string.
    #[error("invalid table status: {0}")]
    InvalidStatus(String),

    /// Held table without a customer or guest name.
    #[error("a {0} table needs a customer or a guest name")]
    MissingOccupant(TableStatus),

    /// Name is blank.
    #[error("table name is required")]
    EmptyName,
}

impl TableRuleError {
    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStatus(_) => "invalid_status",
            Self::MissingOccupant(_) => "missing_occupant",
            Self::EmptyName => "empty_name",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        400
    }
}
