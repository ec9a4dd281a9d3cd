//! Staff roles and JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{CafeId, StaffId};

/// Role of the staff member holding a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    /// Platform or café administrator; may manage cafés.
    Admin,
    /// Front-desk staff; runs tables, orders and payments.
    Frontdesk,
}

impl StaffRole {
    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Frontdesk => "frontdesk",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "frontdesk" => Some(Self::Frontdesk),
            _ => None,
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (staff ID).
    pub sub: StaffId,
    /// Café the token is scoped to.
    pub cafe: CafeId,
    /// Staff role.
    pub role: StaffRole,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for a staff member.
    #[must_use]
    pub fn new(staff_id: StaffId, cafe_id: CafeId, role: StaffRole, expires_at: DateTime<Utc>) -> Self {
        Self {
            sub: staff_id,
            cafe: cafe_id,
            role,
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the staff ID.
    #[must_use]
    pub const fn staff_id(&self) -> StaffId {
        self.sub
    }

    /// Returns the café the token belongs to.
    #[must_use]
    pub const fn cafe_id(&self) -> CafeId {
        self.cafe
    }

    /// Returns true for administrators.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == StaffRole::Admin
    }
}
