//! Payout domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use cafedesk_shared::types::CustomerId;

/// Payment method used when the client does not name one.
pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

/// Prefix for customers synthesized from walk-in guests.
pub const GUEST_NAME_PREFIX: &str = "Guest - ";

/// Who is seated at the table being settled.
#[derive(Debug, Clone, Copy)]
pub struct SeatedParty<'a> {
    /// Display name of the table.
    pub table_name: &'a str,
    /// Registered customer linked to the table.
    pub customer_id: Option<CustomerId>,
    /// Walk-in guest name.
    pub guest_name: &'a str,
    /// Walk-in guest phone.
    pub guest_phone: &'a str,
}

/// A payout as requested by staff.
#[derive(Debug, Clone, Default)]
pub struct PayoutRequest {
    /// Amount handed over now.
    pub amount: Decimal,
    /// Payment method; defaults to cash.
    pub method: Option<String>,
    /// Free-text notes stored on the payment.
    pub notes: Option<String>,
}

/// Customer the settlement is charged to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingCustomer {
    /// The table's registered customer.
    Registered(CustomerId),
    /// A customer to be created (or matched by phone) from guest details.
    Guest {
        /// Customer name.
        name: String,
        /// Customer phone, possibly empty.
        phone: String,
    },
}

/// Payment to record as part of the payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDraft {
    /// Amount paid.
    pub amount: Decimal,
    /// Payment method.
    pub method: String,
    /// Notes.
    pub notes: String,
}

/// Everything a payout will do, decided before any write happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayoutPlan {
    /// Sum of unbilled order totals.
    pub total_owed: Decimal,
    /// Amount paid now.
    pub amount_paid: Decimal,
    /// `total_owed - amount_paid`, carried to the customer's balance.
    pub shortfall: Decimal,
    /// Customer to charge; `None` when nothing is owed.
    pub billing_customer: Option<BillingCustomer>,
    /// Payment to record; `None` for a zero payment.
    pub payment: Option<PaymentDraft>,
}

impl PayoutPlan {
    /// Summary returned to the caller once the plan is executed.
    #[must_use]
    pub const fn summary(&self) -> SettlementSummary {
        SettlementSummary {
            total_owed: self.total_owed,
            amount_paid: self.amount_paid,
            remaining_credit: self.shortfall,
        }
    }
}

/// Result of a completed payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SettlementSummary {
    /// Sum of the orders that were billed.
    pub total_owed: Decimal,
    /// Amount paid now.
    pub amount_paid: Decimal,
    /// Amount added to the customer's balance.
    pub remaining_credit: Decimal,
}
