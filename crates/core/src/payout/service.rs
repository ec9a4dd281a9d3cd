//! Table settlement planning.

use rust_decimal::Decimal;

use super::error::PayoutRuleError;
use super::types::{
    BillingCustomer, DEFAULT_PAYMENT_METHOD, GUEST_NAME_PREFIX, PaymentDraft, PayoutPlan,
    PayoutRequest, SeatedParty,
};
use crate::money::fits_money_scale;
use crate::order::{BillableOrder, OrderAggregator};

/// Stateless planner for table payouts.
///
/// `plan` decides every effect of a payout from the table's unbilled orders
/// and the requested amount. The persistence layer then applies the plan in
/// one transaction:
/// 1. Mark every unbilled order billed
/// 2. Resolve or create the billing customer
/// 3. Record the payment, if any
/// 4. Add the shortfall to the customer's balance
/// 5. Free the table
pub struct PayoutWorkflow;

impl PayoutWorkflow {
    /// Plans a payout.
    ///
    /// Billed orders in `orders` are ignored. A zero amount is valid and
    /// carries the whole total as credit. When nothing is owed no customer is
    /// resolved and only a zero amount is accepted.
    ///
    /// # Errors
    ///
    /// Returns `PayoutRuleError::NegativeAmount` for amounts below zero,
    /// `PayoutRuleError::AmountTooPrecise` for fractions of a cent and
    /// `PayoutRuleError::AmountExceedsTotal` when the amount is larger than
    /// the unbilled total.
    pub fn plan<O: BillableOrder>(
        party: &SeatedParty<'_>,
        orders: &[O],
        request: &PayoutRequest,
    ) -> Result<PayoutPlan, PayoutRuleError> {
        let owed = OrderAggregator::unbilled_total(orders);
        let amount = request.amount;

        if amount < Decimal::ZERO {
            return Err(PayoutRuleError::NegativeAmount(amount));
        }
        if !fits_money_scale(amount) {
            return Err(PayoutRuleError::AmountTooPrecise(amount));
        }
        if amount > owed {
            return Err(PayoutRuleError::AmountExceedsTotal { amount, owed });
        }

        let billing_customer = (owed > Decimal::ZERO).then(|| Self::billing_customer(party));

        let payment = (amount > Decimal::ZERO).then(|| PaymentDraft {
            amount,
            method: Self::payment_method(request.method.as_deref()),
            notes: request.notes.clone().unwrap_or_default(),
        });

        Ok(PayoutPlan {
            total_owed: owed,
            amount_paid: amount,
            shortfall: owed - amount,
            billing_customer,
            payment,
        })
    }

    /// Picks the customer a settlement is charged to.
    ///
    /// The table's customer wins; otherwise a guest customer is described from
    /// the guest details, named after the table when the guest name is blank.
    #[must_use]
    pub fn billing_customer(party: &SeatedParty<'_>) -> BillingCustomer {
        if let Some(id) = party.customer_id {
            return BillingCustomer::Registered(id);
        }

        let name = party.guest_name.trim();
        let name = if name.is_empty() {
            format!("{GUEST_NAME_PREFIX}{}", party.table_name)
        } else {
            name.to_string()
        };

        BillingCustomer::Guest {
            name,
            phone: party.guest_phone.trim().to_string(),
        }
    }

    /// Trims a payment method, defaulting blank values to cash.
    #[must_use]
    pub fn payment_method(method: Option<&str>) -> String {
        match method.map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => DEFAULT_PAYMENT_METHOD.to_string(),
        }
    }
}
