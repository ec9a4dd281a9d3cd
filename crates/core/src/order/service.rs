//! Order total aggregation and status rules.

use rust_decimal::Decimal;

use super::error::OrderRuleError;
use crate::money::fits_money_scale;
use super::types::{BillableOrder, LineItem, OrderStatus, PricedLine, StatusChange};

/// Stateless aggregator for order lines and totals.
///
/// Nothing here touches storage; callers persist the values it returns.
pub struct OrderAggregator;

impl OrderAggregator {
    /// Computes `quantity × price` for a single line.
    #[must_use]
    pub fn recompute_subtotal(quantity: i32, price: Decimal) -> Decimal {
        Decimal::from(quantity) * price
    }

    /// Sums line subtotals into an order total.
    #[must_use]
    pub fn recompute_order_total<L: LineItem>(items: &[L]) -> Decimal {
        items.iter().map(LineItem::subtotal).sum()
    }

    /// Sums the totals of every order that has not been billed yet.
    ///
    /// Returns zero for an empty slice.
    #[must_use]
    pub fn unbilled_total<O: BillableOrder>(orders: &[O]) -> Decimal {
        orders
            .iter()
            .filter(|o| !o.status().is_billed())
            .map(BillableOrder::total)
            .sum()
    }

    /// Validates a requested line and prices it.
    ///
    /// # Errors
    ///
    /// Returns `OrderRuleError` for a blank name, a non-positive quantity,
    /// a negative price or a price finer than cents.
    pub fn price_line(
        item_name: &str,
        quantity: i32,
        price: Decimal,
    ) -> Result<PricedLine, OrderRuleError> {
        let item_name = item_name.trim();
        if item_name.is_empty() {
            return Err(OrderRuleError::EmptyItemName);
        }
        if quantity <= 0 {
            return Err(OrderRuleError::InvalidQuantity(quantity));
        }
        if price < Decimal::ZERO {
            return Err(OrderRuleError::NegativePrice(price));
        }
        if !fits_money_scale(price) {
            return Err(OrderRuleError::PriceTooPrecise(price));
        }

        Ok(PricedLine {
            item_name: item_name.to_string(),
            quantity,
            price,
            subtotal: Self::recompute_subtotal(quantity, price),
        })
    }

    /// Prices every line of a new order and returns them with the order total.
    ///
    /// # Errors
    ///
    /// Returns `OrderRuleError::NoItems` for an empty order, or the first
    /// line validation failure.
    pub fn price_order<'a, I>(lines: I) -> Result<(Vec<PricedLine>, Decimal), OrderRuleError>
    where
        I: IntoIterator<Item = (&'a str, i32, Decimal)>,
    {
        let priced = lines
            .into_iter()
            .map(|(name, quantity, price)| Self::price_line(name, quantity, price))
            .collect::<Result<Vec<_>, _>>()?;

        if priced.is_empty() {
            return Err(OrderRuleError::NoItems);
        }

        let total = Self::recompute_order_total(&priced);
        Ok((priced, total))
    }

    /// Validates a status change.
    ///
    /// Orders only move forward; billed is terminal. Re-applying the current
    /// status is accepted, and re-applying `billed` bills nothing.
    ///
    /// # Errors
    ///
    /// Returns `OrderRuleError::InvalidTransition` for any backward step.
    pub fn transition(from: OrderStatus, to: OrderStatus) -> Result<StatusChange, OrderRuleError> {
        if to.stage() < from.stage() {
            return Err(OrderRuleError::InvalidTransition { from, to });
        }
        Ok(StatusChange { from, to })
    }

    /// Ensures items can still be appended to an order.
    ///
    /// # Errors
    ///
    /// Returns `OrderRuleError::AlreadyBilled` for billed orders.
    pub fn ensure_open(status: OrderStatus) -> Result<(), OrderRuleError> {
        if status.is_billed() {
            return Err(OrderRuleError::AlreadyBilled);
        }
        Ok(())
    }
}
