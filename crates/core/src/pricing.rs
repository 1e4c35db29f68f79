//! Checkout totals arithmetic.
//!
//! One place computes every figure on an order: the storefront checkout, the
//! admin order detail, and the tests all go through [`CheckoutTotals`].
//!
//! Rules:
//! - subtotal is the sum of unit price × quantity over all lines
//! - shipping is free strictly above $100.00 subtotal, otherwise a flat $15.00
//! - tax is 8% of the subtotal
//! - every figure is rounded to whole cents

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// Subtotal above which shipping is free.
fn free_shipping_threshold() -> Money {
    Money::new(Decimal::new(100, 0))
}

/// Flat shipping rate below the free-shipping threshold.
fn flat_shipping_rate() -> Money {
    Money::new(Decimal::new(15, 0))
}

/// Sales tax rate applied to the subtotal.
fn tax_rate() -> Decimal {
    Decimal::new(8, 2)
}

/// A priced order line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedLine {
    /// Unit price at the time of checkout.
    pub unit_price: Money,
    /// Quantity ordered.
    pub quantity: u32,
}

impl PricedLine {
    /// Create a priced line.
    #[must_use]
    pub const fn new(unit_price: Money, quantity: u32) -> Self {
        Self {
            unit_price,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// The computed figures for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Money,
    pub shipping: Money,
    pub tax: Money,
    pub total: Money,
}

impl CheckoutTotals {
    /// Compute totals for a set of priced lines.
    #[must_use]
    pub fn compute(lines: &[PricedLine]) -> Self {
        let subtotal: Money = lines
            .iter()
            .map(PricedLine::line_total)
            .sum::<Money>()
            .round_to_cents();

        let shipping = if subtotal > free_shipping_threshold() {
            Money::zero()
        } else {
            flat_shipping_rate()
        };

        let tax = Money::new(subtotal.amount() * tax_rate()).round_to_cents();
        let total = (subtotal + shipping + tax).round_to_cents();

        Self {
            subtotal,
            shipping,
            tax,
            total,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(cents: i64, quantity: u32) -> PricedLine {
        PricedLine::new(Money::from_cents(cents), quantity)
    }

    #[test]
    fn test_single_line_with_flat_shipping() {
        let totals = CheckoutTotals::compute(&[line(1999, 2)]);
        assert_eq!(totals.subtotal, Money::from_cents(3998));
        assert_eq!(totals.shipping, Money::from_cents(1500));
        assert_eq!(totals.tax, Money::from_cents(320)); // 8% of 39.98 = 3.1984
        assert_eq!(totals.total, Money::from_cents(5818));
    }

    #[test]
    fn test_free_shipping_strictly_above_threshold() {
        // Exactly $100.00 still pays shipping
        let at_threshold = CheckoutTotals::compute(&[line(10_000, 1)]);
        assert_eq!(at_threshold.shipping, Money::from_cents(1500));

        // One cent above is free
        let above = CheckoutTotals::compute(&[line(10_001, 1)]);
        assert_eq!(above.shipping, Money::zero());
    }

    #[test]
    fn test_total_is_sum_of_parts_at_two_decimals() {
        let totals = CheckoutTotals::compute(&[line(1249, 3), line(899, 1), line(45_00, 2)]);
        assert_eq!(
            totals.total,
            (totals.subtotal + totals.shipping + totals.tax).round_to_cents()
        );
        // Every figure is already whole cents
        assert_eq!(totals.subtotal, totals.subtotal.round_to_cents());
        assert_eq!(totals.tax, totals.tax.round_to_cents());
    }

    #[test]
    fn test_tax_is_eight_percent_of_subtotal() {
        let totals = CheckoutTotals::compute(&[line(2500, 4)]); // subtotal $100.00
        assert_eq!(totals.tax, Money::from_cents(800));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        // subtotal $6.20, tax 0.496 → $0.50
        let totals = CheckoutTotals::compute(&[line(124, 5)]);
        assert_eq!(totals.tax, Money::from_cents(50));
    }

    #[test]
    fn test_empty_cart_is_all_zero_but_shipping() {
        // Checkout rejects empty carts upstream; the arithmetic itself
        // charges the flat rate on a zero subtotal.
        let totals = CheckoutTotals::compute(&[]);
        assert_eq!(totals.subtotal, Money::zero());
        assert_eq!(totals.shipping, Money::from_cents(1500));
        assert_eq!(totals.tax, Money::zero());
    }
}
