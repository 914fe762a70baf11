//! Order total calculation.
//!
//! Pure arithmetic over integer minor currency units; no floating point
//! anywhere near money. Policy knobs (shipping threshold, flat fee, tax)
//! come from configuration.

use serde::{Deserialize, Serialize};

/// Pricing policy applied at checkout.
#[derive(Clone, Debug)]
pub struct CheckoutPolicy {
    /// Subtotals strictly above this ship for free.
    pub free_shipping_threshold: i64,
    /// Flat shipping fee below the threshold.
    pub shipping_flat_fee: i64,
    pub tax: TaxRule,
}

#[derive(Clone, Copy, Debug)]
pub enum TaxRule {
    None,
    /// Percentage of the subtotal, in basis points, rounded half-up.
    FlatRate { basis_points: u32 },
}

#[derive(Clone, Copy, Debug)]
pub struct LineInput {
    pub price: i64,
    pub quantity: i32,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub line_subtotals: Vec<i64>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub discount: i64,
    pub total: i64,
}

/// Derives all order amounts from the lines and the policy.
///
/// Guarantees `total = subtotal + tax + shipping_cost - discount` and
/// `line_subtotals[i] = price * quantity` exactly.
pub fn calculate(lines: &[LineInput], policy: &CheckoutPolicy, discount: i64) -> OrderTotals {
    let line_subtotals: Vec<i64> = lines
        .iter()
        .map(|l| l.price * i64::from(l.quantity))
        .collect();
    let subtotal: i64 = line_subtotals.iter().sum();

    let tax = match policy.tax {
        TaxRule::None => 0,
        TaxRule::FlatRate { basis_points } => {
            (subtotal * i64::from(basis_points) + 5_000) / 10_000
        }
    };

    let shipping_cost = if subtotal > policy.free_shipping_threshold {
        0
    } else {
        policy.shipping_flat_fee
    };

    OrderTotals {
        total: subtotal + tax + shipping_cost - discount,
        line_subtotals,
        subtotal,
        tax,
        shipping_cost,
        discount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(threshold: i64, fee: i64) -> CheckoutPolicy {
        CheckoutPolicy { free_shipping_threshold: threshold, shipping_flat_fee: fee, tax: TaxRule::None }
    }

    #[test]
    fn subtotal_over_threshold_ships_free() {
        let lines = [LineInput { price: 500, quantity: 2 }, LineInput { price: 250, quantity: 1 }];
        let totals = calculate(&lines, &policy(999, 50), 0);
        assert_eq!(totals.line_subtotals, vec![1000, 250]);
        assert_eq!(totals.subtotal, 1250);
        assert_eq!(totals.shipping_cost, 0);
        assert_eq!(totals.total, 1250);
    }

    #[test]
    fn subtotal_at_or_below_threshold_pays_flat_fee() {
        let lines = [LineInput { price: 999, quantity: 1 }];
        let totals = calculate(&lines, &policy(999, 50), 0);
        assert_eq!(totals.shipping_cost, 50);
        assert_eq!(totals.total, 1049);
    }

    #[test]
    fn discount_is_subtracted_from_total() {
        let lines = [LineInput { price: 2000, quantity: 1 }];
        let totals = calculate(&lines, &policy(999, 50), 300);
        assert_eq!(totals.subtotal, 2000);
        assert_eq!(totals.total, 1700);
    }

    #[test]
    fn flat_rate_tax_rounds_half_up() {
        let lines = [LineInput { price: 333, quantity: 1 }];
        let p = CheckoutPolicy {
            free_shipping_threshold: 999,
            shipping_flat_fee: 50,
            tax: TaxRule::FlatRate { basis_points: 1800 },
        };
        let totals = calculate(&lines, &p, 0);
        // 333 * 0.18 = 59.94, rounds to 60; tolerance of one minor unit
        assert!((totals.tax - 60).abs() <= 1);
        assert_eq!(totals.total, totals.subtotal + totals.tax + totals.shipping_cost);
    }

    #[test]
    fn empty_lines_produce_zero_subtotal_and_flat_shipping() {
        let totals = calculate(&[], &policy(999, 50), 0);
        assert_eq!(totals.subtotal, 0);
        assert_eq!(totals.shipping_cost, 50);
        assert_eq!(totals.total, 50);
    }
}
