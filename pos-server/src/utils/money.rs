//! 金额计算 - Decimal 精度
//!
//! 所有金额在 `Decimal` 中计算，存储时转回 `f64` 并四舍五入到 2 位小数。

use rust_decimal::prelude::*;

/// Decimal places kept for stored amounts
const DECIMAL_PLACES: u32 = 2;

/// Fixed tax rate applied to each of the two tax components (5%)
pub const TAX_COMPONENT_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);

/// Convert f64 to Decimal for precise calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round(value).to_f64().unwrap_or_else(|| {
        tracing::error!(value = %value, "Decimal out of f64 range, defaulting to zero");
        0.0
    })
}

/// Round half away from zero to 2 decimal places
#[inline]
pub fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Bill totals, all rounded to 2 decimal places
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub subtotal: Decimal,
    pub tax_a: Decimal,
    pub tax_b: Decimal,
    pub discount_amount: Decimal,
    pub total_amount: Decimal,
}

impl Totals {
    /// `discount = (subtotal + tax_a + tax_b) × pct / 100`, `total = before − discount`
    ///
    /// A non-positive percentage yields no discount.
    pub fn compute(subtotal: Decimal, tax_a: Decimal, tax_b: Decimal, discount_pct: Decimal) -> Self {
        let subtotal = round(subtotal);
        let tax_a = round(tax_a);
        let tax_b = round(tax_b);
        let before_discount = subtotal + tax_a + tax_b;
        let discount_amount = if discount_pct > Decimal::ZERO {
            round(before_discount * discount_pct / Decimal::ONE_HUNDRED)
        } else {
            Decimal::ZERO
        };
        Self {
            subtotal,
            tax_a,
            tax_b,
            discount_amount,
            total_amount: before_discount - discount_amount,
        }
    }

    /// Recompute from line items with the fixed 5% / 5% tax policy
    pub fn from_lines<I>(lines: I, discount_pct: Decimal) -> Self
    where
        I: IntoIterator<Item = (f64, i64)>,
    {
        let subtotal = line_subtotal(lines);
        let tax = round(subtotal * TAX_COMPONENT_RATE);
        Self::compute(subtotal, tax, tax, discount_pct)
    }
}

/// Σ price × quantity
pub fn line_subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (f64, i64)>,
{
    lines
        .into_iter()
        .map(|(price, quantity)| to_decimal(price) * Decimal::from(quantity))
        .sum()
}
