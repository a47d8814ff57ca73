//! Money helpers using rust_decimal for precision
//!
//! Aggregation keeps full `Decimal` precision. Rounding to two decimals only
//! happens when a value is formatted for display.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Round to display precision
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Format an amount for display, e.g. `6` → `"6.00"`
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Line total: `quantity × unit_price`, missing price counts as zero
///
/// Saturates at `Decimal::MAX`; see [`checked_line_total`].
#[inline]
pub fn line_total(quantity: u32, unit_price: Option<Decimal>) -> Decimal {
    checked_line_total(quantity, unit_price).unwrap_or(Decimal::MAX)
}

/// `None` when the product does not fit in a `Decimal`
#[inline]
pub fn checked_line_total(quantity: u32, unit_price: Option<Decimal>) -> Option<Decimal> {
    unit_price
        .unwrap_or(Decimal::ZERO)
        .checked_mul(Decimal::from(quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money_pads_and_rounds() {
        assert_eq!(format_money(Decimal::from(6)), "6.00");
        assert_eq!(format_money(Decimal::new(1005, 3)), "1.01");
        assert_eq!(format_money(Decimal::new(-1005, 3)), "-1.01");
        assert_eq!(format_money(Decimal::new(12345, 4)), "1.23");
    }

    #[test]
    fn test_line_total_defaults_missing_price() {
        assert_eq!(line_total(3, None), Decimal::ZERO);
        assert_eq!(line_total(3, Some(Decimal::new(250, 2))), Decimal::new(750, 2));
    }

    #[test]
    fn test_line_total_overflow() {
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        assert_eq!(checked_line_total(2, Some(huge)), None);
        assert_eq!(checked_line_total(1, Some(huge)), Some(huge));
        assert_eq!(line_total(2, Some(huge)), Decimal::MAX);
    }

    #[test]
    fn test_full_precision_is_kept_until_display() {
        let third = Decimal::ONE / Decimal::from(3);
        let sum = third + third + third;
        assert_eq!(format_money(sum), "1.00");
        assert_ne!(round_money(third) * Decimal::from(3), sum);
    }
}
