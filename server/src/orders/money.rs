//! Money calculation for order placement
//!
//! All arithmetic is done in `Decimal` and converted to `f64` only at the
//! storage boundary, after rounding. The stored total is the sum of the four
//! stored components, so clients can re-add the rounded figures and match.

use rust_decimal::prelude::*;

use crate::utils::AppError;

/// Monetary values round to 2 decimal places, half away from zero
const MONEY_DP: u32 = 2;

/// Maximum allowed dish price
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: i64 = 999;

/// Convert f64 to Decimal for calculation
///
/// Inputs are validated finite at the boundary. If NaN/Infinity somehow
/// reaches here, logs an error and returns ZERO to avoid silent corruption.
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_else(|| {
        tracing::error!(value = ?value, "Non-finite f64 in monetary calculation, defaulting to zero");
        Decimal::ZERO
    })
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_money(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(MONEY_DP, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Validate a unit price coming from the dish table
pub fn validate_price(price: f64, what: &str) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::validation(format!(
            "{what} must be a non-negative finite number, got {price}"
        )));
    }
    if price > MAX_PRICE {
        return Err(AppError::validation(format!(
            "{what} exceeds maximum allowed ({MAX_PRICE}), got {price}"
        )));
    }
    Ok(())
}

/// Validate a line quantity
pub fn validate_quantity(quantity: i64) -> Result<(), AppError> {
    if quantity < 1 {
        return Err(AppError::validation(format!(
            "quantity must be at least 1, got {quantity}"
        )));
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {quantity}"
        )));
    }
    Ok(())
}

/// Line subtotal: price × quantity, stored at 2 dp
pub fn line_subtotal(price_at_order: f64, quantity: i64) -> f64 {
    to_money(to_decimal(price_at_order) * Decimal::from(quantity))
}

/// The four monetary components plus their sum, all at stored precision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub delivery_fee: f64,
    pub service_charge: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

/// Compute order totals from line items and the restaurant's commerce config
///
/// The charges compound in a fixed sequence:
/// 1. subtotal = Σ price × quantity
/// 2. service_charge = (subtotal + delivery_fee) × service_charge_rate
/// 3. tax = (subtotal + delivery_fee + service_charge) × tax_rate
/// 4. total = sum of the four components AFTER each is rounded to 2 dp
///
/// Rounding each component first keeps the stored total reproducible from
/// the stored parts.
pub fn compute_totals(
    lines: &[(f64, i64)],
    delivery_fee: f64,
    service_charge_rate: f64,
    tax_rate: f64,
) -> OrderTotals {
    let subtotal: Decimal = lines
        .iter()
        .map(|(price, quantity)| to_decimal(*price) * Decimal::from(*quantity))
        .sum();
    let fee = to_decimal(delivery_fee);

    let service_charge = (subtotal + fee) * to_decimal(service_charge_rate);
    let tax = (subtotal + fee + service_charge) * to_decimal(tax_rate);

    let subtotal = to_money(subtotal);
    let delivery_fee = to_money(fee);
    let service_charge = to_money(service_charge);
    let tax_amount = to_money(tax);
    let total_amount = to_money(
        to_decimal(subtotal)
            + to_decimal(delivery_fee)
            + to_decimal(service_charge)
            + to_decimal(tax_amount),
    );

    OrderTotals {
        subtotal,
        delivery_fee,
        service_charge,
        tax_amount,
        total_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compounding_sequence() {
        // 25.00 subtotal, 2.00 fee, 5% service, 10% tax
        let totals = compute_totals(&[(12.50, 2)], 2.00, 0.05, 0.10);

        assert_eq!(totals.subtotal, 25.00);
        assert_eq!(totals.delivery_fee, 2.00);
        // (25 + 2) * 0.05 = 1.35
        assert_eq!(totals.service_charge, 1.35);
        // (25 + 2 + 1.35) * 0.10 = 2.835, rounds half away from zero
        assert_eq!(totals.tax_amount, 2.84);
        // Sum of the stored components, not of the unrounded intermediates
        assert_eq!(totals.total_amount, 31.19);
    }

    #[test]
    fn test_total_is_sum_of_stored_components() {
        let totals = compute_totals(&[(9.99, 3), (4.55, 1)], 1.75, 0.07, 0.21);
        let recomputed = to_money(
            to_decimal(totals.subtotal)
                + to_decimal(totals.delivery_fee)
                + to_decimal(totals.service_charge)
                + to_decimal(totals.tax_amount),
        );
        assert_eq!(totals.total_amount, recomputed);
    }

    #[test]
    fn test_zero_rates() {
        let totals = compute_totals(&[(10.00, 1)], 0.0, 0.0, 0.0);
        assert_eq!(totals.service_charge, 0.0);
        assert_eq!(totals.tax_amount, 0.0);
        assert_eq!(totals.total_amount, 10.00);
    }

    #[test]
    fn test_to_money_rounds_half_away_from_zero() {
        use rust_decimal_macros::dec;
        assert_eq!(to_money(dec!(2.835)), 2.84);
        assert_eq!(to_money(dec!(-2.835)), -2.84);
        assert_eq!(to_money(dec!(2.834)), 2.83);
    }

    #[test]
    fn test_line_subtotal_rounding() {
        // 3 * 3.333 = 9.999 -> 10.00
        assert_eq!(line_subtotal(3.333, 3), 10.00);
    }

    #[test]
    fn test_float_artifacts_do_not_leak() {
        // 0.1 + 0.2 style inputs stay exact through Decimal
        let totals = compute_totals(&[(0.10, 1), (0.20, 1)], 0.0, 0.0, 0.0);
        assert_eq!(totals.subtotal, 0.30);
        assert_eq!(totals.total_amount, 0.30);
    }

    #[test]
    fn test_validate_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_validate_price_rejects_non_finite() {
        assert!(validate_price(9.99, "price").is_ok());
        assert!(validate_price(f64::NAN, "price").is_err());
        assert!(validate_price(f64::INFINITY, "price").is_err());
        assert!(validate_price(-0.01, "price").is_err());
    }
}
