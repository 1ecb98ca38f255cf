use rust_decimal::Decimal;

use crate::constants::{
    OPTION_CONTRACT_MULTIPLIER, OUTPUT_DECIMAL_PRECISION, QUANTITY_DECIMAL_PRECISION,
    QUANTITY_THRESHOLD,
};

pub fn is_quantity_significant(quantity: &Decimal) -> bool {
    let threshold =
        Decimal::from_str_radix(QUANTITY_THRESHOLD, 10).unwrap_or_else(|_| Decimal::new(1, 8));
    quantity.abs() >= threshold
}

/// Rounds an emitted price or profit to the output precision.
#[inline]
pub fn round_output(value: Decimal) -> Decimal {
    value.round_dp(OUTPUT_DECIMAL_PRECISION)
}

#[inline]
pub fn contract_multiplier() -> Decimal {
    Decimal::from(OPTION_CONTRACT_MULTIPLIER)
}

/// Snaps a derived share count onto the quantity grid, so ratios such as
/// 1:3 do not leave 28-digit residues.
#[inline]
pub fn round_quantity(value: Decimal) -> Decimal {
    value.round_dp(QUANTITY_DECIMAL_PRECISION)
}
