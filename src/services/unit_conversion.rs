//! Conversion of product quantities to and from kilograms.
//!
//! Both directions take the product's unit and its kg-factor. Callers must pass
//! a positive factor, and exactly 1 for kilogram units; the catalog enforces
//! that when products are saved, so it is not re-checked here. Both return
//! `None` when the result does not fit in a `Decimal`. Results are not
//! rounded: rounding belongs to whoever stores a converted value, so chained
//! conversions do not accumulate rounding error.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::Unit;

/// Decimal places kept when a converted quantity is stored.
pub const STORED_SCALE: u32 = 2;

/// Converts `quantity` counted in `unit` into kilograms.
pub fn to_kg(quantity: Decimal, unit: &Unit, kg_factor: Decimal) -> Option<Decimal> {
    if unit.is_kg() {
        return Some(quantity);
    }
    quantity.checked_mul(kg_factor)
}

/// Converts a kilogram amount into `target_unit`. A zero factor on a
/// non-kilogram unit yields `None`.
pub fn from_kg(kg_quantity: Decimal, target_unit: &Unit, kg_factor: Decimal) -> Option<Decimal> {
    if target_unit.is_kg() {
        return Some(kg_quantity);
    }
    kg_quantity.checked_div(kg_factor)
}

/// Rounds a converted quantity to the stored precision, half away from zero.
pub fn round_stored(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(STORED_SCALE, RoundingStrategy::MidpointAwayFromZero)
}
