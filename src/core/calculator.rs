//! Provisioning arithmetic.
//!
//! Turns headcounts into raw quantities, raw quantities into whole packaging units, and
//! packaging units into cost. Rounding happens only in [`packaging_units`]; callers decide
//! the granularity at which it is applied.

use crate::entities::product;
use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

/// Raw need, packaging units and cost for one product at some granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvisionLine {
    /// Real-valued quantity before packaging, in the product's unit
    pub raw_quantity: f64,
    /// Whole packaging units to purchase
    pub packaging_units: u64,
    /// `packaging_units * unit_price`
    pub cost: f64,
}

impl AddAssign for ProvisionLine {
    /// Plain field-wise sum; no re-rounding.
    fn add_assign(&mut self, rhs: Self) {
        self.raw_quantity += rhs.raw_quantity;
        self.packaging_units += rhs.packaging_units;
        self.cost += rhs.cost;
    }
}

/// `headcount * ration`, no rounding.
#[must_use]
pub fn raw_quantity(headcount: u32, ration: f64) -> f64 {
    f64::from(headcount) * ration
}

/// Smallest number of packages holding `raw_quantity`.
///
/// A fractional need always consumes a whole package, and zero demand buys nothing.
/// `package_size` must be positive; products are validated before they reach this point.
#[must_use]
pub fn packaging_units(raw_quantity: f64, package_size: f64) -> u64 {
    debug_assert!(package_size > 0.0, "package size must be positive");
    if raw_quantity <= 0.0 {
        return 0;
    }
    // Cast safety: the quotient is positive and finite for validated products.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let units = (raw_quantity / package_size).ceil() as u64;
    units
}

/// `packaging_units * unit_price`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cost(packaging_units: u64, unit_price: f64) -> f64 {
    packaging_units as f64 * unit_price
}

/// Rounds a summed raw quantity for `product` into packages and cost, once.
#[must_use]
pub fn provision_line(raw_quantity: f64, product: &product::Model) -> ProvisionLine {
    let packaging_units = packaging_units(raw_quantity, product.package_size);
    ProvisionLine {
        raw_quantity,
        packaging_units,
        cost: cost(packaging_units, product.unit_price),
    }
}

/// Un-rounded cost of feeding one person one meal with `product`.
#[must_use]
pub fn cost_per_ration(product: &product::Model) -> f64 {
    product.ration * product.unit_price / product.package_size
}
