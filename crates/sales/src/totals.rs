//! Order totals: subtotal, IVA, shipping and grand total.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Chilean IVA applied to the subtotal.
pub const TAX_RATE: f64 = 0.19;

/// One cart row as far as pricing is concerned.
///
/// Partial rows are priced, not rejected: a missing unit cost counts as 0
/// and a missing quantity as 1.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub unit_cost: Option<f64>,
    pub quantity: Option<u32>,
}

impl CartLine {
    pub fn new(unit_cost: f64, quantity: u32) -> Self {
        Self {
            unit_cost: Some(unit_cost),
            quantity: Some(quantity),
        }
    }

    pub fn amount(&self) -> f64 {
        self.unit_cost.unwrap_or(0.0) * f64::from(self.quantity.unwrap_or(1))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown code '{0}'")]
pub struct UnknownCode(pub String);

/// Delivery option chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShippingMethod {
    /// In-store pickup.
    #[default]
    #[serde(rename = "retiro")]
    Pickup,
    #[serde(rename = "estandar")]
    Standard,
    #[serde(rename = "express")]
    Express,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 3] = [
        ShippingMethod::Pickup,
        ShippingMethod::Standard,
        ShippingMethod::Express,
    ];

    /// Wire code.
    pub fn code(&self) -> &'static str {
        match self {
            ShippingMethod::Pickup => "retiro",
            ShippingMethod::Standard => "estandar",
            ShippingMethod::Express => "express",
        }
    }

    pub fn cost(&self) -> f64 {
        match self {
            ShippingMethod::Pickup => 0.0,
            ShippingMethod::Standard => 3990.0,
            ShippingMethod::Express => 6990.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShippingMethod::Pickup => "Retiro en tienda",
            ShippingMethod::Standard => "Envío estándar",
            ShippingMethod::Express => "Envío express",
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCode(s.to_string()))
    }
}

impl core::fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Shipping cost for a raw wire code; unknown codes ship free.
pub fn shipping_cost_for_code(code: &str) -> f64 {
    code.parse::<ShippingMethod>()
        .map(|m| m.cost())
        .unwrap_or(0.0)
}

/// Derived order amounts. Never stored; recomputed whenever the cart or the
/// shipping choice changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub shipping_cost: f64,
    pub total: f64,
}

pub fn compute_totals(lines: &[CartLine], shipping: ShippingMethod) -> OrderTotals {
    totals_with_shipping(lines, shipping.cost())
}

/// Same as [`compute_totals`] for a raw shipping code.
pub fn compute_totals_for_code(lines: &[CartLine], shipping_code: &str) -> OrderTotals {
    totals_with_shipping(lines, shipping_cost_for_code(shipping_code))
}

fn totals_with_shipping(lines: &[CartLine], shipping_cost: f64) -> OrderTotals {
    let subtotal: f64 = lines.iter().map(CartLine::amount).sum();
    let tax = subtotal * TAX_RATE;
    OrderTotals {
        subtotal,
        tax,
        shipping_cost,
        total: subtotal + tax + shipping_cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn standard_shipping_example() {
        let lines = [CartLine::new(1000.0, 2), CartLine::new(2000.0, 3)];
        let t = compute_totals(&lines, ShippingMethod::Standard);
        assert_eq!(t.subtotal, 8000.0);
        assert_eq!(t.tax, 1520.0);
        assert_eq!(t.shipping_cost, 3990.0);
        assert_eq!(t.total, 13510.0);
    }

    #[test]
    fn empty_cart_with_pickup_is_all_zero() {
        assert_eq!(compute_totals(&[], ShippingMethod::Pickup), OrderTotals::default());
    }

    #[test]
    fn partial_lines_use_defaults() {
        let lines = [
            CartLine {
                unit_cost: None,
                quantity: Some(4),
            },
            CartLine {
                unit_cost: Some(2500.0),
                quantity: None,
            },
        ];
        let t = compute_totals(&lines, ShippingMethod::Pickup);
        assert_eq!(t.subtotal, 2500.0);
        assert_eq!(t.total, 2975.0);
    }

    #[test]
    fn shipping_codes() {
        assert_eq!(shipping_cost_for_code("retiro"), 0.0);
        assert_eq!(shipping_cost_for_code("estandar"), 3990.0);
        assert_eq!(shipping_cost_for_code("EXPRESS"), 6990.0);
        assert_eq!(shipping_cost_for_code("drone"), 0.0);
        assert_eq!(
            compute_totals_for_code(&[CartLine::new(100.0, 1)], "express").shipping_cost,
            6990.0
        );
    }

    #[test]
    fn method_serializes_as_wire_code() {
        let json = serde_json::to_string(&ShippingMethod::Standard).unwrap();
        assert_eq!(json, "\"estandar\"");
        assert!("drone".parse::<ShippingMethod>().is_err());
    }

    #[test]
    fn totals_serialize_camel_case() {
        let t = compute_totals(&[CartLine::new(1000.0, 1)], ShippingMethod::Express);
        let json = serde_json::to_value(t).unwrap();
        assert_eq!(json["shippingCost"], 6990.0);
    }

    fn line_strategy() -> impl Strategy<Value = CartLine> {
        (
            proptest::option::of(0u32..1_000_000),
            proptest::option::of(1u32..100),
        )
            .prop_map(|(cost, quantity)| CartLine {
                unit_cost: cost.map(f64::from),
                quantity,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 500,
            ..ProptestConfig::default()
        })]

        /// Property: totals do not depend on line order.
        #[test]
        fn totals_are_order_independent(
            lines in proptest::collection::vec(line_strategy(), 0..20),
            rotate in 0usize..20,
        ) {
            let method = ShippingMethod::Express;
            let expected = compute_totals(&lines, method);

            let mut reversed = lines.clone();
            reversed.reverse();
            prop_assert_eq!(compute_totals(&reversed, method), expected);

            let mut rotated = lines.clone();
            if !rotated.is_empty() {
                let by = rotate % rotated.len();
                rotated.rotate_left(by);
            }
            prop_assert_eq!(compute_totals(&rotated, method), expected);
        }

        /// Property: total is the sum of its parts.
        #[test]
        fn total_is_sum_of_parts(lines in proptest::collection::vec(line_strategy(), 0..20)) {
            for method in ShippingMethod::ALL {
                let t = compute_totals(&lines, method);
                prop_assert_eq!(t.total, t.subtotal + t.tax + t.shipping_cost);
                prop_assert_eq!(t.shipping_cost, method.cost());
            }
        }
    }
}
