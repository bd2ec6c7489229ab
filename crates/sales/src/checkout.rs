//! Checkout preconditions and the receipt-generation request.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use hazellab_core::UserId;

use crate::cart::{CartItem, cart_lines};
use crate::totals::{OrderTotals, ShippingMethod, UnknownCode, compute_totals};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    #[serde(rename = "tarjeta")]
    Card,
    #[serde(rename = "transferencia")]
    Transfer,
    /// Only accepted for in-store pickup.
    #[serde(rename = "efectivo")]
    Cash,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Cash,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "tarjeta",
            PaymentMethod::Transfer => "transferencia",
            PaymentMethod::Cash => "efectivo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "Tarjeta de crédito/débito",
            PaymentMethod::Transfer => "Transferencia bancaria",
            PaymentMethod::Cash => "Efectivo (solo retiro)",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = UnknownCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownCode(s.to_string()))
    }
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

/// Why a checkout may not proceed.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutError {
    #[error("your session has expired, please log in again")]
    NotLoggedIn,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("choose a payment method")]
    MissingPayment,

    #[error("cash payment is only available for in-store pickup")]
    CashRequiresPickup,
}

/// Everything the checkout screen holds when "Pagar" is pressed.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutRequest<'a> {
    pub user: Option<UserId>,
    pub items: &'a [CartItem],
    pub payment: Option<PaymentMethod>,
    pub shipping: ShippingMethod,
}

impl CheckoutRequest<'_> {
    /// Check preconditions in order, returning the first that fails.
    pub fn validate(&self) -> Result<GenerateReceiptRequest, CheckoutError> {
        let user = self.user.ok_or(CheckoutError::NotLoggedIn)?;
        if self.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let payment = self.payment.ok_or(CheckoutError::MissingPayment)?;
        if payment == PaymentMethod::Cash && self.shipping != ShippingMethod::Pickup {
            return Err(CheckoutError::CashRequiresPickup);
        }

        Ok(GenerateReceiptRequest {
            usuario_id: user,
            metodo_pago: payment,
            metodo_envio: self.shipping,
        })
    }

    /// Totals shown next to the pay button (the backend computes its own).
    pub fn totals(&self) -> OrderTotals {
        compute_totals(&cart_lines(self.items), self.shipping)
    }
}

/// `POST /boletas/generar` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateReceiptRequest {
    pub usuario_id: UserId,
    pub metodo_pago: PaymentMethod,
    pub metodo_envio: ShippingMethod,
}
