//! Sales domain module.
//!
//! Cart, order totals, checkout rules and receipts. Deterministic logic
//! only (no IO, no HTTP); the client crate talks to the backend.

pub mod cart;
pub mod checkout;
pub mod money;
pub mod receipt;
pub mod totals;

pub use cart::{
    AddCartItem, CartItem, ProductRef, QuantityUpdate, cart_count, cart_lines, decrement,
};
pub use checkout::{CheckoutError, CheckoutRequest, GenerateReceiptRequest, PaymentMethod};
pub use money::format_clp;
pub use receipt::{
    Receipt, ReceiptFilter, ReceiptLine, ReceiptStatus, SalesStats, StatusUpdate, TopProduct,
};
pub use totals::{
    CartLine, OrderTotals, ShippingMethod, TAX_RATE, UnknownCode, compute_totals,
    compute_totals_for_code, shipping_cost_for_code,
};
