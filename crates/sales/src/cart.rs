//! Server-side cart rows and what the storefront derives from them.

use serde::{Deserialize, Serialize};

use hazellab_auth::UserRef;
use hazellab_core::{CartItemId, Entity, ProductId, UserId};
use hazellab_products::Product;

use crate::totals::CartLine;

/// One product in one user's cart (`/itemscarrito`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub producto: Option<Product>,
    #[serde(default)]
    pub usuario: Option<UserRef>,
}

impl Entity for CartItem {
    type Id = CartItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl CartItem {
    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    pub fn product_name(&self) -> &str {
        self.producto.as_ref().map_or("", |p| p.name.as_str())
    }

    /// Pricing view of this row.
    pub fn line(&self) -> CartLine {
        CartLine {
            unit_cost: self.producto.as_ref().and_then(|p| p.cost),
            quantity: self.quantity,
        }
    }

    /// Unit cost × quantity, 0 when the product is unknown.
    pub fn line_total(&self) -> f64 {
        self.line().amount()
    }
}

pub fn cart_lines(items: &[CartItem]) -> Vec<CartLine> {
    items.iter().map(CartItem::line).collect()
}

/// Units in the cart, shown on the navigation badge.
pub fn cart_count(items: &[CartItem]) -> u32 {
    items.iter().map(CartItem::quantity).sum()
}

/// Next quantity after pressing "−": never below one (removal is a
/// separate action).
pub fn decrement(quantity: u32) -> u32 {
    quantity.saturating_sub(1).max(1)
}

/// `POST /itemscarrito` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddCartItem {
    pub usuario: UserRef,
    pub producto: ProductRef,
    pub quantity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProductRef {
    pub id: ProductId,
}

impl AddCartItem {
    pub fn new(user: UserId, product: ProductId, quantity: u32) -> Self {
        Self {
            usuario: UserRef { id: user },
            producto: ProductRef { id: product },
            quantity: quantity.max(1),
        }
    }
}

/// `PUT /itemscarrito/{id}/cantidad` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

impl QuantityUpdate {
    pub fn new(quantity: u32) -> Self {
        Self {
            quantity: quantity.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::totals::{ShippingMethod, compute_totals};

    fn item(id: i64, cost: Option<f64>, quantity: Option<u32>) -> CartItem {
        let producto = cost.map(|c| Product::new(ProductId::new(id), "Glicerina", c, 10));
        CartItem {
            id: CartItemId::new(id),
            quantity,
            producto,
            usuario: Some(UserRef { id: UserId::new(1) }),
        }
    }

    #[test]
    fn badge_counts_units_not_rows() {
        let items = [item(1, Some(1000.0), Some(2)), item(2, Some(500.0), Some(3))];
        assert_eq!(cart_count(&items), 5);
        assert_eq!(cart_count(&[]), 0);
    }

    #[test]
    fn lines_feed_totals() {
        let items = [item(1, Some(1000.0), Some(2)), item(2, None, Some(4))];
        let totals = compute_totals(&cart_lines(&items), ShippingMethod::Pickup);
        assert_eq!(totals.subtotal, 2000.0);
        assert_eq!(items[1].line_total(), 0.0);
        assert_eq!(items[1].product_name(), "");
    }

    #[test]
    fn decrement_floors_at_one() {
        assert_eq!(decrement(3), 2);
        assert_eq!(decrement(1), 1);
        assert_eq!(decrement(0), 1);
    }

    #[test]
    fn add_payload_shape() {
        let body = AddCartItem::new(UserId::new(5), ProductId::new(9), 0);
        let json = serde_json::to_value(body).unwrap();
        assert_eq!(json["usuario"]["id"], 5);
        assert_eq!(json["producto"]["id"], 9);
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn deserializes_backend_cart_row() {
        let raw = r#"{"id": 3, "quantity": 2,
            "producto": {"id": 9, "name": "Niacinamida", "cost": 7990},
            "usuario": {"id": 5}}"#;
        let row: CartItem = serde_json::from_str(raw).unwrap();
        assert_eq!(row.line_total(), 15980.0);
        assert_eq!(row.usuario, Some(UserRef { id: UserId::new(5) }));
    }
}
