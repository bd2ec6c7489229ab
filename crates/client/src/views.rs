//! View models: state a screen keeps between renders.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

use hazellab_auth::User;
use hazellab_core::{CartItemId, remove_by_id};
use hazellab_events::{EventBus, Signal, Subscription};
use hazellab_products::{Category, Product, StockLevel};
use hazellab_sales::{
    CartItem, OrderTotals, ShippingMethod, cart_count, cart_lines, compute_totals, decrement,
};

use crate::error::{ClientError, ClientResult};
use crate::session::SignalBus;
use crate::storefront::Storefront;

/// One-shot guard for a screen's initial load.
///
/// The first `begin` wins; later calls are no-ops until the load fails
/// (`fail`) or the screen asks for a manual refresh (`reset`).
#[derive(Debug, Default)]
pub struct FetchOnce {
    started: AtomicBool,
}

impl FetchOnce {
    pub const fn new() -> Self {
        Self {
            started: AtomicBool::new(false),
        }
    }

    /// `true` exactly once per cycle: the caller should fetch now.
    pub fn begin(&self) -> bool {
        self.started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// The fetch failed: allow a retry.
    pub fn fail(&self) {
        self.started.store(false, Ordering::Release);
    }

    pub fn reset(&self) {
        self.started.store(false, Ordering::Release);
    }

    pub fn started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }
}

/// Item count on the navigation badge, kept fresh by bus signals.
pub struct CartBadge {
    count: u32,
    stale: bool,
    signals: Subscription<Signal>,
}

impl CartBadge {
    /// Subscribes immediately; the first `sync` always fetches.
    pub fn new(bus: &SignalBus) -> Self {
        Self {
            count: 0,
            stale: true,
            signals: bus.subscribe(),
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Consume pending signals; `true` when the count may have changed.
    pub fn needs_refresh(&mut self) -> bool {
        for signal in self.signals.drain() {
            if signal == Signal::CartUpdated || signal.affects_session() {
                self.stale = true;
            }
        }
        self.stale
    }

    /// Re-fetch the count if a relevant signal arrived since the last sync.
    pub async fn sync(&mut self, store: &Storefront) -> ClientResult<u32> {
        if self.needs_refresh() {
            self.refresh(store).await?;
        }
        Ok(self.count)
    }

    /// Fetch unconditionally. Logged-out visitors see zero.
    pub async fn refresh(&mut self, store: &Storefront) -> ClientResult<u32> {
        self.count = if store.session().is_logged_in() {
            store.cart_count().await?
        } else {
            0
        };
        self.stale = false;
        tracing::debug!(count = self.count, "cart badge refreshed");
        Ok(self.count)
    }
}

/// The cart page: rows fetched once, then edited in place.
#[derive(Debug, Default)]
pub struct CartView {
    items: Vec<CartItem>,
    fetch: FetchOnce,
}

impl CartView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn count(&self) -> u32 {
        cart_count(&self.items)
    }

    pub fn totals(&self, shipping: ShippingMethod) -> OrderTotals {
        compute_totals(&cart_lines(&self.items), shipping)
    }

    /// Fetch the rows unless already loaded; a failed fetch can be retried.
    pub async fn load(&mut self, store: &Storefront) -> ClientResult<&[CartItem]> {
        if self.fetch.begin() {
            match store.cart().await {
                Ok(items) => self.items = items,
                Err(err) => {
                    self.fetch.fail();
                    return Err(err);
                }
            }
        }
        Ok(&self.items)
    }

    /// Make the next `load` fetch again.
    pub fn invalidate(&mut self) {
        self.fetch.reset();
    }

    /// Delete a row on the backend and locally, without a re-fetch.
    pub async fn remove(&mut self, store: &Storefront, id: CartItemId) -> ClientResult<()> {
        store.remove_from_cart(id).await?;
        remove_by_id(&mut self.items, &id);
        Ok(())
    }

    /// Change a row's quantity and keep the local copy in step.
    pub async fn set_quantity(
        &mut self,
        store: &Storefront,
        id: CartItemId,
        quantity: u32,
    ) -> ClientResult<()> {
        let updated = store.set_quantity(id, quantity).await?;
        if let Some(row) = self.items.iter_mut().find(|i| i.id == id) {
            row.quantity = updated.quantity.or(Some(quantity.max(1)));
        }
        Ok(())
    }

    /// The "−" button: one unit less, never below one.
    pub async fn decrement(&mut self, store: &Storefront, id: CartItemId) -> ClientResult<()> {
        let Some(current) = self.items.iter().find(|i| i.id == id).map(CartItem::quantity) else {
            return Err(ClientError::NotFound(format!("cart item {id}")));
        };
        let next = decrement(current);
        if next != current {
            self.set_quantity(store, id, next).await?;
        }
        Ok(())
    }
}

/// Admin dashboard counters, derived from the full listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_usuarios: usize,
    pub usuarios_activos: usize,
    pub total_productos: usize,
    pub productos_activos: usize,
    /// Out of stock or at/below the critical threshold.
    pub productos_stock_bajo: usize,
    pub total_categorias: usize,
}

impl DashboardSummary {
    pub fn from_data(products: &[Product], users: &[User], categories: &[Category]) -> Self {
        Self {
            total_usuarios: users.len(),
            usuarios_activos: users.iter().filter(|u| u.is_active()).count(),
            total_productos: products.len(),
            productos_activos: products.iter().filter(|p| p.is_active()).count(),
            productos_stock_bajo: products
                .iter()
                .filter(|p| p.stock_level() != StockLevel::Available)
                .count(),
            total_categorias: categories.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use hazellab_core::{CategoryId, ProductId};
    use hazellab_events::{InMemoryEventBus, notify};

    #[test]
    fn fetch_once_allows_retry_after_failure() {
        let guard = FetchOnce::new();
        assert!(guard.begin());
        assert!(!guard.begin());
        guard.fail();
        assert!(guard.begin());
        guard.reset();
        assert!(!guard.started());
    }

    #[test]
    fn badge_goes_stale_on_relevant_signals() {
        let bus: SignalBus = Arc::new(InMemoryEventBus::new());
        let mut badge = CartBadge::new(&bus);
        badge.stale = false;
        assert!(!badge.needs_refresh());

        notify(bus.as_ref(), Signal::CartUpdated);
        assert!(badge.needs_refresh());

        badge.stale = false;
        notify(bus.as_ref(), Signal::SessionExpired);
        assert!(badge.needs_refresh());
    }

    #[test]
    fn dashboard_counts() {
        let mut hidden = Product::new(ProductId::new(2), "Retinol", 9990.0, 3);
        hidden.active_status = Some(false);
        let products = vec![
            Product::new(ProductId::new(1), "Glicerina", 1000.0, 50),
            hidden,
            Product::new(ProductId::new(3), "Niacinamida", 7990.0, 0),
        ];
        let users: Vec<User> = serde_json::from_value(serde_json::json!([
            {"id": 1, "email": "a@duoc.cl", "status": "activo"},
            {"id": 2, "email": "b@duoc.cl", "status": "inactivo"},
        ]))
        .unwrap();
        let categories = vec![Category {
            id: CategoryId::new(1),
            name: "Activos".into(),
        }];

        let summary = DashboardSummary::from_data(&products, &users, &categories);
        assert_eq!(summary.total_usuarios, 2);
        assert_eq!(summary.usuarios_activos, 1);
        assert_eq!(summary.total_productos, 3);
        assert_eq!(summary.productos_activos, 2);
        assert_eq!(summary.productos_stock_bajo, 2);
        assert_eq!(summary.total_categorias, 1);
    }
}
