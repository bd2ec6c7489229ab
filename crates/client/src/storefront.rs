//! User-facing flows: each validates locally, calls the backend, updates the
//! session and announces what changed.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use hazellab_auth::{
    Capability, Landing, LoginForm, Role, User, UserFilter, UserForm, UserUpdate,
    authorize_optional, landing,
};
use hazellab_core::{ADMIN_PAGE_SIZE, CartItemId, Page, ProductId, ReceiptId, UserId, paginate};
use hazellab_events::{InMemoryEventBus, Signal, notify};
use hazellab_products::{AdminProductQuery, CatalogQuery, Category, Product, ProductForm, featured};
use hazellab_sales::{
    AddCartItem, CartItem, CheckoutError, CheckoutRequest, OrderTotals, PaymentMethod, Receipt,
    ReceiptFilter, ReceiptStatus, SalesStats, ShippingMethod, cart_count,
};

use crate::api::RestClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::session::{SessionStore, SignalBus};
use crate::views::DashboardSummary;

/// Result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutOutcome {
    pub receipt: Receipt,
    /// Totals as shown before paying; the receipt carries the backend's own.
    pub totals: OrderTotals,
}

#[derive(Debug, Clone)]
pub struct Storefront {
    api: RestClient,
    session: Arc<SessionStore>,
}

impl Storefront {
    pub fn new(api: RestClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    /// Wire the session file, the bus and the REST client from config.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let bus: SignalBus = Arc::new(InMemoryEventBus::new());
        let session = Arc::new(SessionStore::open(&config.session_file, bus));
        Ok(Self::new(RestClient::new(config, session)?))
    }

    pub fn api(&self) -> &RestClient {
        &self.api
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn bus(&self) -> &SignalBus {
        self.session.bus()
    }

    pub fn current_user(&self) -> Option<User> {
        self.session.user()
    }

    pub fn role(&self) -> Option<Role> {
        self.session.role()
    }

    /// Fail unless the current visitor holds `capability`.
    pub fn require(&self, capability: Capability) -> ClientResult<()> {
        authorize_optional(self.session.role(), capability).map_err(|err| {
            tracing::debug!(%capability, %err, "capability denied");
            ClientError::from(err)
        })
    }

    fn require_user(&self, capability: Capability) -> ClientResult<UserId> {
        self.require(capability)?;
        self.session.user_id().ok_or(ClientError::NoSession)
    }

    fn signal(&self, signal: Signal) {
        notify(self.bus().as_ref(), signal);
    }

    // ── session ─────────────────────────────────────────────────────────────

    /// Validate, authenticate, persist the session and report where the user
    /// lands.
    pub async fn login(&self, form: &LoginForm) -> ClientResult<Landing> {
        let credentials = form.validate()?;
        let response = self.api.login(&credentials).await?;
        let token = response.token.filter(|t| !t.is_empty());
        let (Some(token), Some(user)) = (token, response.usuario) else {
            return Err(ClientError::Decode(
                "login response lacks token or usuario".to_string(),
            ));
        };
        let landing = landing(user.role);
        self.session.login(token, user)?;
        Ok(landing)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session.logout()
    }

    /// Self-service sign-up. Always creates an active cliente; does not log
    /// in.
    pub async fn register(&self, form: &UserForm, today: NaiveDate) -> ClientResult<User> {
        let payload = form.validate_registration(today)?;
        let user = self.api.create_user(&payload).await?;
        tracing::info!(user_id = %user.id, "account registered");
        Ok(user)
    }

    /// Edit the logged-in user's own profile.
    pub async fn update_profile(&self, update: UserUpdate) -> ClientResult<User> {
        let id = self.require_user(Capability::EditOwnProfile)?;
        let update = UserUpdate {
            // Role and status are not self-service.
            role: None,
            status: None,
            ..update.validate()?
        };
        let user = self.api.update_user(id, &update).await?;
        self.session.update_user(user.clone())?;
        Ok(user)
    }

    // ── catalog ─────────────────────────────────────────────────────────────

    /// Active products matching `query`.
    pub async fn catalog(&self, query: &CatalogQuery) -> ClientResult<Vec<Product>> {
        let products = self.api.list_products().await?;
        Ok(query.apply(&products))
    }

    pub async fn featured(&self) -> ClientResult<Vec<Product>> {
        let products = self.api.featured_products().await?;
        Ok(featured(&products))
    }

    pub async fn categories(&self) -> ClientResult<Vec<Category>> {
        self.api.list_categories().await
    }

    // ── cart ────────────────────────────────────────────────────────────────

    pub async fn cart(&self) -> ClientResult<Vec<CartItem>> {
        let user = self.require_user(Capability::ManageOwnCart)?;
        self.api.cart_items(user).await
    }

    pub async fn cart_count(&self) -> ClientResult<u32> {
        Ok(cart_count(&self.cart().await?))
    }

    pub async fn add_to_cart(&self, product: ProductId, quantity: u32) -> ClientResult<CartItem> {
        let user = self.require_user(Capability::ManageOwnCart)?;
        let item = self
            .api
            .add_cart_item(&AddCartItem::new(user, product, quantity))
            .await?;
        tracing::info!(%product, quantity = item.quantity(), "added to cart");
        self.signal(Signal::CartUpdated);
        Ok(item)
    }

    /// Set a row's quantity (floored at 1).
    pub async fn set_quantity(&self, item: CartItemId, quantity: u32) -> ClientResult<CartItem> {
        self.require(Capability::ManageOwnCart)?;
        let updated = self.api.update_cart_quantity(item, quantity).await?;
        self.signal(Signal::CartUpdated);
        Ok(updated)
    }

    pub async fn remove_from_cart(&self, item: CartItemId) -> ClientResult<()> {
        self.require(Capability::ManageOwnCart)?;
        self.api.remove_cart_item(item).await?;
        self.signal(Signal::CartUpdated);
        Ok(())
    }

    /// Check preconditions against the live cart, then ask the backend for a
    /// receipt. The backend empties the cart on success.
    pub async fn checkout(
        &self,
        payment: Option<PaymentMethod>,
        shipping: ShippingMethod,
    ) -> ClientResult<CheckoutOutcome> {
        let user = self
            .session
            .user_id()
            .filter(|_| self.session.is_logged_in())
            .ok_or(CheckoutError::NotLoggedIn)?;
        self.require(Capability::Checkout)?;

        let items = self.api.cart_items(user).await?;
        let request = CheckoutRequest {
            user: Some(user),
            items: &items,
            payment,
            shipping,
        };
        let body = request.validate()?;
        let totals = request.totals();

        let receipt = self.api.generate_receipt(&body).await?;
        tracing::info!(
            numero = receipt.numero_boleta.as_deref().unwrap_or("-"),
            payment = %body.metodo_pago,
            shipping = %body.metodo_envio,
            "receipt generated"
        );
        self.signal(Signal::CartUpdated);
        Ok(CheckoutOutcome { receipt, totals })
    }

    pub async fn my_receipts(&self) -> ClientResult<Vec<Receipt>> {
        let user = self.require_user(Capability::ViewOwnReceipts)?;
        self.api.user_receipts(user).await
    }

    // ── admin: products ─────────────────────────────────────────────────────

    pub async fn admin_products(
        &self,
        query: &AdminProductQuery,
        page: usize,
    ) -> ClientResult<Page<Product>> {
        self.require(Capability::ViewProducts)?;
        let products = self.api.list_products().await?;
        Ok(paginate(&query.apply(&products), page, ADMIN_PAGE_SIZE))
    }

    pub async fn create_product(&self, form: &ProductForm) -> ClientResult<Product> {
        self.require(Capability::CreateProducts)?;
        let payload = form.validate()?;
        let product = self.api.create_product(&payload).await?;
        tracing::info!(product_id = %product.id, "product created");
        Ok(product)
    }

    pub async fn update_product(&self, id: ProductId, form: &ProductForm) -> ClientResult<Product> {
        self.require(Capability::EditProducts)?;
        let payload = form.validate()?;
        self.api.update_product(id, &payload).await
    }

    pub async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        self.require(Capability::DeleteProducts)?;
        self.api.delete_product(id).await?;
        tracing::info!(product_id = %id, "product deleted");
        Ok(())
    }

    // ── admin: users ────────────────────────────────────────────────────────

    pub async fn admin_users(&self, filter: &UserFilter, page: usize) -> ClientResult<Page<User>> {
        self.require(Capability::ViewUsers)?;
        let users = self.api.list_users().await?;
        Ok(paginate(&filter.apply(&users), page, ADMIN_PAGE_SIZE))
    }

    pub async fn create_user(&self, form: &UserForm, today: NaiveDate) -> ClientResult<User> {
        self.require(Capability::CreateUsers)?;
        let payload = form.validate_admin(today)?;
        let user = self.api.create_user(&payload).await?;
        tracing::info!(user_id = %user.id, role = %user.role, "user created");
        Ok(user)
    }

    pub async fn update_user(&self, id: UserId, update: UserUpdate) -> ClientResult<User> {
        self.require(Capability::EditUsers)?;
        let update = update.validate()?;
        let user = self.api.update_user(id, &update).await?;
        self.session.update_user(user.clone())?;
        Ok(user)
    }

    pub async fn delete_user(&self, id: UserId) -> ClientResult<()> {
        self.require(Capability::DeleteUsers)?;
        self.api.delete_user(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    // ── admin: sales ────────────────────────────────────────────────────────

    pub async fn sales(&self, filter: &ReceiptFilter) -> ClientResult<Vec<Receipt>> {
        self.require(Capability::ViewSales)?;
        let receipts = self.api.all_receipts().await?;
        Ok(filter.apply(&receipts))
    }

    pub async fn sales_stats(&self) -> ClientResult<SalesStats> {
        self.require(Capability::ViewSales)?;
        Ok(self.api.sales_stats().await)
    }

    pub async fn void_receipt(&self, id: ReceiptId) -> ClientResult<Receipt> {
        self.require(Capability::ManageReceipts)?;
        let receipt = self.api.void_receipt(id).await?;
        tracing::info!(receipt_id = %id, "receipt voided");
        Ok(receipt)
    }

    pub async fn set_receipt_status(
        &self,
        id: ReceiptId,
        status: ReceiptStatus,
    ) -> ClientResult<Receipt> {
        self.require(Capability::ManageReceipts)?;
        self.api.set_receipt_status(id, status).await
    }

    /// Dashboard counters from the product, user and category listings.
    pub async fn dashboard(&self) -> ClientResult<DashboardSummary> {
        self.require(Capability::AccessAdminPanel)?;
        let (products, users, categories) = tokio::try_join!(
            self.api.list_products(),
            self.api.list_users(),
            self.api.list_categories(),
        )?;
        Ok(DashboardSummary::from_data(&products, &users, &categories))
    }

    // ── locations ───────────────────────────────────────────────────────────

    pub async fn regions(&self) -> Vec<String> {
        self.api.regions().await
    }

    pub async fn comunas(&self, region: &str) -> Vec<String> {
        self.api.comunas(region).await
    }
}
