//! REST client for the Hazel Lab backend.

use std::sync::Arc;
use std::time::Instant;

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use hazellab_auth::{LoginRequest, LoginResponse, NewUser, User, UserSearch, UserUpdate};
use hazellab_core::{CartItemId, ProductId, ReceiptId, UserId};
use hazellab_products::{AdvancedSearch, Category, Product, ProductPayload};
use hazellab_sales::{
    AddCartItem, CartItem, GenerateReceiptRequest, QuantityUpdate, Receipt, ReceiptStatus,
    SalesStats, StatusUpdate, TopProduct,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult, error_message};
use crate::session::SessionStore;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Served when `/ubicacion/regiones` is unreachable.
pub const FALLBACK_REGIONS: [&str; 16] = [
    "Arica y Parinacota",
    "Tarapacá",
    "Antofagasta",
    "Atacama",
    "Coquimbo",
    "Valparaíso",
    "Metropolitana",
    "O'Higgins",
    "Maule",
    "Ñuble",
    "Biobío",
    "Araucanía",
    "Los Ríos",
    "Los Lagos",
    "Aysén",
    "Magallanes",
];

/// Thin typed wrapper over the backend's JSON endpoints.
///
/// Every request carries the session's bearer token (when logged in) and a
/// fresh `x-request-id`. A 401 clears the session before the error reaches
/// the caller.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
    session: Arc<SessionStore>,
}

impl RestClient {
    pub fn new(config: &ClientConfig, session: Arc<SessionStore>) -> ClientResult<Self> {
        let base = Url::parse(config.api_url.trim())
            .map_err(|e| ClientError::Network(format!("invalid API url '{}': {e}", config.api_url)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Network(format!(
                "invalid API url '{}'",
                config.api_url
            )));
        }
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base,
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    // ── products ────────────────────────────────────────────────────────────

    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.get_json(&["productos"]).await
    }

    pub async fn featured_products(&self) -> ClientResult<Vec<Product>> {
        self.get_json(&["productos", "destacados"]).await
    }

    pub async fn search_products(&self, search: &AdvancedSearch) -> ClientResult<Vec<Product>> {
        let req = self
            .request(Method::GET, &["productos", "buscar", "avanzada"])?
            .query(&search.to_query());
        self.decode(self.execute(req).await?).await
    }

    /// Look a product up in the full listing.
    pub async fn find_product(&self, id: ProductId) -> ClientResult<Product> {
        self.list_products()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ClientError::NotFound(format!("product {id}")))
    }

    pub async fn create_product(&self, payload: &ProductPayload) -> ClientResult<Product> {
        self.send_json(Method::POST, &["productos"], payload).await
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductPayload,
    ) -> ClientResult<Product> {
        self.send_json(Method::PUT, &["productos", &id.to_string()], payload)
            .await
    }

    pub async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &["productos", &id.to_string()])
            .await
    }

    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.get_json(&["categorias"]).await
    }

    // ── users ───────────────────────────────────────────────────────────────

    pub async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get_json(&["usuarios"]).await
    }

    pub async fn get_user(&self, id: UserId) -> ClientResult<User> {
        self.get_json(&["usuarios", &id.to_string()]).await
    }

    pub async fn create_user(&self, user: &NewUser) -> ClientResult<User> {
        self.send_json(Method::POST, &["usuarios"], user).await
    }

    pub async fn update_user(&self, id: UserId, update: &UserUpdate) -> ClientResult<User> {
        self.send_json(Method::PUT, &["usuarios", &id.to_string()], update)
            .await
    }

    pub async fn delete_user(&self, id: UserId) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &["usuarios", &id.to_string()])
            .await
    }

    pub async fn search_users(&self, search: &UserSearch) -> ClientResult<Vec<User>> {
        let req = self
            .request(Method::GET, &["usuarios", "buscar", "avanzada"])?
            .query(&search.to_query());
        self.decode(self.execute(req).await?).await
    }

    pub async fn login(&self, credentials: &LoginRequest) -> ClientResult<LoginResponse> {
        self.send_json(Method::POST, &["auth", "login"], credentials)
            .await
    }

    // ── cart ────────────────────────────────────────────────────────────────

    pub async fn add_cart_item(&self, item: &AddCartItem) -> ClientResult<CartItem> {
        self.send_json(Method::POST, &["itemscarrito"], item).await
    }

    pub async fn cart_items(&self, user: UserId) -> ClientResult<Vec<CartItem>> {
        self.get_json(&["itemscarrito", "usuario", &user.to_string()])
            .await
    }

    pub async fn update_cart_quantity(
        &self,
        id: CartItemId,
        quantity: u32,
    ) -> ClientResult<CartItem> {
        self.send_json(
            Method::PUT,
            &["itemscarrito", &id.to_string(), "cantidad"],
            &QuantityUpdate::new(quantity),
        )
        .await
    }

    pub async fn remove_cart_item(&self, id: CartItemId) -> ClientResult<()> {
        self.send_empty(Method::DELETE, &["itemscarrito", &id.to_string()])
            .await
    }

    // ── receipts ────────────────────────────────────────────────────────────

    pub async fn generate_receipt(&self, request: &GenerateReceiptRequest) -> ClientResult<Receipt> {
        self.send_json(Method::POST, &["boletas", "generar"], request)
            .await
    }

    pub async fn all_receipts(&self) -> ClientResult<Vec<Receipt>> {
        self.get_json(&["boletas", "listar"]).await
    }

    pub async fn user_receipts(&self, user: UserId) -> ClientResult<Vec<Receipt>> {
        self.get_json(&["boletas", "usuario", &user.to_string()])
            .await
    }

    pub async fn receipt_by_number(&self, numero: &str) -> ClientResult<Receipt> {
        self.get_json(&["boletas", numero]).await
    }

    pub async fn void_receipt(&self, id: ReceiptId) -> ClientResult<Receipt> {
        let req = self.request(Method::PUT, &["boletas", &id.to_string(), "anular"])?;
        self.decode(self.execute(req).await?).await
    }

    pub async fn set_receipt_status(
        &self,
        id: ReceiptId,
        estado: ReceiptStatus,
    ) -> ClientResult<Receipt> {
        self.send_json(
            Method::PUT,
            &["boletas", &id.to_string(), "estado"],
            &StatusUpdate { estado },
        )
        .await
    }

    /// Computed from the full receipt list; all zero when it cannot be
    /// fetched.
    pub async fn sales_stats(&self) -> SalesStats {
        match self.all_receipts().await {
            Ok(receipts) => SalesStats::from_receipts(&receipts),
            Err(err) => {
                tracing::warn!(%err, "sales stats unavailable; showing zeros");
                SalesStats::default()
            }
        }
    }

    // ── locations ───────────────────────────────────────────────────────────

    /// Region names; the built-in list when the backend fails for any reason.
    pub async fn regions(&self) -> Vec<String> {
        match self.get_json::<Vec<String>>(&["ubicacion", "regiones"]).await {
            Ok(regions) => regions,
            Err(err) => {
                tracing::warn!(%err, "regions unavailable; using built-in list");
                FALLBACK_REGIONS.iter().map(|r| r.to_string()).collect()
            }
        }
    }

    /// Comunas of `region`; empty when the backend fails.
    pub async fn comunas(&self, region: &str) -> Vec<String> {
        match self
            .get_json::<Vec<String>>(&["ubicacion", "comunas", region])
            .await
        {
            Ok(comunas) => comunas,
            Err(err) => {
                tracing::warn!(%err, region, "comunas unavailable");
                Vec::new()
            }
        }
    }

    // ── dashboard ───────────────────────────────────────────────────────────

    /// Raw statistics document; its shape is owned by the backend.
    pub async fn dashboard_stats(&self) -> ClientResult<serde_json::Value> {
        self.get_json(&["dashboard", "estadisticas"]).await
    }

    pub async fn top_products(&self) -> ClientResult<Vec<TopProduct>> {
        self.get_json(&["dashboard", "productos-mas-vendidos"])
            .await
    }

    // ── plumbing ────────────────────────────────────────────────────────────

    /// `base` + percent-encoded `segments`.
    fn url(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Network(format!("invalid API url '{}'", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> ClientResult<RequestBuilder> {
        Ok(self.http.request(method, self.url(segments)?))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> ClientResult<T> {
        let req = self.request(Method::GET, segments)?;
        self.decode(self.execute(req).await?).await
    }

    async fn send_json<B, T>(&self, method: Method, segments: &[&str], body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let req = self.request(method, segments)?.json(body);
        self.decode(self.execute(req).await?).await
    }

    async fn send_empty(&self, method: Method, segments: &[&str]) -> ClientResult<()> {
        let req = self.request(method, segments)?;
        self.execute(req).await.map(drop)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> ClientResult<T> {
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }

    async fn execute(&self, builder: RequestBuilder) -> ClientResult<Response> {
        let request_id = Uuid::now_v7();
        let mut builder = builder.header(REQUEST_ID_HEADER, request_id.to_string());
        let token = self.session.token().filter(|t| !t.is_empty());
        if let Some(token) = &token {
            builder = builder.bearer_auth(token.expose());
        }
        let request = builder
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let started = Instant::now();
        let response = self.http.execute(request).await.map_err(|e| {
            tracing::warn!(%method, %path, %request_id, error = %e, "request failed");
            ClientError::Network(e.to_string())
        })?;
        let status = response.status();
        tracing::debug!(
            %method,
            %path,
            %request_id,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        // Without a token there is no session to expire: a 401 then means
        // bad credentials and is reported like any other API error.
        if status == StatusCode::UNAUTHORIZED && token.is_some() {
            self.session.expire();
            return Err(ClientError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let fallback = status.canonical_reason().unwrap_or("request failed");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body, fallback),
            });
        }
        Ok(response)
    }
}
