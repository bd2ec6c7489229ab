//! Listing filters over products: the storefront catalog, the admin table
//! and the backend's advanced search.

use core::str::FromStr;

use thiserror::Error;

use hazellab_core::{CategoryId, contains_ci};

use crate::product::{Product, StockLevel};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown filter value '{0}'")]
pub struct UnknownFilter(pub String);

/// Storefront catalog query. Inactive products are never shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub category: Option<CategoryId>,
    /// Matched against name and description.
    pub search: String,
}

impl CatalogQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if !product.is_active() {
            return false;
        }
        if self.category.is_some_and(|c| product.category_id() != Some(c)) {
            return false;
        }

        let needle = self.search.trim().to_lowercase();
        needle.is_empty()
            || contains_ci(Some(&product.name), &needle)
            || contains_ci(product.description.as_deref(), &needle)
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// Active, featured products for the home page.
pub fn featured(products: &[Product]) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.is_active() && p.is_featured())
        .cloned()
        .collect()
}

/// Admin active filter. Unlike the storefront, the back office only counts
/// an explicit `activeStatus: true` as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl ActiveFilter {
    fn matches(&self, product: &Product) -> bool {
        match self {
            ActiveFilter::All => true,
            ActiveFilter::Active => product.is_marked_active(),
            ActiveFilter::Inactive => !product.is_marked_active(),
        }
    }
}

impl FromStr for ActiveFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" => Ok(ActiveFilter::All),
            "active" | "activo" | "activos" => Ok(ActiveFilter::Active),
            "inactive" | "inactivo" | "inactivos" => Ok(ActiveFilter::Inactive),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockFilter {
    #[default]
    All,
    Out,
    Critical,
    Available,
}

impl StockFilter {
    fn matches(&self, product: &Product) -> bool {
        let level = product.stock_level();
        match self {
            StockFilter::All => true,
            StockFilter::Out => level == StockLevel::OutOfStock,
            StockFilter::Critical => level == StockLevel::Critical,
            StockFilter::Available => level == StockLevel::Available,
        }
    }
}

impl FromStr for StockFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" => Ok(StockFilter::All),
            "out" | "agotado" | "sin-stock" => Ok(StockFilter::Out),
            "critical" | "critico" | "crítico" | "stock-critico" => Ok(StockFilter::Critical),
            "available" | "disponible" | "con-stock" => Ok(StockFilter::Available),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

/// Admin product table query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminProductQuery {
    /// Matched against name, description, batch code, chem code, supplier
    /// and category name.
    pub search: String,
    pub active: ActiveFilter,
    pub stock: StockFilter,
}

impl AdminProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        let needle = self.search.trim().to_lowercase();
        let text = needle.is_empty()
            || [
                Some(product.name.as_str()),
                product.description.as_deref(),
                product.batch_code.as_deref(),
                product.chem_code.as_deref(),
                product.proveedor.as_deref(),
                product.category_name(),
            ]
            .into_iter()
            .any(|field| contains_ci(field, &needle));

        text && self.active.matches(product) && self.stock.matches(product)
    }

    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        products.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

/// Server-side product search (`GET /productos/buscar/avanzada`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvancedSearch {
    pub name: Option<String>,
    pub category: Option<CategoryId>,
    pub active: Option<bool>,
    pub low_stock: bool,
    pub featured: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl AdvancedSearch {
    /// Query parameters in backend naming; unset filters are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut q = Vec::new();
        if let Some(name) = self.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            q.push(("nombre", name.to_string()));
        }
        if let Some(category) = self.category {
            q.push(("categoriaId", category.to_string()));
        }
        if let Some(active) = self.active {
            q.push(("activo", active.to_string()));
        }
        if self.low_stock {
            q.push(("stockBajo", "true".to_string()));
        }
        if let Some(featured) = self.featured {
            q.push(("destacado", featured.to_string()));
        }
        if let Some(min) = self.min_price {
            q.push(("precioMin", min.to_string()));
        }
        if let Some(max) = self.max_price {
            q.push(("precioMax", max.to_string()));
        }
        q
    }
}
