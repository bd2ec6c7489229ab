//! Products domain module.
//!
//! Catalog resources as the backend serves them, plus the client-side rules
//! around them: stock classification, listing filters and the product form.
//! Pure logic only (no IO, no HTTP).

pub mod catalog;
pub mod form;
pub mod product;

pub use catalog::{
    ActiveFilter, AdminProductQuery, AdvancedSearch, CatalogQuery, StockFilter, UnknownFilter,
    featured,
};
pub use form::{CategoryRef, ProductForm, ProductPayload};
pub use product::{Category, DEFAULT_CRITICAL_STOCK, Product, StockLevel};
