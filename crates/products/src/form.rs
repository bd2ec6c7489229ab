//! Product create/edit form.

use chrono::NaiveDate;
use serde::Serialize;

use hazellab_core::{CategoryId, DomainResult, FieldErrors};

use crate::product::Product;

const CATEGORY_REQUIRED: &str = "category is required";

/// `{"id": n}` reference the backend expects for the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryRef {
    pub id: CategoryId,
}

/// Raw product form input.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub batch_code: String,
    pub chem_code: String,
    pub proveedor: String,
    pub cost: f64,
    pub stock: i64,
    pub stock_critico: i64,
    pub category: Option<CategoryId>,
    pub image: String,
    pub elab_date: String,
    pub exp_date: String,
    pub active: bool,
    pub featured: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            batch_code: String::new(),
            chem_code: String::new(),
            proveedor: String::new(),
            cost: 0.0,
            stock: 0,
            stock_critico: 0,
            category: None,
            image: String::new(),
            elab_date: String::new(),
            exp_date: String::new(),
            active: true,
            featured: false,
        }
    }
}

/// `POST /productos` and `PUT /productos/{id}` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub batch_code: String,
    pub chem_code: String,
    pub proveedor: String,
    pub cost: f64,
    pub stock: i64,
    pub stock_critico: i64,
    pub category: CategoryRef,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elab_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp_date: Option<NaiveDate>,
    pub active_status: bool,
    pub destacado: bool,
}

impl ProductForm {
    /// Prefill the edit form from an existing product.
    pub fn from_product(product: &Product) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            name: product.name.clone(),
            description: text(&product.description),
            batch_code: text(&product.batch_code),
            chem_code: text(&product.chem_code),
            proveedor: text(&product.proveedor),
            cost: product.unit_cost(),
            stock: product.stock(),
            stock_critico: product.stock_critico.unwrap_or(0),
            category: product.category_id(),
            image: text(&product.image),
            elab_date: product.elaborated_on().map(|d| d.to_string()).unwrap_or_default(),
            exp_date: product.expires_on().map(|d| d.to_string()).unwrap_or_default(),
            active: product.is_active(),
            featured: product.is_featured(),
        }
    }

    pub fn validate(&self) -> DomainResult<ProductPayload> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.add("name", "name is required");
        }
        // Also rejects NaN.
        if !(self.cost >= 0.0) {
            errors.add("cost", "cost must be zero or more");
        }
        if self.stock < 0 {
            errors.add("stock", "stock must be zero or more");
        }
        if self.stock_critico < 0 {
            errors.add("stockCritico", "critical stock must be zero or more");
        }
        let category = self.category.map(|id| CategoryRef { id });
        if category.is_none() {
            errors.add("category", CATEGORY_REQUIRED);
        }
        let elab_date = optional_date(&mut errors, "elabDate", &self.elab_date);
        let exp_date = optional_date(&mut errors, "expDate", &self.exp_date);

        errors.into_result()?;
        let Some(category) = category else {
            let mut errors = FieldErrors::new();
            errors.add("category", CATEGORY_REQUIRED);
            return Err(errors.into());
        };

        Ok(ProductPayload {
            name: self.name.trim().to_string(),
            description: self.description.trim().to_string(),
            batch_code: self.batch_code.trim().to_string(),
            chem_code: self.chem_code.trim().to_string(),
            proveedor: self.proveedor.trim().to_string(),
            cost: self.cost,
            stock: self.stock,
            stock_critico: self.stock_critico,
            category,
            image: self.image.trim().to_string(),
            elab_date,
            exp_date,
            active_status: self.active,
            destacado: self.featured,
        })
    }
}

fn optional_date(errors: &mut FieldErrors, field: &'static str, raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.add(field, "date must be YYYY-MM-DD");
            None
        }
    }
}
