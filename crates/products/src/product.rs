use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hazellab_core::{CategoryId, Entity, ProductId};

/// Critical-stock threshold used when a product does not set one.
pub const DEFAULT_CRITICAL_STOCK: i64 = 5;

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A catalog product as the backend returns it.
///
/// Everything but the id may be missing or null in backend payloads, so the
/// accessors below supply the defaults the storefront shows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub stock_critico: Option<i64>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub active_status: Option<bool>,
    #[serde(default)]
    pub destacado: Option<bool>,
    #[serde(default)]
    pub batch_code: Option<String>,
    #[serde(default)]
    pub chem_code: Option<String>,
    #[serde(default)]
    pub proveedor: Option<String>,
    #[serde(default)]
    pub elab_date: Option<String>,
    #[serde(default)]
    pub exp_date: Option<String>,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Product {
    /// Minimal product, mostly for building fixtures.
    pub fn new(id: ProductId, name: impl Into<String>, cost: f64, stock: i64) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            cost: Some(cost),
            stock: Some(stock),
            stock_critico: None,
            category: None,
            image: None,
            active_status: Some(true),
            destacado: Some(false),
            batch_code: None,
            chem_code: None,
            proveedor: None,
            elab_date: None,
            exp_date: None,
        }
    }

    /// Unit price (0 when unknown).
    pub fn unit_cost(&self) -> f64 {
        self.cost.unwrap_or(0.0)
    }

    /// Units on hand (0 when unknown).
    pub fn stock(&self) -> i64 {
        self.stock.unwrap_or(0)
    }

    /// Only an explicit `false` hides a product.
    pub fn is_active(&self) -> bool {
        self.active_status != Some(false)
    }

    /// Strict form used by the back office: only an explicit `true` counts.
    pub fn is_marked_active(&self) -> bool {
        self.active_status == Some(true)
    }

    pub fn is_featured(&self) -> bool {
        self.destacado == Some(true)
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category.as_ref().map(|c| c.id)
    }

    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    pub fn stock_level(&self) -> StockLevel {
        StockLevel::classify(self.stock(), self.stock_critico)
    }

    /// Expiry date, when present and in `YYYY-MM-DD` form.
    pub fn expires_on(&self) -> Option<NaiveDate> {
        parse_date(self.exp_date.as_deref())
    }

    pub fn elaborated_on(&self) -> Option<NaiveDate> {
        parse_date(self.elab_date.as_deref())
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on().is_some_and(|exp| exp < today)
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    // Backends sometimes send a full timestamp; the date part is enough.
    let raw = raw?.trim();
    let date = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Stock classification shown as a badge in the admin listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockLevel {
    OutOfStock,
    Critical,
    Available,
}

impl StockLevel {
    /// `threshold` is the product's `stockCritico`; absent or non-positive
    /// values fall back to [`DEFAULT_CRITICAL_STOCK`].
    pub fn classify(stock: i64, threshold: Option<i64>) -> Self {
        let threshold = threshold.filter(|t| *t > 0).unwrap_or(DEFAULT_CRITICAL_STOCK);
        if stock <= 0 {
            StockLevel::OutOfStock
        } else if stock <= threshold {
            StockLevel::Critical
        } else {
            StockLevel::Available
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "out",
            StockLevel::Critical => "critical",
            StockLevel::Available => "available",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StockLevel::OutOfStock => "Sin stock",
            StockLevel::Critical => "Stock crítico",
            StockLevel::Available => "Disponible",
        }
    }
}

impl core::fmt::Display for StockLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_levels_use_default_threshold() {
        assert_eq!(StockLevel::classify(0, None), StockLevel::OutOfStock);
        assert_eq!(StockLevel::classify(1, None), StockLevel::Critical);
        assert_eq!(StockLevel::classify(5, None), StockLevel::Critical);
        assert_eq!(StockLevel::classify(6, None), StockLevel::Available);
        assert_eq!(StockLevel::classify(5, Some(0)), StockLevel::Critical);
    }

    #[test]
    fn stock_levels_respect_product_threshold() {
        assert_eq!(StockLevel::classify(8, Some(10)), StockLevel::Critical);
        assert_eq!(StockLevel::classify(11, Some(10)), StockLevel::Available);
        assert_eq!(StockLevel::classify(3, Some(2)), StockLevel::Available);
    }

    #[test]
    fn deserializes_sparse_backend_product() {
        let raw = r#"{
            "id": 7, "name": "Glicerina", "cost": 4990, "stock": null,
            "category": {"id": 2, "name": "Humectantes"}, "activeStatus": null,
            "expDate": "2025-03-01T00:00:00"
        }"#;
        let p: Product = serde_json::from_str(raw).unwrap();
        assert_eq!(p.unit_cost(), 4990.0);
        assert_eq!(p.stock(), 0);
        assert!(p.is_active());
        assert!(!p.is_featured());
        assert!(!p.is_marked_active());
        assert_eq!(p.stock_level(), StockLevel::OutOfStock);
        assert_eq!(p.category_name(), Some("Humectantes"));
        assert_eq!(p.expires_on(), NaiveDate::from_ymd_opt(2025, 3, 1));
    }

    #[test]
    fn explicit_false_hides_product() {
        let mut p = Product::new(ProductId::new(1), "Ácido hialurónico", 12990.0, 3);
        p.active_status = Some(true);
        assert!(p.is_active() && p.is_marked_active());
        p.active_status = Some(false);
        assert!(!p.is_active());
        assert!(!p.is_marked_active());
    }

    #[test]
    fn expiry_is_compared_by_date() {
        let mut p = Product::new(ProductId::new(1), "Vitamina C", 8990.0, 10);
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert!(!p.is_expired(today));
        p.exp_date = Some("2024-05-31".to_string());
        assert!(p.is_expired(today));
        p.exp_date = Some("not a date".to_string());
        assert!(!p.is_expired(today));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: more stock never yields a lower level.
            #[test]
            fn classification_is_monotone(
                stock in 0i64..1_000,
                extra in 0i64..100,
                threshold in proptest::option::of(-5i64..50),
            ) {
                let rank = |l: StockLevel| match l {
                    StockLevel::OutOfStock => 0,
                    StockLevel::Critical => 1,
                    StockLevel::Available => 2,
                };
                let low = StockLevel::classify(stock, threshold);
                let high = StockLevel::classify(stock + extra, threshold);
                prop_assert!(rank(low) <= rank(high));
            }

            /// Property: only zero stock is out of stock.
            #[test]
            fn out_of_stock_iff_zero(stock in 0i64..1_000, threshold in proptest::option::of(0i64..50)) {
                prop_assert_eq!(
                    StockLevel::classify(stock, threshold) == StockLevel::OutOfStock,
                    stock == 0
                );
            }
        }
    }
}
