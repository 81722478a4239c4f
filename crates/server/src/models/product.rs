//! Product domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::ProductId;
use atelier_core::catalog::ColorVariant;

/// Input for creating or replacing a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub bestseller: bool,
    pub color_variants: Vec<ColorVariant>,
}

/// Catalog listing filter.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub bestseller: Option<bool>,
}

/// A catalog product with its embedded color variants.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub bestseller: bool,
    /// Per-color slices of the product, each the unit of sellable inventory.
    pub color_variants: Vec<ColorVariant>,
    /// Optimistic concurrency counter, incremented on every write.
    #[serde(skip)]
    pub revision: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
