//! Product repository: catalog rows with embedded color variants.
//!
//! The `color_variants` JSONB column holds the full variant array; stock
//! changes are read-modify-write on that document, guarded by the row's
//! `revision` counter and retried on contention.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use atelier_core::catalog::ColorVariant;
use atelier_core::{ProductId, VariantId};

use super::{RepositoryError, WRITE_RETRIES, decode_json, encode_json};
use crate::models::product::{NewProduct, Product, ProductFilter};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    category: String,
    sub_category: String,
    bestseller: bool,
    color_variants: serde_json::Value,
    revision: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_domain(self) -> Result<Product, RepositoryError> {
        let color_variants: Vec<ColorVariant> = decode_json("color_variants", self.color_variants)?;

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            category: self.category,
            sub_category: self.sub_category,
            bestseller: self.bestseller,
            color_variants,
            revision: self.revision,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, category, sub_category, bestseller, \
     color_variants, revision, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product.
    ///
    /// The caller is expected to have validated the variant list already.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let variants = encode_json("color_variants", &input.color_variants)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO atelier.product
                (name, description, category, sub_category, bestseller, color_variants)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.sub_category)
        .bind(input.bestseller)
        .bind(variants)
        .fetch_one(self.pool)
        .await?;

        row.into_domain()
    }

    /// List products, newest first, optionally filtered by category,
    /// sub-category, and bestseller flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored variant array
    /// is invalid.
    pub async fn list(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            SELECT {PRODUCT_COLUMNS}
            FROM atelier.product
            WHERE ($1::text IS NULL OR category = $1)
              AND ($2::text IS NULL OR sub_category = $2)
              AND ($3::boolean IS NULL OR bestseller = $3)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(filter.category.as_deref())
        .bind(filter.sub_category.as_deref())
        .bind(filter.bestseller)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(ProductRow::into_domain).collect()
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM atelier.product WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProductRow::into_domain).transpose()
    }

    /// Replace a product's fields and variant list.
    ///
    /// Bumps `revision` so any concurrent stock read-modify-write loses its
    /// check and retries against the new document.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn update(&self, id: ProductId, input: &NewProduct) -> Result<Product, RepositoryError> {
        let variants = encode_json("color_variants", &input.color_variants)?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE atelier.product
            SET name = $2, description = $3, category = $4, sub_category = $5,
                bestseller = $6, color_variants = $7,
                revision = revision + 1, updated_at = now()
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "#
        ))
        .bind(id.as_i32())
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.category)
        .bind(&input.sub_category)
        .bind(input.bestseller)
        .bind(variants)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_domain()
    }

    /// Delete a product.
    ///
    /// # Returns
    ///
    /// Returns `true` if the product was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM atelier.product WHERE id = $1")
            .bind(id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the stock of one variant, leaving the rest of the variant array
    /// untouched.
    ///
    /// Read-modify-write on the JSONB document with a revision check on
    /// save, retried up to a small bound when a concurrent writer wins.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product or variant doesn't
    /// exist.
    /// Returns `RepositoryError::Contention` if every retry lost its
    /// revision check.
    pub async fn update_variant_stock(
        &self,
        id: ProductId,
        variant_id: VariantId,
        stock: u32,
    ) -> Result<Product, RepositoryError> {
        for _ in 0..WRITE_RETRIES {
            let mut product = self.get(id).await?.ok_or(RepositoryError::NotFound)?;

            let variant = product
                .color_variants
                .iter_mut()
                .find(|v| v.id == variant_id)
                .ok_or(RepositoryError::NotFound)?;
            variant.stock = stock;

            if self.save_variants(&product).await? {
                product.revision += 1;
                return Ok(product);
            }
        }

        Err(RepositoryError::Contention(format!(
            "product {id} stock update lost {WRITE_RETRIES} revision checks"
        )))
    }

    /// Write a product's variant array back, succeeding only if the row's
    /// revision still matches the one the document was read at.
    pub(crate) async fn save_variants(&self, product: &Product) -> Result<bool, RepositoryError> {
        let variants = encode_json("color_variants", &product.color_variants)?;

        let result = sqlx::query(
            r#"
            UPDATE atelier.product
            SET color_variants = $3, revision = revision + 1, updated_at = now()
            WHERE id = $1 AND revision = $2
            "#,
        )
        .bind(product.id.as_i32())
        .bind(product.revision)
        .bind(variants)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
