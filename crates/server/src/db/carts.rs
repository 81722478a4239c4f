//! Cart repository: one row per user, lines embedded as JSONB.
//!
//! All cart writes go through [`CartRepository::mutate`], which reloads the
//! document, applies the change in memory via [`atelier_core::cart::Cart`],
//! and saves under a revision check so concurrent tabs can't clobber each
//! other's lines.

use sqlx::PgPool;

use atelier_core::UserId;
use atelier_core::cart::{Cart, CartLine};

use super::{RepositoryError, WRITE_RETRIES, decode_json, encode_json};

#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    items: serde_json::Value,
    revision: i32,
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load a user's cart. A user with no cart row has an empty cart.
    ///
    /// Totals are recomputed from the lines on load, so they always agree
    /// with the items even if the stored denormalized copies drifted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored lines are invalid.
    pub async fn load(&self, user_id: UserId) -> Result<Cart, RepositoryError> {
        Ok(self.load_row(user_id).await?.0)
    }

    /// Apply a mutation to a user's cart and persist the result.
    ///
    /// Retries the read-modify-write a bounded number of times when a
    /// concurrent writer bumps the revision first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Contention` if every retry lost its
    /// revision check.
    pub async fn mutate<F>(&self, user_id: UserId, f: F) -> Result<Cart, RepositoryError>
    where
        F: Fn(&mut Cart),
    {
        for _ in 0..WRITE_RETRIES {
            let (mut cart, revision) = self.load_row(user_id).await?;
            f(&mut cart);

            if self.save(user_id, &cart, revision).await? {
                return Ok(cart);
            }
        }

        Err(RepositoryError::Contention(format!(
            "cart for user {user_id} lost {WRITE_RETRIES} revision checks"
        )))
    }

    /// Empty a user's cart. A user with no cart row is already empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM atelier.cart WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    async fn load_row(&self, user_id: UserId) -> Result<(Cart, Option<i32>), RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT items, revision FROM atelier.cart WHERE user_id = $1",
        )
        .bind(user_id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => {
                let items: Vec<CartLine> = decode_json("items", row.items)?;
                Ok((Cart::from_items(items), Some(row.revision)))
            }
            None => Ok((Cart::empty(), None)),
        }
    }

    /// Save a cart, succeeding only if nobody else wrote since our read.
    ///
    /// `revision` is `None` when the user had no cart row yet; the insert
    /// then fails the check if a concurrent first write beat us to the row.
    async fn save(
        &self,
        user_id: UserId,
        cart: &Cart,
        revision: Option<i32>,
    ) -> Result<bool, RepositoryError> {
        let items = encode_json("items", &cart.items)?;

        let result = match revision {
            Some(revision) => {
                sqlx::query(
                    r#"
                    UPDATE atelier.cart
                    SET items = $3, total_items = $4, total_price = $5,
                        revision = revision + 1, updated_at = now()
                    WHERE user_id = $1 AND revision = $2
                    "#,
                )
                .bind(user_id.as_i32())
                .bind(revision)
                .bind(items)
                .bind(i64::from(cart.total_items))
                .bind(cart.total_price.amount())
                .execute(self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO atelier.cart (user_id, items, total_items, total_price)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (user_id) DO NOTHING
                    "#,
                )
                .bind(user_id.as_i32())
                .bind(items)
                .bind(i64::from(cart.total_items))
                .bind(cart.total_price.amount())
                .execute(self.pool)
                .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }
}
