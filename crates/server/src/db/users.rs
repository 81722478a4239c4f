//! User repository: accounts, address book, and wishlist.
//!
//! Queries use the sqlx runtime API with `FromRow` row types converted into
//! domain types, so the crate builds without a live database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use atelier_core::{AddressId, Email, ProductId, UserId, UserRole};

use super::RepositoryError;
use crate::models::user::{Address, NewAddress, User};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    name: String,
    email: String,
    phone: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_domain(self) -> Result<User, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role = self.role.parse::<UserRole>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(User {
            id: UserId::new(self.id),
            name: self.name,
            email,
            phone: self.phone,
            role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AddressRow {
    id: i32,
    user_id: i32,
    recipient: String,
    line1: String,
    line2: Option<String>,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    phone: Option<String>,
    is_default: bool,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::new(row.id),
            user_id: UserId::new(row.user_id),
            recipient: row.recipient,
            line1: row.line1,
            line2: row.line2,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            country: row.country,
            phone: row.phone,
            is_default: row.is_default,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, phone, role, created_at, updated_at";
const ADDRESS_COLUMNS: &str =
    "id, user_id, recipient, line1, line2, city, state, postal_code, country, phone, is_default";

// =============================================================================
// Repository
// =============================================================================

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Accounts
    // =========================================================================

    /// Create a new user with a password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        name: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO atelier.user (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_domain()
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM atelier.user WHERE id = $1"
        ))
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(UserRow::into_domain).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no such user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(sqlx::FromRow)]
        struct WithPassword {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row = sqlx::query_as::<_, WithPassword>(&format!(
            "SELECT {USER_COLUMNS}, password_hash FROM atelier.user WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((r.user.into_domain()?, r.password_hash))),
            None => Ok(None),
        }
    }

    /// Update a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn update_profile(
        &self,
        id: UserId,
        name: &str,
        phone: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE atelier.user
            SET name = $2, phone = $3, updated_at = now()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id.as_i32())
        .bind(name)
        .bind(phone)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.into_domain()
    }

    /// Set a user's role (used by `atelier-cli admin create`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_role(&self, email: &Email, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE atelier.user SET role = $2, updated_at = now() WHERE email = $1",
        )
        .bind(email.as_str())
        .bind(role.to_string())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Address Book
    // =========================================================================

    /// List a user's addresses, default first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_addresses(&self, user_id: UserId) -> Result<Vec<Address>, RepositoryError> {
        let rows = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            SELECT {ADDRESS_COLUMNS}
            FROM atelier.address
            WHERE user_id = $1
            ORDER BY is_default DESC, id ASC
            "#
        ))
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Address::from).collect())
    }

    /// Add an address. If `input.is_default` is set, every other address of
    /// the user is un-defaulted in the same transaction, preserving the
    /// at-most-one-default invariant.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn add_address(
        &self,
        user_id: UserId,
        input: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE atelier.address SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            INSERT INTO atelier.address
                (user_id, recipient, line1, line2, city, state, postal_code, country, phone, is_default)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(user_id.as_i32())
        .bind(&input.recipient)
        .bind(&input.line1)
        .bind(&input.line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(row.into())
    }

    /// Replace an address's fields. Setting `is_default` un-defaults the
    /// user's other addresses in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to another user.
    pub async fn update_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
        input: &NewAddress,
    ) -> Result<Address, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        if input.is_default {
            sqlx::query("UPDATE atelier.address SET is_default = FALSE WHERE user_id = $1")
                .bind(user_id.as_i32())
                .execute(&mut *tx)
                .await?;
        }

        let row = sqlx::query_as::<_, AddressRow>(&format!(
            r#"
            UPDATE atelier.address
            SET recipient = $3, line1 = $4, line2 = $5, city = $6, state = $7,
                postal_code = $8, country = $9, phone = $10, is_default = $11
            WHERE id = $1 AND user_id = $2
            RETURNING {ADDRESS_COLUMNS}
            "#
        ))
        .bind(address_id.as_i32())
        .bind(user_id.as_i32())
        .bind(&input.recipient)
        .bind(&input.line1)
        .bind(&input.line2)
        .bind(&input.city)
        .bind(&input.state)
        .bind(&input.postal_code)
        .bind(&input.country)
        .bind(&input.phone)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await?;

        let row = row.ok_or(RepositoryError::NotFound)?;
        tx.commit().await?;

        Ok(row.into())
    }

    /// Delete an address.
    ///
    /// # Returns
    ///
    /// Returns `true` if the address was deleted, `false` if it didn't exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM atelier.address WHERE id = $1 AND user_id = $2")
            .bind(address_id.as_i32())
            .bind(user_id.as_i32())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Make one address the user's default.
    ///
    /// Un-defaults every address, then sets the target, in one transaction -
    /// at most one default holds after any sequence of calls.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the address doesn't exist or
    /// belongs to another user.
    pub async fn set_default_address(
        &self,
        user_id: UserId,
        address_id: AddressId,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE atelier.address SET is_default = FALSE WHERE user_id = $1")
            .bind(user_id.as_i32())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            "UPDATE atelier.address SET is_default = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(address_id.as_i32())
        .bind(user_id.as_i32())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            // Roll back the unset rather than leaving the user defaultless.
            tx.rollback().await?;
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// List the product ids on a user's wishlist, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn wishlist(&self, user_id: UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let rows: Vec<(i32,)> = sqlx::query_as(
            r#"
            SELECT product_id
            FROM atelier.wishlist_item
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.as_i32())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| ProductId::new(id)).collect())
    }

    /// Add a product to the wishlist. Adding an already-wishlisted product
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO atelier.wishlist_item (user_id, product_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, product_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Remove a product from the wishlist.
    ///
    /// # Returns
    ///
    /// Returns `true` if a row was removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_wishlist(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM atelier.wishlist_item WHERE user_id = $1 AND product_id = $2",
        )
        .bind(user_id.as_i32())
        .bind(product_id.as_i32())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
