//! Database operations for the Atelier `PostgreSQL` database.
//!
//! # Schema: `atelier`
//!
//! ## Tables
//!
//! - `user` - Accounts (customer and admin roles)
//! - `address` - Address book rows (at most one default per user)
//! - `wishlist_item` - (user, product) pairs
//! - `product` - Catalog, with color variants embedded as a JSONB array
//! - `cart` - One row per user; lines embedded as JSONB, totals denormalized
//! - `order` - Placed orders; lines/addresses/payment embedded as JSONB
//! - `sessions` - tower-sessions storage
//!
//! Embedded arrays keep the source system's document read-modify-write
//! semantics; writes to `product` and `cart` are guarded by a `revision`
//! counter checked on save.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p atelier-cli -- migrate
//! ```

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// An optimistic write lost its revision check too many times.
    #[error("write contention: {0}")]
    Contention(String),
}

/// How many times a revision-checked read-modify-write is retried before
/// giving up with [`RepositoryError::Contention`].
pub(crate) const WRITE_RETRIES: u32 = 3;

/// Decode a JSONB column into a domain type.
///
/// Mapping failures surface as `DataCorruption` since they mean the stored
/// document no longer matches the schema the code expects.
pub(crate) fn decode_json<T: DeserializeOwned>(
    column: &str,
    value: serde_json::Value,
) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {column} in database: {e}")))
}

/// Encode a domain type into a JSONB column value.
pub(crate) fn encode_json<T: serde::Serialize>(
    column: &str,
    value: &T,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("failed to serialize {column}: {e}")))
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
