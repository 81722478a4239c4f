//! User and address domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use atelier_core::{AddressId, Email, UserId, UserRole};

/// A registered user (domain type).
///
/// The password hash never leaves the repository layer; it is not part of
/// this type.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// User's email address.
    pub email: Email,
    /// Optional phone number.
    pub phone: Option<String>,
    /// Account role (customer or admin).
    pub role: UserRole,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Input for creating or replacing an address book entry.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub recipient: String,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// When set, the new address becomes the user's single default.
    #[serde(default)]
    pub is_default: bool,
}

/// An address in a user's address book.
///
/// Addresses are rows with stable ids, not positional array entries. At most
/// one address per user carries `is_default`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub recipient: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
    pub phone: Option<String>,
    /// Pre-fills checkout when set.
    pub is_default: bool,
}
