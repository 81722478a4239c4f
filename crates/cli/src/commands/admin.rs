//! Admin access management.
//!
//! Admins are ordinary accounts with the admin role, so "create an admin"
//! means registering through the API and then promoting here.

use tracing::info;

use atelier_core::{Email, UserRole};
use atelier_server::db::UserRepository;

use super::{CliError, database_url};

/// Grant an existing account the admin role.
///
/// # Errors
///
/// Returns `CliError::InvalidInput` if the email is malformed and
/// `CliError::Repository` if no account with that email exists.
pub async fn promote(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email).map_err(|e| CliError::InvalidInput(e.to_string()))?;

    let database_url = database_url()?;
    let pool = atelier_server::db::create_pool(&database_url).await?;

    UserRepository::new(&pool)
        .set_role(&email, UserRole::Admin)
        .await?;

    info!(email = %email, "Account promoted to admin");
    Ok(())
}
