//! Database migration command.
//!
//! Migrations live in `crates/server/migrations/` and are embedded into the
//! binary at compile time.

use tracing::info;

use super::{CliError, database_url};

/// Run the database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let database_url = database_url()?;

    info!("Connecting to database...");
    let pool = atelier_server::db::create_pool(&database_url).await?;

    info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    info!("Migrations complete");
    Ok(())
}
