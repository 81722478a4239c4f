//! CLI subcommands.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: set ATELIER_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Repository error.
    #[error("{0}")]
    Repository(#[from] atelier_server::db::RepositoryError),

    /// Invalid input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Read the database URL from the environment, loading `.env` first.
pub fn database_url() -> Result<SecretString, CliError> {
    dotenvy::dotenv().ok();

    std::env::var("ATELIER_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingDatabaseUrl)
}
