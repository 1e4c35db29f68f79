//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Auth error: {0}")]
    Auth(#[from] coralcart_admin::services::auth::AdminAuthError),

    #[error("{0}")]
    InvalidArgument(String),
}

/// Connect to the database named by `DATABASE_URL` (or `ADMIN_DATABASE_URL`).
pub(crate) async fn connect() -> Result<PgPool, CliError> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL")
        .or_else(|_| std::env::var("ADMIN_DATABASE_URL"))
        .map_err(|_| CliError::MissingEnvVar("DATABASE_URL"))?;

    let pool = coralcart_admin::db::create_pool(&SecretString::from(url)).await?;
    Ok(pool)
}
