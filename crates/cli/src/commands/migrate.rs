//! Database migration command.
//!
//! Both binaries share one database; a single migration set at the workspace
//! root covers the `store` and `admin` schemas.
//!
//! # Usage
//!
//! ```bash
//! cc-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` - `PostgreSQL` connection string

use super::{CliError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    tracing::info!("Migrations complete");
    Ok(())
}
