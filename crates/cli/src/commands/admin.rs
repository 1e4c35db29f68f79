//! Admin user management commands.

use coralcart_admin::services::AdminAuthService;
use coralcart_core::AdminRole;

use super::{CliError, connect};

/// Create an admin user.
///
/// The password comes from the `--password` flag or the `CC_ADMIN_PASSWORD`
/// environment variable, so scripts don't have to put it on the command line.
///
/// # Errors
///
/// Returns an error if the role is unknown, the password is missing or weak,
/// or the database write fails.
pub async fn create_user(
    email: &str,
    name: &str,
    role: &str,
    password: Option<&str>,
) -> Result<(), CliError> {
    let role: AdminRole = role
        .parse()
        .map_err(|e: String| CliError::InvalidArgument(e))?;

    let password = match password {
        Some(p) => p.to_string(),
        None => std::env::var("CC_ADMIN_PASSWORD")
            .map_err(|_| CliError::MissingEnvVar("CC_ADMIN_PASSWORD"))?,
    };

    let pool = connect().await?;
    let admin = AdminAuthService::new(&pool)
        .create_admin(email, name, role, &password)
        .await?;

    tracing::info!(admin = %admin.email, role = %admin.role, "admin user created");
    Ok(())
}
